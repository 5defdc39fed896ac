//! Effective coercivity by inverting the descending branch.
//!
//! The lower branch $B_2(H)$ is strictly increasing for every valid
//! parameter set, so its samples define the inverse map $H(B)$. A natural
//! cubic spline through $(B_i, H_i)$ is evaluated at $B = 0$ to obtain the
//! field at which the offset-corrected loop actually crosses zero flux.

use log::debug;
use ndarray::Array1;

use crate::error::ModelError;
use crate::spline::{CubicSpline, SplineError};
use crate::types::LoopKind;

/// Field value (A/m) where `lower` crosses zero flux density.
///
/// # Arguments
/// * `field` - Field samples, strictly increasing.
/// * `lower` - Lower branch aligned with `field`.
/// * `kind` - Which loop the branch belongs to (used in error reports).
///
/// # Errors
/// [`ModelError::NonInvertibleBranch`] when the flux densities are not
/// strictly increasing, or when zero lies outside the sampled flux range.
pub fn invert_lower_branch(
    field: &Array1<f64>,
    lower: &Array1<f64>,
    kind: LoopKind,
) -> Result<f64, ModelError> {
    debug_assert_eq!(field.len(), lower.len());
    let last = lower.len().saturating_sub(1);

    let spline = CubicSpline::new(lower.to_vec(), field.to_vec()).map_err(|err| match err {
        SplineError::NotIncreasing { index, end } => ModelError::NonInvertibleBranch {
            kind,
            start: index,
            end,
            reason: format!(
                "flux density stops increasing (B = {:.6e} T to {:.6e} T)",
                lower[index], lower[end]
            ),
        },
        other => ModelError::NonInvertibleBranch {
            kind,
            start: 0,
            end: last,
            reason: other.to_string(),
        },
    })?;

    let (b_min, b_max) = spline.domain();
    if b_min > 0.0 || b_max < 0.0 {
        return Err(ModelError::NonInvertibleBranch {
            kind,
            start: 0,
            end: last,
            reason: format!(
                "flux density range [{:.6e}, {:.6e}] T does not contain zero",
                b_min, b_max
            ),
        });
    }

    let coercivity = spline.evaluate(0.0);
    debug!("{} loop coercivity: {:.6e} A/m", kind, coercivity);
    Ok(coercivity)
}
