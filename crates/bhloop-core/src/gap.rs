//! Air-gap correction through a series reluctance network.
//!
//! The ungapped branches are turned into relative-permeability curves
//! measured from the ungapped loop's effective coercivity $H_{cm}$:
//!
//! $$\mu(H) = \frac{B(H)}{\mu_0 (H \pm H_{cm})}, \qquad \mu \ge 1$$
//!
//! Core and gap reluctances add in series,
//!
//! $$R(H) = \frac{L_m}{S \mu_0 \mu(H)} + \frac{L_g}{S \mu_0},$$
//!
//! and the gapped flux density follows from the same magnetomotive force
//! driving the larger reluctance:
//!
//! $$B_g(H) = \frac{(H \pm H_{cm}) L_m}{S R(H)}.$$
//!
//! The gapped branches are then closed with the same vertical-offset rule
//! as the ungapped loop and inverted for their own coercivity $H_{cg}$.
//! With $L_g = 0$ and no floored samples, $B_g = B$ exactly.

use log::{debug, warn};
use ndarray::{Array1, Zip};

use crate::chan::close_loop;
use crate::coercivity::invert_lower_branch;
use crate::constants::MU_0;
use crate::error::ModelError;
use crate::types::{BranchPair, GappedLoop, GeometryParameters, LoopKind, ReluctanceCurve};

/// Lower bound on relative permeability.
pub const PERMEABILITY_FLOOR: f64 = 1.0;

/// Relative permeability for flux density `b` under excitation `h_eff = H ± Hcm`.
///
/// Values below vacuum, and the non-finite values produced at the pole
/// `h_eff = 0`, are replaced by [`PERMEABILITY_FLOOR`]. The second element
/// reports whether the floor was applied.
pub fn relative_permeability(b: f64, h_eff: f64) -> (f64, bool) {
    let mu = b / (MU_0 * h_eff);
    if mu.is_finite() && mu >= PERMEABILITY_FLOOR {
        (mu, false)
    } else {
        (PERMEABILITY_FLOOR, true)
    }
}

/// Series reluctance models for one core geometry.
#[derive(Debug, Clone, Copy)]
pub struct ReluctanceGapModel {
    geometry: GeometryParameters,
}

impl ReluctanceGapModel {
    /// `geometry` must already have passed [`GeometryParameters::validate`].
    pub fn new(geometry: GeometryParameters) -> Self {
        debug_assert!(geometry.validate().is_ok(), "unvalidated geometry");
        Self { geometry }
    }

    /// Core reluctance $L_m / (S \mu_0 \mu)$ (A/Wb).
    pub fn core_reluctance(&self, mu: f64) -> f64 {
        self.geometry.lm / (self.geometry.s * MU_0 * mu)
    }

    /// Gap reluctance $L_g / (S \mu_0)$ (A/Wb).
    pub fn gap_reluctance(&self) -> f64 {
        self.geometry.lg / (self.geometry.s * MU_0)
    }

    /// Total series reluctance for relative permeability `mu`.
    pub fn total_reluctance(&self, mu: f64) -> f64 {
        self.core_reluctance(mu) + self.gap_reluctance()
    }

    /// Raw gapped branch and its reluctance curve.
    ///
    /// `shift` is `+Hcm` for the upper branch and `-Hcm` for the lower one;
    /// `branch` holds the matching offset-corrected ungapped flux densities.
    pub fn gapped_branch(
        &self,
        field: &Array1<f64>,
        branch: &Array1<f64>,
        shift: f64,
    ) -> (Array1<f64>, ReluctanceCurve) {
        let n = field.len();
        let mut permeability = Array1::zeros(n);
        let mut reluctance = Array1::zeros(n);
        let mut flux = Array1::zeros(n);
        let mut floored_samples = 0;

        Zip::from(&mut permeability)
            .and(&mut reluctance)
            .and(&mut flux)
            .and(field)
            .and(branch)
            .for_each(|mu_out, r_out, b_out, &h, &b| {
                let h_eff = h + shift;
                let (mu, floored) = relative_permeability(b, h_eff);
                if floored {
                    floored_samples += 1;
                }
                let r = self.total_reluctance(mu);
                *mu_out = mu;
                *r_out = r;
                *b_out = h_eff * self.geometry.lm / (self.geometry.s * r);
            });

        (
            flux,
            ReluctanceCurve {
                permeability,
                reluctance,
                floored_samples,
            },
        )
    }

    /// Derive the gapped loop from the ungapped branches and coercivity `hcm`.
    ///
    /// # Errors
    /// [`ModelError::NonInvertibleBranch`] if the gapped lower branch cannot
    /// be inverted.
    pub fn apply(
        &self,
        field: &Array1<f64>,
        ungapped: &BranchPair,
        hcm: f64,
    ) -> Result<GappedLoop, ModelError> {
        let (upper_raw, upper_reluctance) = self.gapped_branch(field, &ungapped.upper, hcm);
        let (lower_raw, lower_reluctance) = self.gapped_branch(field, &ungapped.lower, -hcm);

        let floored = upper_reluctance.floored_samples + lower_reluctance.floored_samples;
        if floored > 0 {
            // Near H = ±Hcm the permeability is set by the floor, not by the
            // material; the gapped curve there is only as good as the clamp.
            warn!(
                "permeability floor applied at {} of {} samples (upper {}, lower {})",
                floored,
                2 * field.len(),
                upper_reluctance.floored_samples,
                lower_reluctance.floored_samples
            );
        }

        let branches = close_loop(upper_raw, lower_raw);
        debug!("gapped loop vertical offset: {:.6e} T", branches.offset);

        let coercivity = invert_lower_branch(field, &branches.lower, LoopKind::Gapped)?;

        Ok(GappedLoop {
            geometry: self.geometry,
            branches,
            upper_reluctance,
            lower_reluctance,
            coercivity,
        })
    }
}
