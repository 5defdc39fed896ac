//! Entry points tying the pipeline stages together.
//!
//! Both variants share one code path: the gapped run is the ungapped run
//! plus the reluctance stage, so sweep generation, loop closure and the
//! monotonicity checks are enforced in exactly one place.

use log::debug;

use crate::chan::ChanModel;
use crate::coercivity::invert_lower_branch;
use crate::error::ModelError;
use crate::gap::ReluctanceGapModel;
use crate::sweep::field_sweep;
use crate::types::{GeometryParameters, LoopKind, MaterialParameters, ModelResult};

/// Compute the BH loop of an ungapped core.
///
/// # Errors
/// [`ModelError::InvalidParameter`] for out-of-domain inputs, or
/// [`ModelError::NonInvertibleBranch`] if the lower branch has no usable
/// zero crossing.
pub fn compute_ungapped_loop(material: &MaterialParameters) -> Result<ModelResult, ModelError> {
    run_pipeline(material, None)
}

/// Compute the ungapped BH loop and the loop of the same core with an air gap.
///
/// # Errors
/// As [`compute_ungapped_loop`], plus geometry validation and inversion of
/// the gapped lower branch.
pub fn compute_gapped_loop(
    material: &MaterialParameters,
    geometry: &GeometryParameters,
) -> Result<ModelResult, ModelError> {
    run_pipeline(material, Some(geometry))
}

/// Run the full pipeline, with the gap stage when `geometry` is given.
///
/// All parameters are validated before any array is allocated.
pub fn run_pipeline(
    material: &MaterialParameters,
    geometry: Option<&GeometryParameters>,
) -> Result<ModelResult, ModelError> {
    material.validate()?;
    if let Some(geometry) = geometry {
        geometry.validate()?;
    }

    let field = field_sweep(material.h_max, material.points)?;
    let ungapped = ChanModel::new(material).branches(&field);
    debug!(
        "ungapped loop: {} samples, vertical offset {:.6e} T",
        field.len(),
        ungapped.offset
    );

    let ungapped_coercivity = invert_lower_branch(&field, &ungapped.lower, LoopKind::Ungapped)?;

    let gapped = geometry
        .map(|geometry| {
            ReluctanceGapModel::new(*geometry).apply(&field, &ungapped, ungapped_coercivity)
        })
        .transpose()?;

    Ok(ModelResult {
        material: *material,
        field,
        ungapped,
        ungapped_coercivity,
        gapped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_happens_before_allocation() {
        let material = MaterialParameters {
            points: 1,
            ..Default::default()
        };
        assert!(matches!(
            compute_ungapped_loop(&material),
            Err(ModelError::InvalidParameter { name: "N", .. })
        ));
    }

    #[test]
    fn test_bad_geometry_rejected() {
        let geometry = GeometryParameters {
            s: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            compute_gapped_loop(&MaterialParameters::default(), &geometry),
            Err(ModelError::InvalidParameter { name: "S", .. })
        ));
    }

    #[test]
    fn test_ungapped_result_has_no_gap() {
        let result = compute_ungapped_loop(&MaterialParameters::default()).unwrap();
        assert!(result.gapped.is_none());
        assert!(result.gapped_coercivity().is_none());
        assert_eq!(result.len(), 101);
    }
}
