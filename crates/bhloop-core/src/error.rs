//! Errors raised by the BH-loop pipeline.
//!
//! Validation failures are reported before any sample array is allocated;
//! inversion failures carry the offending loop and sample range so a caller
//! can suggest a larger `Hmax` or a finer sweep.

use thiserror::Error;

use crate::types::LoopKind;

/// Errors from the BH-loop model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("Invalid parameter {name} = {value}: {requirement}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        requirement: &'static str,
    },

    #[error("{kind} lower branch is not invertible over samples {start}..={end}: {reason}")]
    NonInvertibleBranch {
        kind: LoopKind,
        start: usize,
        end: usize,
        reason: String,
    },
}

impl ModelError {
    pub(crate) fn invalid(name: &'static str, value: f64, requirement: &'static str) -> Self {
        Self::InvalidParameter {
            name,
            value,
            requirement,
        }
    }
}
