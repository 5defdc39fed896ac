//! Chan's saturation branches and the minor-loop closure rule.
//!
//! Chan's empirical model describes each branch of a saturating loop as
//!
//! $$B(H) = B_s \frac{H \pm H_c}{|H \pm H_c| + H_c (B_s / B_r - 1)}$$
//!
//! with $+H_c$ on the ascending (upper) branch and $-H_c$ on the descending
//! (lower) branch. For any finite sweep these raw branches leave the loop
//! vertically skewed, so both are shifted by half their gap at the positive
//! sweep extreme ([`close_loop`]).
//!
//! # Reference
//! J. H. Chan, A. Vladimirescu, X.-C. Gao, P. Liebmann and J. Valainis,
//! *IEEE Trans. Computer-Aided Design* **10**, 476 (1991).

use ndarray::Array1;

use crate::types::{BranchPair, MaterialParameters};

/// Chan branch evaluator for one validated parameter set.
#[derive(Debug, Clone, Copy)]
pub struct ChanModel {
    bs: f64,
    hc: f64,
    shape_field: f64,
}

impl ChanModel {
    /// Capture the constants of a parameter set.
    ///
    /// `params` must already have passed [`MaterialParameters::validate`];
    /// with `Hc > 0` and `Bs > Br` the branch denominator never vanishes.
    pub fn new(params: &MaterialParameters) -> Self {
        debug_assert!(params.validate().is_ok(), "unvalidated material parameters");
        Self {
            bs: params.bs,
            hc: params.hc,
            shape_field: params.shape_field(),
        }
    }

    /// Raw branch value at `h` for a branch shifted by `shift` (A/m).
    pub fn branch(&self, h: f64, shift: f64) -> f64 {
        let x = h + shift;
        self.bs * x / (x.abs() + self.shape_field)
    }

    /// Raw ascending branch $B_{1,raw}(H)$.
    pub fn upper_raw(&self, h: f64) -> f64 {
        self.branch(h, self.hc)
    }

    /// Raw descending branch $B_{2,raw}(H)$.
    pub fn lower_raw(&self, h: f64) -> f64 {
        self.branch(h, -self.hc)
    }

    /// Evaluate both branches over the sweep and close the loop.
    pub fn branches(&self, field: &Array1<f64>) -> BranchPair {
        let upper = field.mapv(|h| self.upper_raw(h));
        let lower = field.mapv(|h| self.lower_raw(h));
        close_loop(upper, lower)
    }
}

/// Half the gap between the raw branches at the last sample.
pub fn vertical_offset(upper_raw: &Array1<f64>, lower_raw: &Array1<f64>) -> f64 {
    match (upper_raw.last(), lower_raw.last()) {
        (Some(b1), Some(b2)) => (b1 - b2) / 2.0,
        _ => 0.0,
    }
}

/// Apply the closure rule to a pair of raw branches.
///
/// The offset from [`vertical_offset`] is subtracted from every upper sample
/// and added to every lower sample, so that $B_1(H_{N-1}) = -B_2(H_0)$ for a
/// symmetric sweep. Saturated loops get an offset of (nearly) zero.
pub fn close_loop(mut upper_raw: Array1<f64>, mut lower_raw: Array1<f64>) -> BranchPair {
    debug_assert_eq!(upper_raw.len(), lower_raw.len());
    let offset = vertical_offset(&upper_raw, &lower_raw);
    upper_raw.mapv_inplace(|b| b - offset);
    lower_raw.mapv_inplace(|b| b + offset);
    BranchPair {
        upper: upper_raw,
        lower: lower_raw,
        offset,
    }
}
