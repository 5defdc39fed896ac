//! Physical constants (SI units).

/// Vacuum permeability $\mu_0 = 4\pi \times 10^{-7}$ H/m.
pub const MU_0: f64 = 4.0e-7 * std::f64::consts::PI;
