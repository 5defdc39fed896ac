//! # bhloop Core
//!
//! The numerical backbone of bhloop. This crate computes simplified
//! ferromagnetic hysteresis (BH) loops from Chan's empirical saturation
//! model, for an ungapped core and for a core with an air gap.
//!
//! ## Pipeline
//!
//! Every run goes through the same chain of pure transforms:
//!
//! 1. [`sweep`]: symmetric magnetising-field samples $H_i \in [-H_{max}, H_{max}]$.
//! 2. [`chan`]: upper/lower Chan branches with the minor-loop closure offset.
//! 3. [`coercivity`]: spline inversion of the lower branch at $B = 0$.
//! 4. [`gap`]: (gapped runs only) series core + gap reluctance, gapped
//!    branches, and a second coercivity inversion.
//!
//! The entry points are [`compute_ungapped_loop`] and [`compute_gapped_loop`],
//! both returning an immutable [`ModelResult`](types::ModelResult).
//!
//! ## Modules
//!
//! - [`types`]: Parameter structs and result containers.
//! - [`error`]: The [`ModelError`](error::ModelError) taxonomy.
//! - [`spline`]: Natural cubic spline used for the inversions.
//! - [`constants`]: Physical constants.

pub mod chan;
pub mod coercivity;
pub mod constants;
pub mod error;
pub mod gap;
pub mod pipeline;
pub mod spline;
pub mod sweep;
pub mod types;

pub use error::ModelError;
pub use pipeline::{compute_gapped_loop, compute_ungapped_loop};
pub use types::{GeometryParameters, MaterialParameters, ModelResult};
