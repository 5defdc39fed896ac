//! Core types shared across the bhloop pipeline.
//!
//! This module defines the input parameter structs (validated once at the
//! pipeline boundary) and the immutable result containers handed to
//! presentation and export code.

use std::fmt;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Material constants of Chan's model plus the sweep settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialParameters {
    /// Saturation flux density $B_s$ (T).
    pub bs: f64,
    /// Residual induction $B_r$ (T), $0 < B_r < B_s$.
    pub br: f64,
    /// Nominal coercivity $H_c$ (A/m).
    pub hc: f64,
    /// Sweep amplitude $H_{max}$ (A/m).
    pub h_max: f64,
    /// Number of field samples.
    pub points: usize,
}

impl MaterialParameters {
    /// Check every scalar against its domain.
    ///
    /// `Bs/Br` must be strictly greater than one: the branch denominator
    /// carries `Hc * (Bs/Br - 1)`.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.points < 2 {
            return Err(ModelError::invalid("N", self.points as f64, "at least 2 samples"));
        }
        require_positive("Hmax", self.h_max)?;
        require_positive("Hc", self.hc)?;
        require_positive("Br", self.br)?;
        require_positive("Bs", self.bs)?;
        if self.bs <= self.br {
            return Err(ModelError::invalid("Bs", self.bs, "must exceed Br (Bs/Br > 1)"));
        }
        Ok(())
    }

    /// Denominator constant $H_c (B_s / B_r - 1)$ of the Chan branches.
    pub fn shape_field(&self) -> f64 {
        self.hc * (self.bs / self.br - 1.0)
    }
}

impl Default for MaterialParameters {
    fn default() -> Self {
        Self {
            bs: 1.2,
            br: 0.3,
            hc: 20.0,
            h_max: 100.0,
            points: 101,
        }
    }
}

/// Magnetic-circuit geometry for the gapped model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeometryParameters {
    /// Core magnetic path length $L_m$ (m).
    pub lm: f64,
    /// Air-gap length $L_g$ (m). Zero reduces to the ungapped core.
    pub lg: f64,
    /// Core cross-section area $S$ (m²).
    pub s: f64,
}

impl GeometryParameters {
    pub fn validate(&self) -> Result<(), ModelError> {
        require_positive("Lm", self.lm)?;
        require_positive("S", self.s)?;
        if !self.lg.is_finite() || self.lg < 0.0 {
            return Err(ModelError::invalid("Lg", self.lg, "must be finite and non-negative"));
        }
        Ok(())
    }
}

impl Default for GeometryParameters {
    fn default() -> Self {
        Self {
            lm: 0.1,
            lg: 0.001,
            s: 1e-4,
        }
    }
}

fn require_positive(name: &'static str, value: f64) -> Result<(), ModelError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ModelError::invalid(name, value, "must be finite and positive"))
    }
}

/// Which loop of a run a branch or coercivity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopKind {
    Ungapped,
    Gapped,
}

impl fmt::Display for LoopKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopKind::Ungapped => f.write_str("ungapped"),
            LoopKind::Gapped => f.write_str("gapped"),
        }
    }
}

/// Offset-corrected upper (ascending) and lower (descending) branches,
/// aligned index-for-index with the field samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchPair {
    /// Upper branch $B_1(H)$ (T).
    pub upper: Array1<f64>,
    /// Lower branch $B_2(H)$ (T).
    pub lower: Array1<f64>,
    /// Vertical offset subtracted from the upper and added to the lower branch (T).
    pub offset: f64,
}

impl BranchPair {
    pub fn len(&self) -> usize {
        self.upper.len()
    }

    pub fn is_empty(&self) -> bool {
        self.upper.is_empty()
    }

    /// Middle curve $B_3 = (B_1 + B_2) / 2$.
    pub fn averaged(&self) -> Array1<f64> {
        (&self.upper + &self.lower) / 2.0
    }
}

/// Per-sample relative permeability and total series reluctance of one branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReluctanceCurve {
    /// Relative permeability, floored at 1.0.
    pub permeability: Array1<f64>,
    /// Core + gap reluctance (A/Wb).
    pub reluctance: Array1<f64>,
    /// Number of samples where the permeability floor replaced the computed value.
    pub floored_samples: usize,
}

/// The gapped loop derived from the ungapped one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GappedLoop {
    pub geometry: GeometryParameters,
    pub branches: BranchPair,
    pub upper_reluctance: ReluctanceCurve,
    pub lower_reluctance: ReluctanceCurve,
    /// Effective coercivity $H_{cg}$ of the gapped loop (A/m).
    pub coercivity: f64,
}

/// Complete output of one simulation run.
///
/// Built once at the end of the pipeline and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelResult {
    /// Parameters the run was computed from.
    pub material: MaterialParameters,
    /// Field samples $H_i$ (A/m), the shared x-axis of every curve.
    pub field: Array1<f64>,
    /// Ungapped branch pair.
    pub ungapped: BranchPair,
    /// Effective coercivity $H_{cm}$ of the ungapped loop (A/m).
    pub ungapped_coercivity: f64,
    /// Gapped loop, present only for gapped runs.
    pub gapped: Option<GappedLoop>,
}

impl ModelResult {
    pub fn len(&self) -> usize {
        self.field.len()
    }

    pub fn is_empty(&self) -> bool {
        self.field.is_empty()
    }

    pub fn geometry(&self) -> Option<&GeometryParameters> {
        self.gapped.as_ref().map(|g| &g.geometry)
    }

    pub fn gapped_coercivity(&self) -> Option<f64> {
        self.gapped.as_ref().map(|g| g.coercivity)
    }
}
