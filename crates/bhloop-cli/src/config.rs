//! TOML configuration deserialisation for simulation jobs.

use std::path::Path;

use anyhow::Context;
use bhloop_core::{GeometryParameters, MaterialParameters};
use bhloop_io::RunParameters;
use serde::Deserialize;

/// Top-level job configuration.
#[derive(Debug, Deserialize)]
pub struct JobConfig {
    pub material: MaterialConfig,
    /// Present for gapped runs only.
    pub geometry: Option<GeometryConfig>,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Chan model parameters and sweep settings.
#[derive(Debug, Deserialize)]
pub struct MaterialConfig {
    /// Saturation flux density (T).
    pub bs: f64,
    /// Residual induction (T).
    pub br: f64,
    /// Coercivity (A/m).
    pub hc: f64,
    /// Sweep amplitude (A/m).
    pub h_max: f64,
    /// Number of field samples (default: 1001).
    #[serde(default = "default_points")]
    pub points: usize,
}

fn default_points() -> usize {
    1001
}

/// Magnetic circuit of the gapped core.
#[derive(Debug, Deserialize)]
pub struct GeometryConfig {
    /// Core magnetic path length (m).
    pub lm: f64,
    /// Air-gap length (m).
    #[serde(default)]
    pub lg: f64,
    /// Cross-section area (m²).
    pub s: f64,
}

/// Output configuration.
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Output directory (default: "./output").
    #[serde(default = "default_output_dir")]
    pub directory: String,
    /// Whether to save the loop and averaged-curve CSV tables (default: true).
    #[serde(default = "default_true")]
    pub save_csv: bool,
    /// Whether to also save the full result as JSON (default: false).
    #[serde(default)]
    pub save_json: bool,
    /// Whether to render SVG plots (default: true).
    #[serde(default = "default_true")]
    pub save_plots: bool,
    /// Parameter log appended to on every run (default: "simulation_log.log").
    #[serde(default = "default_parameter_log")]
    pub parameter_log: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            save_csv: true,
            save_json: false,
            save_plots: true,
            parameter_log: default_parameter_log(),
        }
    }
}

fn default_output_dir() -> String {
    "./output".into()
}
fn default_true() -> bool {
    true
}
fn default_parameter_log() -> String {
    "simulation_log.log".into()
}

impl JobConfig {
    /// Model parameters described by this job.
    pub fn run_parameters(&self) -> RunParameters {
        let m = &self.material;
        let material = MaterialParameters {
            bs: m.bs,
            br: m.br,
            hc: m.hc,
            h_max: m.h_max,
            points: m.points,
        };
        let geometry = self.geometry.as_ref().map(|g| GeometryParameters {
            lm: g.lm,
            lg: g.lg,
            s: g.s,
        });
        RunParameters { material, geometry }
    }

    /// Validate every parameter against its domain without running the model.
    pub fn validate(&self) -> anyhow::Result<()> {
        let params = self.run_parameters();
        params.material.validate()?;
        if let Some(geometry) = &params.geometry {
            geometry.validate()?;
        }
        Ok(())
    }
}

/// Parse a TOML job configuration.
pub fn parse_config(content: &str) -> anyhow::Result<JobConfig> {
    let config: JobConfig = toml::from_str(content)?;
    Ok(config)
}

/// Load and parse a TOML job configuration file.
pub fn load_config(path: &Path) -> anyhow::Result<JobConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Invalid configuration in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_ungapped_job() {
        let job = parse_config(
            r#"
            [material]
            bs = 1.2
            br = 0.3
            hc = 20.0
            h_max = 100.0
            "#,
        )
        .unwrap();
        assert_eq!(job.material.points, 1001);
        assert!(job.geometry.is_none());
        assert!(job.output.save_csv);
        assert!(!job.output.save_json);
        assert_eq!(job.output.parameter_log, "simulation_log.log");
        assert!(job.validate().is_ok());
    }

    #[test]
    fn test_gapped_job() {
        let job = parse_config(
            r#"
            [material]
            bs = 1.2
            br = 0.3
            hc = 20.0
            h_max = 100.0
            points = 101

            [geometry]
            lm = 0.1
            lg = 0.001
            s = 1e-4

            [output]
            directory = "results"
            save_plots = false
            "#,
        )
        .unwrap();
        let params = job.run_parameters();
        assert_eq!(params.geometry.unwrap().lg, 0.001);
        assert_eq!(job.output.directory, "results");
        assert!(!job.output.save_plots);
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let job = parse_config(
            r#"
            [material]
            bs = 0.3
            br = 0.3
            hc = 20.0
            h_max = 100.0
            "#,
        )
        .unwrap();
        assert!(job.validate().is_err());
    }

    #[test]
    fn test_missing_field_is_an_error() {
        assert!(parse_config("[material]\nbs = 1.2\n").is_err());
    }
}
