//! Parameter log: the one-line record of a run's inputs.
//!
//! Each run records its inputs as a single line:
//! ```text
//! Simulation parameters: Bs=1.2, Br=0.3, Hc=20, Hmax=100, N=101
//! Simulation parameters: Bs=1.2, Br=0.3, Hc=20, Hmax=100, N=101, Lm=0.1, Lg=0.001, S=0.0001
//! ```
//! Five tokens describe an ungapped run, eight a gapped run. Lines may carry
//! any prefix (a timestamp, a CSV comment marker) before the label. Reloading
//! takes the last labelled line of the log; a malformed line is reported as
//! [`ConfigParseError`] and never touches the caller's current parameters.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use bhloop_core::{GeometryParameters, MaterialParameters};
use log::info;
use thiserror::Error;

/// Fixed label preceding the `key=value` tokens.
pub const PARAMETER_LABEL: &str = "Simulation parameters:";

const MATERIAL_TOKENS: usize = 5;
const GAPPED_TOKENS: usize = 8;

/// Errors while reading back a parameter line.
#[derive(Debug, Error)]
pub enum ConfigParseError {
    #[error("Failed to read parameter log: {0}")]
    Io(#[from] std::io::Error),

    #[error("No 'Simulation parameters:' line found")]
    NoParameterLine,

    #[error("Expected 5 or 8 key=value tokens, found {0}")]
    WrongTokenCount(usize),

    #[error("Malformed token '{0}' (expected key=value)")]
    MalformedToken(String),

    #[error("Unknown parameter key '{0}'")]
    UnknownKey(String),

    #[error("Parameter '{0}' given more than once")]
    DuplicateKey(String),

    #[error("Missing parameter '{0}'")]
    MissingKey(&'static str),

    #[error("Invalid value '{value}' for parameter '{key}'")]
    InvalidValue { key: &'static str, value: String },
}

/// Inputs of one run: always material, geometry only for gapped runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunParameters {
    pub material: MaterialParameters,
    pub geometry: Option<GeometryParameters>,
}

impl RunParameters {
    pub fn ungapped(material: MaterialParameters) -> Self {
        Self {
            material,
            geometry: None,
        }
    }

    pub fn gapped(material: MaterialParameters, geometry: GeometryParameters) -> Self {
        Self {
            material,
            geometry: Some(geometry),
        }
    }
}

/// Render the labelled parameter line (without a trailing newline).
pub fn format_parameter_line(params: &RunParameters) -> String {
    let m = &params.material;
    let mut line = format!(
        "{} Bs={}, Br={}, Hc={}, Hmax={}, N={}",
        PARAMETER_LABEL, m.bs, m.br, m.hc, m.h_max, m.points
    );
    if let Some(g) = &params.geometry {
        line.push_str(&format!(", Lm={}, Lg={}, S={}", g.lm, g.lg, g.s));
    }
    line
}

/// Parse a labelled parameter line back into [`RunParameters`].
///
/// Keys may appear in any order but each exactly once; the token count must
/// be 5 (ungapped) or 8 (gapped). Domain checks are left to
/// [`MaterialParameters::validate`] and [`GeometryParameters::validate`].
pub fn parse_parameter_line(line: &str) -> Result<RunParameters, ConfigParseError> {
    let start = line
        .find(PARAMETER_LABEL)
        .ok_or(ConfigParseError::NoParameterLine)?;
    let body = line[start + PARAMETER_LABEL.len()..].trim();

    let tokens: Vec<&str> = body.split(',').map(str::trim).collect();
    if tokens.len() != MATERIAL_TOKENS && tokens.len() != GAPPED_TOKENS {
        return Err(ConfigParseError::WrongTokenCount(tokens.len()));
    }

    let mut fields = ParsedFields::default();
    for token in tokens {
        let (key, value) = token
            .split_once('=')
            .ok_or_else(|| ConfigParseError::MalformedToken(token.to_string()))?;
        fields.set(key.trim(), value.trim())?;
    }
    fields.finish()
}

#[derive(Default)]
struct ParsedFields {
    bs: Option<f64>,
    br: Option<f64>,
    hc: Option<f64>,
    h_max: Option<f64>,
    points: Option<usize>,
    lm: Option<f64>,
    lg: Option<f64>,
    s: Option<f64>,
}

impl ParsedFields {
    fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigParseError> {
        let (name, slot) = match key {
            "Bs" => ("Bs", &mut self.bs),
            "Br" => ("Br", &mut self.br),
            "Hc" => ("Hc", &mut self.hc),
            "Hmax" => ("Hmax", &mut self.h_max),
            "Lm" => ("Lm", &mut self.lm),
            "Lg" => ("Lg", &mut self.lg),
            "S" => ("S", &mut self.s),
            "N" => {
                if self.points.is_some() {
                    return Err(ConfigParseError::DuplicateKey(key.to_string()));
                }
                let points = value.parse().map_err(|_| ConfigParseError::InvalidValue {
                    key: "N",
                    value: value.to_string(),
                })?;
                self.points = Some(points);
                return Ok(());
            }
            other => return Err(ConfigParseError::UnknownKey(other.to_string())),
        };
        if slot.is_some() {
            return Err(ConfigParseError::DuplicateKey(key.to_string()));
        }
        let parsed: f64 = value.parse().map_err(|_| ConfigParseError::InvalidValue {
            key: name,
            value: value.to_string(),
        })?;
        *slot = Some(parsed);
        Ok(())
    }

    fn finish(self) -> Result<RunParameters, ConfigParseError> {
        let material = MaterialParameters {
            bs: self.bs.ok_or(ConfigParseError::MissingKey("Bs"))?,
            br: self.br.ok_or(ConfigParseError::MissingKey("Br"))?,
            hc: self.hc.ok_or(ConfigParseError::MissingKey("Hc"))?,
            h_max: self.h_max.ok_or(ConfigParseError::MissingKey("Hmax"))?,
            points: self.points.ok_or(ConfigParseError::MissingKey("N"))?,
        };
        let geometry = match (self.lm, self.lg, self.s) {
            (None, None, None) => None,
            (lm, lg, s) => Some(GeometryParameters {
                lm: lm.ok_or(ConfigParseError::MissingKey("Lm"))?,
                lg: lg.ok_or(ConfigParseError::MissingKey("Lg"))?,
                s: s.ok_or(ConfigParseError::MissingKey("S"))?,
            }),
        };
        Ok(RunParameters { material, geometry })
    }
}

/// Last line of `content` that carries [`PARAMETER_LABEL`].
pub fn last_parameter_line(content: &str) -> Option<&str> {
    content
        .lines()
        .rev()
        .find(|line| line.contains(PARAMETER_LABEL))
}

/// Append-only parameter log on disk.
///
/// Every [`record`](Self::record) adds one line and nothing is ever
/// removed, so the file grows by one line per run and keeps the full run
/// history. Delete or rotate the file externally to bound its size;
/// [`load_last`](Self::load_last) only reads the most recent labelled line.
#[derive(Debug, Clone)]
pub struct ParameterLog {
    path: PathBuf,
}

impl ParameterLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append the parameter line for `params`, creating the file if needed.
    pub fn record(&self, params: &RunParameters) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", format_parameter_line(params))?;
        info!("Recorded run parameters in {}", self.path.display());
        Ok(())
    }

    /// Parameters from the most recent labelled line.
    pub fn load_last(&self) -> Result<RunParameters, ConfigParseError> {
        let content = fs::read_to_string(&self.path)?;
        let line = last_parameter_line(&content).ok_or(ConfigParseError::NoParameterLine)?;
        parse_parameter_line(line)
    }
}
