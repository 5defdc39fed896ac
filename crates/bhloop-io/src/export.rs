//! CSV and JSON export of simulation results.
//!
//! Two tables are written per run:
//!
//! | File | Columns |
//! |------|---------|
//! | loop | `H (A/m)`, `Upper B (T)`, `Lower B (T)` (+ gapped pair) |
//! | averaged | `H (A/m)`, `B (T)` (+ `Gapped B (T)`) |
//!
//! Each table starts with `#` comment lines carrying the parameter line and
//! the effective coercivities, so a CSV file can also seed a parameter reload.
//! Field values and coercivities are written in shortest round-trip form,
//! flux densities in scientific notation.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use bhloop_core::ModelResult;
use log::info;
use thiserror::Error;

use crate::param_log::{format_parameter_line, RunParameters};

/// Errors from result writers.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialisation error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Plot rendering error: {0}")]
    Plot(String),
}

/// Parameters a result was computed from, in parameter-log form.
pub fn run_parameters(result: &ModelResult) -> RunParameters {
    RunParameters {
        material: result.material,
        geometry: result.geometry().copied(),
    }
}

fn write_metadata<W: Write>(out: &mut W, result: &ModelResult, title: &str) -> std::io::Result<()> {
    writeln!(out, "# bhloop: {}", title)?;
    writeln!(out, "# Version: {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(out, "# {}", format_parameter_line(&run_parameters(result)))?;
    writeln!(out, "# Hcm (A/m): {}", result.ungapped_coercivity)?;
    if let Some(hcg) = result.gapped_coercivity() {
        writeln!(out, "# Hcg (A/m): {}", hcg)?;
    }
    writeln!(out, "#")
}

/// Write both branches (and the gapped pair, if any) as CSV rows.
pub fn write_loop_table<W: Write>(result: &ModelResult, mut out: W) -> Result<(), ExportError> {
    write_metadata(&mut out, result, "Chan model BH loop")?;

    match &result.gapped {
        Some(_) => writeln!(
            out,
            "H (A/m),Upper B (T),Lower B (T),Gapped upper B (T),Gapped lower B (T)"
        )?,
        None => writeln!(out, "H (A/m),Upper B (T),Lower B (T)")?,
    }

    for i in 0..result.len() {
        write!(
            out,
            "{},{:.9e},{:.9e}",
            result.field[i], result.ungapped.upper[i], result.ungapped.lower[i]
        )?;
        if let Some(gapped) = &result.gapped {
            write!(
                out,
                ",{:.9e},{:.9e}",
                gapped.branches.upper[i], gapped.branches.lower[i]
            )?;
        }
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

/// Write the averaged (middle) curve $B_3 = (B_1 + B_2) / 2$ as CSV rows.
pub fn write_averaged_table<W: Write>(result: &ModelResult, mut out: W) -> Result<(), ExportError> {
    write_metadata(&mut out, result, "Chan model averaged BH curve")?;

    let averaged = result.ungapped.averaged();
    let gapped_averaged = result.gapped.as_ref().map(|g| g.branches.averaged());

    match &gapped_averaged {
        Some(_) => writeln!(out, "H (A/m),B (T),Gapped B (T)")?,
        None => writeln!(out, "H (A/m),B (T)")?,
    }

    for i in 0..result.len() {
        write!(out, "{},{:.9e}", result.field[i], averaged[i])?;
        if let Some(gapped) = &gapped_averaged {
            write!(out, ",{:.9e}", gapped[i])?;
        }
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

fn create_file(path: &Path) -> std::io::Result<BufWriter<fs::File>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(BufWriter::new(fs::File::create(path)?))
}

/// Write the loop table to `path`, creating parent directories.
pub fn write_loop_csv(result: &ModelResult, path: &Path) -> Result<(), ExportError> {
    write_loop_table(result, create_file(path)?)?;
    info!("BH loop written to {}", path.display());
    Ok(())
}

/// Write the averaged-curve table to `path`, creating parent directories.
pub fn write_averaged_csv(result: &ModelResult, path: &Path) -> Result<(), ExportError> {
    write_averaged_table(result, create_file(path)?)?;
    info!("Averaged BH curve written to {}", path.display());
    Ok(())
}

/// Write the complete result (every array and scalar) as pretty JSON.
pub fn write_result_json(result: &ModelResult, path: &Path) -> Result<(), ExportError> {
    let json = serde_json::to_string_pretty(result)?;
    let mut file = create_file(path)?;
    file.write_all(json.as_bytes())?;
    file.flush()?;
    info!("Result (JSON) written to {}", path.display());
    Ok(())
}
