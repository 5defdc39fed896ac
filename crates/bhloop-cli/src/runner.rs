//! Job runner: model evaluation, parameter logging and result files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::warn;

use bhloop_core::pipeline::run_pipeline;
use bhloop_core::ModelResult;
use bhloop_io::export::{write_averaged_csv, write_loop_csv, write_result_json};
use bhloop_io::param_log::format_parameter_line;
use bhloop_io::plot::{save_averaged_plot, save_loop_plot};
use bhloop_io::{ParameterLog, RunParameters};

use crate::config::OutputConfig;

pub const LOOP_CSV: &str = "BH-loop_data.csv";
pub const AVERAGED_CSV: &str = "Averaged_BH-loop_data.csv";
pub const RESULT_JSON: &str = "result.json";
pub const LOOP_PLOT: &str = "bh_loop.svg";
pub const AVERAGED_PLOT: &str = "averaged_bh_curve.svg";

/// Evaluate the model for `params` and record them in `log`.
///
/// Parameters are logged only after the model succeeds, so the log's last
/// line always describes a run that can be repeated.
pub fn run_model(params: &RunParameters, log: &ParameterLog) -> Result<ModelResult> {
    let result = run_pipeline(&params.material, params.geometry.as_ref())
        .context("Model evaluation failed")?;
    log.record(params)
        .with_context(|| format!("Failed to write parameter log {}", log.path().display()))?;
    Ok(result)
}

/// Write every enabled output into `out_dir` and return the paths written.
///
/// Plot failures (e.g. no usable font on the host) are logged and skipped;
/// the data files are still produced.
pub fn write_outputs(
    result: &ModelResult,
    out_dir: &Path,
    output: &OutputConfig,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    if output.save_csv {
        let path = out_dir.join(LOOP_CSV);
        write_loop_csv(result, &path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);

        let path = out_dir.join(AVERAGED_CSV);
        write_averaged_csv(result, &path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }

    if output.save_json {
        let path = out_dir.join(RESULT_JSON);
        write_result_json(result, &path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }

    if output.save_plots {
        std::fs::create_dir_all(out_dir)
            .with_context(|| format!("Failed to create {}", out_dir.display()))?;

        let path = out_dir.join(LOOP_PLOT);
        match save_loop_plot(result, &path) {
            Ok(()) => written.push(path),
            Err(e) => warn!("Skipping {}: {}", path.display(), e),
        }

        let path = out_dir.join(AVERAGED_PLOT);
        match save_averaged_plot(result, &path) {
            Ok(()) => written.push(path),
            Err(e) => warn!("Skipping {}: {}", path.display(), e),
        }
    }

    Ok(written)
}

/// Print the run parameters and effective coercivities.
pub fn print_summary(params: &RunParameters, result: &ModelResult) {
    println!("{}", format_parameter_line(params));
    println!("Samples: {}", result.len());
    println!("Vertical offset (ungapped): {:.6e} T", result.ungapped.offset);
    println!("Hcm (ungapped coercivity): {} A/m", result.ungapped_coercivity);
    if let Some(gapped) = &result.gapped {
        println!("Hcg (gapped coercivity):   {} A/m", gapped.coercivity);
        let floored =
            gapped.upper_reluctance.floored_samples + gapped.lower_reluctance.floored_samples;
        if floored > 0 {
            println!("Permeability floor applied at {} samples", floored);
        }
    }
}
