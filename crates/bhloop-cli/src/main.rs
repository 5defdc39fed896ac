//! bhloop command-line interface.
//!
//! Compute Chan-model BH loops from TOML job files:
//! ```sh
//! bhloop run job.toml
//! bhloop validate job.toml
//! bhloop reload --log simulation_log.log
//! bhloop run-last -o output
//! ```

mod config;
mod runner;

use std::path::{Path, PathBuf};

use anyhow::Context;
use bhloop_core::ModelResult;
use bhloop_io::param_log::format_parameter_line;
use bhloop_io::{ParameterLog, RunParameters};
use clap::{Parser, Subcommand};

use crate::config::OutputConfig;

const DEFAULT_LOG: &str = "simulation_log.log";

#[derive(Parser)]
#[command(name = "bhloop")]
#[command(about = "Chan-model BH hysteresis loops for ungapped and gapped cores")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a model from a TOML configuration file.
    Run {
        /// Path to the job configuration file.
        config: PathBuf,
        /// Output directory (overrides config file setting).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file without running the model.
    Validate {
        /// Path to the job configuration file.
        config: PathBuf,
    },
    /// Print the parameters of the last run recorded in a parameter log.
    Reload {
        /// Parameter log to read.
        #[arg(long, default_value = DEFAULT_LOG)]
        log: PathBuf,
    },
    /// Re-run the model with the last parameters recorded in a parameter log.
    RunLast {
        /// Parameter log to read (and append to).
        #[arg(long, default_value = DEFAULT_LOG)]
        log: PathBuf,
        /// Output directory.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, output } => {
            println!("bhloop: Chan BH-loop model");
            println!("==========================");
            let job = config::load_config(&config)?;
            println!("Configuration: {}", config.display());

            let params = job.run_parameters();
            let log = ParameterLog::new(&job.output.parameter_log);
            let result = runner::run_model(&params, &log)?;

            let out_dir = output.unwrap_or_else(|| PathBuf::from(&job.output.directory));
            finish(&params, &result, &out_dir, &job.output)
        }
        Commands::Validate { config } => {
            let job = config::load_config(&config)?;
            job.validate()
                .with_context(|| format!("Invalid parameters in {}", config.display()))?;
            let variant = if job.geometry.is_some() { "gapped" } else { "ungapped" };
            println!("Configuration is valid ({}): {}", variant, config.display());
            Ok(())
        }
        Commands::Reload { log } => {
            let params = load_last(&log)?;
            println!("{}", format_parameter_line(&params));
            Ok(())
        }
        Commands::RunLast { log, output } => {
            let params = load_last(&log)?;
            println!("Re-running last parameters from {}", log.display());

            let parameter_log = ParameterLog::new(&log);
            let result = runner::run_model(&params, &parameter_log)?;

            let defaults = OutputConfig::default();
            let out_dir = output.unwrap_or_else(|| PathBuf::from(&defaults.directory));
            finish(&params, &result, &out_dir, &defaults)
        }
    }
}

fn load_last(log: &Path) -> anyhow::Result<RunParameters> {
    ParameterLog::new(log)
        .load_last()
        .with_context(|| format!("Failed to reload parameters from {}", log.display()))
}

fn finish(
    params: &RunParameters,
    result: &ModelResult,
    out_dir: &Path,
    output: &OutputConfig,
) -> anyhow::Result<()> {
    let written = runner::write_outputs(result, out_dir, output)?;
    runner::print_summary(params, result);
    for path in &written {
        println!("  wrote {}", path.display());
    }
    println!("Simulation complete.");
    Ok(())
}
