//! Shared entry point of the experiment binaries.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::affinity::pin_to_core;
use crate::config::{ConfigFile, HarnessConfig, Overrides, WORKING_DIR_ENV};
use crate::driver::GridDriver;
use crate::experiment::{presets, Experiment};
use crate::report;
use crate::runner::ShellExecutor;

/// Runs one DNSLogzip experiment and writes `<working dir>/results/<name>.csv`.
#[derive(Parser, Debug)]
#[command(version)]
pub struct Cli {
    /// Working directory holding the `results` folder
    #[arg(long, env = WORKING_DIR_ENV)]
    pub working_dir: Option<PathBuf>,

    /// TOML file overriding datasets, paths and trial count
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Trials per cell
    #[arg(long)]
    pub runs: Option<usize>,

    /// Pin the harness and every command it starts to this CPU core
    #[arg(long)]
    pub core: Option<usize>,

    /// Log each command's stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Extra arguments are accepted and ignored
    #[arg(hide = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub ignored: Vec<String>,
}

impl Cli {
    pub fn resolve_config(&self) -> Result<HarnessConfig> {
        let file = match &self.config {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::default(),
        };
        let overrides = Overrides {
            working_dir: self.working_dir.clone(),
            run_times: self.runs,
            core_id: self.core,
        };
        Ok(HarnessConfig::resolve(file, overrides)?)
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "logzip_bench=debug" } else { "logzip_bench=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Parses the command line and runs the preset called `experiment`.
pub fn run(experiment: &str) -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    info!("Start.");
    let config = cli.resolve_config()?;
    let experiment = presets::by_name(experiment)
        .ok_or_else(|| anyhow!("unknown experiment '{}'", experiment))?
        .with_context(|| format!("invalid templates in experiment '{}'", experiment))?;

    run_experiment(&config, &experiment)?;
    info!("Done.");

    Ok(())
}

pub fn run_experiment(config: &HarnessConfig, experiment: &Experiment) -> Result<()> {
    if let Some(core) = config.core_id() {
        pin_to_core(core)?;
        info!("Pinned to core {}", core);
    }

    let directions = if experiment.round_trip() { "compression and decompression" } else { "compression only" };
    info!(
        "Running {} ({}) with {} trial(s) per cell over {} dataset(s) x {} variant(s)",
        experiment.name(),
        directions,
        config.run_times(),
        config.datasets().len(),
        experiment.variants().len()
    );

    let mut driver = GridDriver::new(config, experiment, ShellExecutor::new(config.shell()));
    let grid = driver.run()?;

    let csv_path = config.report_path(&experiment.report_file_name());
    report::write_csv(&grid, &csv_path)?;
    let json_path = csv_path.with_extension("json");
    report::write_json(&grid, &json_path)?;
    info!("Results written to {} and {}", csv_path.display(), json_path.display());

    report::print_summary(&grid);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_extra_arguments_are_ignored() {
        let cli = Cli::try_parse_from(["q1", "--runs", "3", "leftover", "-x"]).unwrap();
        assert_eq!(cli.runs, Some(3));
        assert_eq!(cli.ignored, ["leftover", "-x"]);
    }

    #[test]
    fn test_unknown_flags_are_ignored() {
        let cli = Cli::try_parse_from(["q1", "--foo", "-x"]).unwrap();
        assert_eq!(cli.ignored, ["--foo", "-x"]);
        assert_eq!(cli.runs, None);
    }

    #[test]
    fn test_help_exits_without_running() {
        let err = Cli::try_parse_from(["q1", "-h"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }
}
