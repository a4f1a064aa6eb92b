//! Harness configuration.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! command-line overrides. The result is validated once and never mutated;
//! components receive it by reference instead of reading the environment.

use serde::{Deserialize, Serialize};
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::error::{HarnessError, Result};
use crate::runner::DEFAULT_SHELL;

/// Name of the environment variable the CLI reads the working directory from.
pub const WORKING_DIR_ENV: &str = "DNSLogzip_WorkingDir";

pub const DEFAULT_DATASETS: [&str; 3] = ["ISP-23", "ISP-24", "Public"];
pub const DEFAULT_LOG_FILE_NAME: &str = "Log.txt";
pub const DEFAULT_RUN_TIMES: usize = 1;
pub const DEFAULT_DATA_DIR: &str = "/media/ramdisk/data";
pub const DEFAULT_SCRATCH_DIR: &str = "/media/ramdisk";

/// Optional settings read from a TOML file. Every key may be omitted.
///
/// ```toml
/// datasets = ["Public"]
/// log_file_name = "Log.sample.txt"
/// run_times = 10
/// scratch_dir = "/media/ramdisk"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub working_dir: Option<PathBuf>,
    pub results_dir: Option<PathBuf>,
    pub datasets: Option<Vec<String>>,
    pub log_file_name: Option<String>,
    pub run_times: Option<usize>,
    pub data_dir: Option<PathBuf>,
    pub scratch_dir: Option<PathBuf>,
    pub shell: Option<String>,
    pub core_id: Option<usize>,
}

impl ConfigFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| HarnessError::io(path, e))?;
        toml::from_str(&content)
            .map_err(|e| HarnessError::Config(format!("invalid config file '{}': {}", path.display(), e)))
    }
}

/// Values given on the command line; they win over the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub working_dir: Option<PathBuf>,
    pub run_times: Option<usize>,
    pub core_id: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HarnessConfig {
    working_dir: PathBuf,
    results_dir: PathBuf,
    datasets: Vec<String>,
    log_file_name: String,
    run_times: NonZeroUsize,
    data_dir: PathBuf,
    scratch_dir: PathBuf,
    shell: String,
    core_id: Option<usize>,
}

impl HarnessConfig {
    pub fn resolve(file: ConfigFile, overrides: Overrides) -> Result<Self> {
        let working_dir = overrides
            .working_dir
            .or(file.working_dir)
            .ok_or_else(|| HarnessError::Config(format!("{} is not set", WORKING_DIR_ENV)))?;
        if !working_dir.is_dir() {
            return Err(HarnessError::Config(format!(
                "{}: {} is not a directory.",
                WORKING_DIR_ENV,
                working_dir.display()
            )));
        }

        let run_times = overrides.run_times.or(file.run_times).unwrap_or(DEFAULT_RUN_TIMES);
        let run_times = NonZeroUsize::new(run_times)
            .ok_or_else(|| HarnessError::Config("run_times must be a positive integer".to_string()))?;

        let log_file_name = file.log_file_name.unwrap_or_else(|| DEFAULT_LOG_FILE_NAME.to_string());
        if log_file_name.is_empty() {
            return Err(HarnessError::Config("log_file_name must not be empty".to_string()));
        }

        Ok(HarnessConfig {
            results_dir: file.results_dir.unwrap_or_else(|| working_dir.join("results")),
            working_dir,
            datasets: file
                .datasets
                .unwrap_or_else(|| DEFAULT_DATASETS.iter().map(|d| d.to_string()).collect()),
            log_file_name,
            run_times,
            data_dir: file.data_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            scratch_dir: file.scratch_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_SCRATCH_DIR)),
            shell: file.shell.unwrap_or_else(|| DEFAULT_SHELL.to_string()),
            core_id: overrides.core_id.or(file.core_id),
        })
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    pub fn datasets(&self) -> &[String] {
        &self.datasets
    }

    pub fn log_file_name(&self) -> &str {
        &self.log_file_name
    }

    pub fn run_times(&self) -> NonZeroUsize {
        self.run_times
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    pub fn shell(&self) -> &str {
        &self.shell
    }

    pub fn core_id(&self) -> Option<usize> {
        self.core_id
    }

    /// Input log of `dataset`.
    pub fn original_file_path(&self, dataset: &str) -> PathBuf {
        self.data_dir.join(dataset).join(&self.log_file_name)
    }

    pub fn report_path(&self, file_name: &str) -> PathBuf {
        self.results_dir.join(file_name)
    }
}
