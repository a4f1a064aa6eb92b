use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::template::TemplateError;
use crate::timing::TimingError;

/// Errors raised while configuring or running an experiment.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to spawn command through '{shell}': {source}")]
    Spawn {
        shell: String,
        #[source]
        source: io::Error,
    },

    #[error("malformed timing output: {0}")]
    Timing(#[from] TimingError),

    #[error("invalid command template: {0}")]
    Template(#[from] TemplateError),

    #[error("compressed size of '{name}' is zero, ratio is undefined")]
    ZeroCompressedSize { name: String },

    #[error("failed to write CSV report: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to serialize results: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to pin to core {core}: {source}")]
    Affinity {
        core: usize,
        #[source]
        source: io::Error,
    },
}

impl HarnessError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        HarnessError::Io { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, HarnessError>;
