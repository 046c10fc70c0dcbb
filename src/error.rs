//! Error types for the harness

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while preparing or running the import harness
#[derive(Error, Debug)]
pub enum OaaError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("Config error in {path:?}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A literal sample record is malformed
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// External program could not be started
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// External program ran but exited non-zero
    #[error("{command} exited with status {code}")]
    CommandFailed { command: String, code: i32 },
}

pub type OaaResult<T> = Result<T, OaaError>;
