// ABOUTME: Application-wide error types for restack startup and configuration.
// ABOUTME: Pipeline-level errors live in deploy::error.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {name}: {reason}")]
    InvalidEnvVar { name: String, reason: String },

    #[error("units file not found: {0}")]
    UnitsFileNotFound(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
