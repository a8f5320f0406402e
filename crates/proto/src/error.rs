use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type
#[derive(Debug, Error)]
pub enum Error {
    /// Settings loading/validation error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Skill import resolution error.
    #[error("Skill error: {0}")]
    Skill(#[from] SkillError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Settings file errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A field has an invalid value and reason.
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    /// Filesystem read error.
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error.
    #[error("TOML parse error: {0}")]
    Toml(String),
}

/// Skill resolution errors
///
/// Missing paths, non-config files and malformed documents are not errors;
/// only collaborator failures end up here.
#[derive(Debug, Error)]
pub enum SkillError {
    /// A config file exists but could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Current working directory could not be determined.
    #[error("Cannot resolve relative path {}: {reason}", path.display())]
    Unresolvable { path: PathBuf, reason: String },
}
