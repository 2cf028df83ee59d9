//! Error types for espu-inspect

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The catalog failed to load or validate.
    #[error("catalog error: {0}")]
    Catalog(#[from] espu_catalog::Error),

    /// Installed-package metadata could not be read.
    ///
    /// Raised instead of returning an empty or partial view, so callers can
    /// tell "nothing installed" apart from "could not inspect".
    #[error("environment inspection failed at {path}: {reason}")]
    EnvironmentInspection { path: PathBuf, reason: String },

    #[error("invalid configuration from {origin}: {message}")]
    InvalidConfig { origin: String, message: String },

    #[error("catalog namespace '{catalog}' does not match configured namespace '{configured}'")]
    NamespaceMismatch { catalog: String, configured: String },
}

impl Error {
    pub fn inspection(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::EnvironmentInspection {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::inspection(path, source.to_string())
    }

    /// Whether the host environment could not be inspected.
    pub fn is_environment_failure(&self) -> bool {
        matches!(self, Error::EnvironmentInspection { .. })
    }
}
