//! Error types for espu-catalog

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading or querying a [`Catalog`](crate::Catalog).
///
/// Everything except [`Error::UnknownComponent`] and
/// [`Error::VersionMismatch`] is a load failure and is fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error reading catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {format} catalog from {origin}: {message}")]
    Parse {
        origin: String,
        format: String,
        message: String,
    },

    #[error("unsupported catalog format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("catalog declares no components")]
    Empty,

    #[error("invalid namespace '{namespace}'")]
    InvalidNamespace { namespace: String },

    #[error("invalid catalog version '{version}': {source}")]
    InvalidVersion {
        version: String,
        #[source]
        source: semver::Error,
    },

    #[error("duplicate component identifier '{identifier}'")]
    DuplicateIdentifier { identifier: String },

    #[error("duplicate component name '{name}'")]
    DuplicateName { name: String },

    #[error("catalog declares no core component")]
    MissingCore,

    #[error("catalog declares more than one core component: '{first}' and '{second}'")]
    MultipleCore { first: String, second: String },

    #[error("component '{identifier}' is outside namespace '{namespace}'")]
    OutsideNamespace {
        identifier: String,
        namespace: String,
    },

    #[error("component '{name}' must be packaged as '{expected}', found '{found}'")]
    NonCanonicalIdentifier {
        name: String,
        expected: String,
        found: String,
    },

    #[error("unknown dependency '{dependency}' referenced by '{name}'")]
    UnknownDependency { name: String, dependency: String },

    #[error("invalid dependency of '{name}' on '{dependency}': {reason}")]
    InvalidDependency {
        name: String,
        dependency: String,
        reason: String,
    },

    #[error("unknown component: {0}")]
    UnknownComponent(String),

    #[error("catalog version {catalog} is incompatible with core version {core}")]
    VersionMismatch {
        catalog: semver::Version,
        core: semver::Version,
    },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error came from loading or validating a catalog.
    pub fn is_load_error(&self) -> bool {
        !matches!(
            self,
            Error::UnknownComponent(_) | Error::VersionMismatch { .. }
        )
    }
}
