//! Installed distribution metadata.

use serde::Serialize;

use espu_catalog::canonicalize;

/// One installed distribution as reported by the host package metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstalledPackage {
    /// Distribution name as spelled in its metadata.
    pub name: String,
    /// Installed version, if the metadata declares one.
    pub version: Option<String>,
    /// Installed file paths, `/`-separated and relative to the install root.
    pub files: Vec<String>,
}

impl InstalledPackage {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: Some(version.into()),
            files: Vec::new(),
        }
    }

    /// Attach installed file paths.
    pub fn with_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files.extend(files.into_iter().map(Into::into));
        self
    }

    /// Name in canonical form for comparisons.
    pub fn canonical_name(&self) -> String {
        canonicalize(&self.name)
    }
}
