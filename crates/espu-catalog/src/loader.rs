//! Catalog loading from TOML and JSON.
//!
//! The on-disk layout lists components as an ordered array so declaration
//! order survives parsing:
//!
//! ```toml
//! version = "0.1.0"
//! namespace = "espu"
//!
//! [[component]]
//! name = "core"
//! package = "espu"
//! kind = "core"
//!
//! [[component]]
//! name = "bezier"
//! package = "espu-ext-bezier"
//! kind = "extension"
//! requires = ["vector"]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, ComponentRecord};
use crate::error::{Error, Result};

/// Catalog shipped with this release.
const BUILTIN_CATALOG: &str = include_str!("../catalog.toml");

/// Raw catalog file contents before validation.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    version: String,
    namespace: String,
    #[serde(default, rename = "component", alias = "components")]
    components: Vec<ComponentRecord>,
}

impl CatalogFile {
    fn into_catalog(self) -> Result<Catalog> {
        Catalog::validate(self.namespace, &self.version, self.components)
    }
}

impl Catalog {
    /// Parse the catalog bundled into this crate.
    pub fn builtin() -> Result<Self> {
        Self::parse_toml(BUILTIN_CATALOG, "<builtin>")
    }

    /// Parse a catalog from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Self::parse_toml(content, "<inline>")
    }

    /// Parse a catalog from JSON text.
    pub fn from_json_str(content: &str) -> Result<Self> {
        Self::parse_json(content, "<inline>")
    }

    /// Load a catalog file, choosing the format from its extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        if !matches!(extension.as_str(), "toml" | "json") {
            return Err(Error::UnsupportedFormat { extension });
        }

        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let origin = path.display().to_string();

        let catalog = if extension == "toml" {
            Self::parse_toml(&content, &origin)?
        } else {
            Self::parse_json(&content, &origin)?
        };

        tracing::info!(
            path = %origin,
            components = catalog.len(),
            version = %catalog.version(),
            "Loaded component catalog"
        );
        Ok(catalog)
    }

    /// Render the catalog back to its TOML file form.
    pub fn to_toml_string(&self) -> Result<String> {
        let file = CatalogFile {
            version: self.version().to_string(),
            namespace: self.namespace().to_string(),
            components: self.records().to_vec(),
        };
        toml::to_string(&file).map_err(|e| Error::Parse {
            origin: "<memory>".to_string(),
            format: "toml".to_string(),
            message: e.to_string(),
        })
    }

    fn parse_toml(content: &str, origin: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(content).map_err(|e| Error::Parse {
            origin: origin.to_string(),
            format: "toml".to_string(),
            message: e.to_string(),
        })?;
        file.into_catalog()
    }

    fn parse_json(content: &str, origin: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(content).map_err(|e| Error::Parse {
            origin: origin.to_string(),
            format: "json".to_string(),
            message: e.to_string(),
        })?;
        file.into_catalog()
    }
}
