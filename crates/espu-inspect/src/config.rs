//! Inspector configuration.
//!
//! Read from a TOML file:
//!
//! ```toml
//! namespace = "espu"
//! site_packages = ["/usr/lib/python3.12/site-packages"]
//! catalog = "/opt/espu/catalog.toml"   # optional, defaults to the built-in catalog
//! ```
//!
//! or from the environment (`ESPU_SITE_PACKAGES`, `ESPU_CATALOG`,
//! `ESPU_NAMESPACE`).

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use espu_catalog::{Catalog, canonicalize};

use crate::dist_info::DistInfoScanner;
use crate::error::{Error, Result};
use crate::inspector::Inspector;

/// Search path list, split with the platform path separator.
pub const ENV_SITE_PACKAGES: &str = "ESPU_SITE_PACKAGES";
/// Optional catalog file path.
pub const ENV_CATALOG: &str = "ESPU_CATALOG";
/// Optional namespace override.
pub const ENV_NAMESPACE: &str = "ESPU_NAMESPACE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectorConfig {
    /// Namespace prefix shared by every component.
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Metadata directories to search, in priority order.
    #[serde(default)]
    pub site_packages: Vec<PathBuf>,
    /// Catalog file. The built-in catalog is used when unset.
    #[serde(default)]
    pub catalog: Option<PathBuf>,
}

fn default_namespace() -> String {
    "espu".to_string()
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            site_packages: Vec::new(),
            catalog: None,
        }
    }
}

impl InspectorConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let origin = path.display().to_string();

        let content = std::fs::read_to_string(path).map_err(|e| Error::InvalidConfig {
            origin: origin.clone(),
            message: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| Error::InvalidConfig {
            origin,
            message: e.to_string(),
        })
    }

    /// Build configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var_os(key))
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let mut config = Self::default();

        if let Some(paths) = lookup(ENV_SITE_PACKAGES) {
            config.site_packages = std::env::split_paths(&paths)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
        }
        if let Some(catalog) = lookup(ENV_CATALOG).filter(|c| !c.is_empty()) {
            config.catalog = Some(PathBuf::from(catalog));
        }
        if let Some(namespace) = lookup(ENV_NAMESPACE).and_then(|n| n.into_string().ok()) {
            if !namespace.trim().is_empty() {
                config.namespace = namespace;
            }
        }

        config
    }

    /// Load the catalog this configuration points at.
    pub fn load_catalog(&self) -> Result<Catalog> {
        let catalog = match &self.catalog {
            Some(path) => Catalog::load(path)?,
            None => Catalog::builtin()?,
        };

        if canonicalize(catalog.namespace()) != canonicalize(&self.namespace) {
            return Err(Error::NamespaceMismatch {
                catalog: catalog.namespace().to_string(),
                configured: self.namespace.clone(),
            });
        }

        Ok(catalog)
    }

    /// Build an inspector over the configured `site-packages` directories.
    ///
    /// The catalog is loaded here, so a broken catalog fails at startup
    /// rather than on the first query.
    pub fn open(&self) -> Result<Inspector<DistInfoScanner>> {
        if self.site_packages.is_empty() {
            return Err(Error::InvalidConfig {
                origin: "inspector config".to_string(),
                message: "no site-packages directories configured".to_string(),
            });
        }

        let catalog = self.load_catalog()?;
        let scanner = DistInfoScanner::new(self.site_packages.iter().cloned());
        Ok(Inspector::new(catalog, scanner))
    }
}
