//! The catalog of official components.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::identifier::{canonicalize, is_under_namespace};
use crate::kind::ComponentKind;

/// A single official component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentRecord {
    /// Canonical package identifier, e.g. `espu-ext-bezier`.
    #[serde(rename = "package")]
    pub identifier: String,
    /// Component kind.
    pub kind: ComponentKind,
    /// Short component name, e.g. `bezier`.
    #[serde(rename = "name")]
    pub display_name: String,
    /// Names of other catalog components this one depends on.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,
}

impl ComponentRecord {
    pub fn new(
        identifier: impl Into<String>,
        kind: ComponentKind,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            kind,
            display_name: display_name.into(),
            requires: Vec::new(),
        }
    }

    /// Add a dependency on another component by name.
    pub fn requires(mut self, name: impl Into<String>) -> Self {
        self.requires.push(name.into());
        self
    }
}

/// Immutable, versioned listing of every official component in a namespace.
///
/// A catalog is validated once when it is built and never changes afterwards.
/// Records keep their declaration order.
#[derive(Debug, Clone)]
pub struct Catalog {
    version: semver::Version,
    namespace: String,
    records: Vec<ComponentRecord>,
    /// Canonical identifier -> position in `records`.
    by_identifier: HashMap<String, usize>,
    /// Display name -> position in `records`.
    by_name: HashMap<String, usize>,
}

impl Catalog {
    /// Start building a catalog programmatically.
    pub fn builder(namespace: impl Into<String>, version: impl Into<String>) -> CatalogBuilder {
        CatalogBuilder {
            namespace: namespace.into(),
            version: version.into(),
            records: Vec::new(),
        }
    }

    /// Identifiers of all official components, in declaration order.
    pub fn available(&self) -> Vec<String> {
        self.records.iter().map(|r| r.identifier.clone()).collect()
    }

    /// Look up a component by package identifier.
    ///
    /// Spelling variants (`espu_ext_wol`, `ESPU.ext.wol`) resolve to the same
    /// record.
    pub fn get(&self, identifier: &str) -> Option<&ComponentRecord> {
        self.by_identifier
            .get(&canonicalize(identifier))
            .map(|&idx| &self.records[idx])
    }

    /// Check whether a package identifier belongs to the catalog.
    pub fn contains(&self, identifier: &str) -> bool {
        self.by_identifier.contains_key(&canonicalize(identifier))
    }

    /// Look up a component by its short name.
    pub fn info(&self, name: &str) -> Result<&ComponentRecord> {
        self.by_name
            .get(name)
            .map(|&idx| &self.records[idx])
            .ok_or_else(|| Error::UnknownComponent(name.to_string()))
    }

    /// Records of a single kind, in declaration order.
    pub fn by_kind(&self, kind: ComponentKind) -> impl Iterator<Item = &ComponentRecord> {
        self.records.iter().filter(move |r| r.kind == kind)
    }

    /// The core component. Validation guarantees there is exactly one.
    pub fn core(&self) -> &ComponentRecord {
        let idx = self
            .records
            .iter()
            .position(|r| r.kind == ComponentKind::Core)
            .unwrap_or_default();
        &self.records[idx]
    }

    /// All records, in declaration order.
    pub fn records(&self) -> &[ComponentRecord] {
        &self.records
    }

    /// Shared release version of every component in the catalog.
    pub fn version(&self) -> &semver::Version {
        &self.version
    }

    /// Namespace prefix shared by every identifier.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always `false` for a validated catalog.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Check that this catalog was shipped for `core_version`.
    ///
    /// All components are released together, so the catalog and the running
    /// core must agree on major and minor version.
    pub fn ensure_compatible(&self, core_version: &semver::Version) -> Result<()> {
        if self.version.major == core_version.major && self.version.minor == core_version.minor {
            Ok(())
        } else {
            Err(Error::VersionMismatch {
                catalog: self.version.clone(),
                core: core_version.clone(),
            })
        }
    }

    pub(crate) fn validate(
        namespace: String,
        version: &str,
        records: Vec<ComponentRecord>,
    ) -> Result<Self> {
        if canonicalize(&namespace).is_empty() {
            return Err(Error::InvalidNamespace { namespace });
        }

        let version = semver::Version::parse(version.trim()).map_err(|source| {
            Error::InvalidVersion {
                version: version.to_string(),
                source,
            }
        })?;

        if records.is_empty() {
            return Err(Error::Empty);
        }

        let mut by_identifier = HashMap::with_capacity(records.len());
        let mut by_name = HashMap::with_capacity(records.len());
        let mut core: Option<&str> = None;

        for (idx, record) in records.iter().enumerate() {
            if !is_under_namespace(&record.identifier, &namespace) {
                return Err(Error::OutsideNamespace {
                    identifier: record.identifier.clone(),
                    namespace,
                });
            }

            if by_identifier
                .insert(canonicalize(&record.identifier), idx)
                .is_some()
            {
                return Err(Error::DuplicateIdentifier {
                    identifier: record.identifier.clone(),
                });
            }

            if by_name.insert(record.display_name.clone(), idx).is_some() {
                return Err(Error::DuplicateName {
                    name: record.display_name.clone(),
                });
            }

            if record.kind == ComponentKind::Core {
                if let Some(first) = core {
                    return Err(Error::MultipleCore {
                        first: first.to_string(),
                        second: record.identifier.clone(),
                    });
                }
                core = Some(record.identifier.as_str());
            }
        }

        if core.is_none() {
            return Err(Error::MissingCore);
        }

        for record in &records {
            check_identifier(record, &namespace)?;
        }

        for record in &records {
            check_dependencies(record, &records, &by_name)?;
        }

        Ok(Self {
            version,
            namespace,
            records,
            by_identifier,
            by_name,
        })
    }
}

/// Core is packaged as the namespace itself, everything else as
/// `{namespace}-{tag}-{name}`.
fn check_identifier(record: &ComponentRecord, namespace: &str) -> Result<()> {
    let expected = match record.kind.tag() {
        None => canonicalize(namespace),
        Some(tag) => canonicalize(&format!("{namespace}-{tag}-{}", record.display_name)),
    };

    if canonicalize(&record.identifier) == expected {
        Ok(())
    } else {
        Err(Error::NonCanonicalIdentifier {
            name: record.display_name.clone(),
            expected,
            found: record.identifier.clone(),
        })
    }
}

/// Enforce the dependency rules for one record.
///
/// Every dependency must exist. Libraries may only depend on libraries and
/// core declares no dependencies at all.
fn check_dependencies(
    record: &ComponentRecord,
    records: &[ComponentRecord],
    by_name: &HashMap<String, usize>,
) -> Result<()> {
    for dependency in &record.requires {
        let Some(&idx) = by_name.get(dependency) else {
            return Err(Error::UnknownDependency {
                name: record.display_name.clone(),
                dependency: dependency.clone(),
            });
        };
        let target = &records[idx];

        let reason = if target.display_name == record.display_name {
            Some("a component cannot depend on itself".to_string())
        } else if record.kind == ComponentKind::Core {
            Some("core cannot declare dependencies".to_string())
        } else if record.kind == ComponentKind::Library && target.kind != ComponentKind::Library {
            Some(format!("library cannot depend on non-library (kind={})", target.kind))
        } else {
            None
        };

        if let Some(reason) = reason {
            return Err(Error::InvalidDependency {
                name: record.display_name.clone(),
                dependency: dependency.clone(),
                reason,
            });
        }
    }

    Ok(())
}

/// Programmatic [`Catalog`] construction.
///
/// `build()` runs the same validation as the file loaders.
#[derive(Debug, Clone)]
pub struct CatalogBuilder {
    namespace: String,
    version: String,
    records: Vec<ComponentRecord>,
}

impl CatalogBuilder {
    /// Append a record.
    pub fn component(mut self, record: ComponentRecord) -> Self {
        self.records.push(record);
        self
    }

    /// Append a record built from its parts.
    pub fn with(
        self,
        identifier: impl Into<String>,
        kind: ComponentKind,
        display_name: impl Into<String>,
    ) -> Self {
        self.component(ComponentRecord::new(identifier, kind, display_name))
    }

    pub fn build(self) -> Result<Catalog> {
        Catalog::validate(self.namespace, &self.version, self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Catalog {
        Catalog::builder("espu", "1.2.0")
            .with("espu", ComponentKind::Core, "core")
            .component(
                ComponentRecord::new("espu-ext-bezier", ComponentKind::Extension, "bezier")
                    .requires("vector"),
            )
            .with("espu-lib-vector", ComponentKind::Library, "vector")
            .build()
            .unwrap()
    }

    #[test]
    fn test_available_preserves_declaration_order() {
        let catalog = sample();
        assert_eq!(
            catalog.available(),
            vec!["espu", "espu-ext-bezier", "espu-lib-vector"]
        );
    }

    #[test]
    fn test_get_normalizes_identifier() {
        let catalog = sample();
        let record = catalog.get("ESPU_ext.Bezier").unwrap();
        assert_eq!(record.display_name, "bezier");
        assert!(catalog.contains("espu.lib.vector"));
        assert!(catalog.get("espu-ext-rogue").is_none());
    }

    #[test]
    fn test_info_by_name() {
        let catalog = sample();
        assert_eq!(catalog.info("vector").unwrap().identifier, "espu-lib-vector");
        assert!(matches!(
            catalog.info("rogue"),
            Err(Error::UnknownComponent(name)) if name == "rogue"
        ));
    }

    #[test]
    fn test_core_and_by_kind() {
        let catalog = sample();
        assert_eq!(catalog.core().identifier, "espu");
        let exts: Vec<_> = catalog
            .by_kind(ComponentKind::Extension)
            .map(|r| r.display_name.as_str())
            .collect();
        assert_eq!(exts, vec!["bezier"]);
    }

    #[test]
    fn test_ensure_compatible() {
        let catalog = sample();
        assert!(catalog.ensure_compatible(&semver::Version::new(1, 2, 7)).is_ok());
        assert!(matches!(
            catalog.ensure_compatible(&semver::Version::new(1, 3, 0)),
            Err(Error::VersionMismatch { .. })
        ));
        assert!(catalog.ensure_compatible(&semver::Version::new(2, 2, 0)).is_err());
    }

    #[test]
    fn test_identifier_must_follow_kind_and_name() {
        let err = Catalog::builder("espu", "0.1.0")
            .with("espu", ComponentKind::Core, "core")
            .with("espu-lib-vector", ComponentKind::Extension, "vector")
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            Error::NonCanonicalIdentifier { ref expected, .. } if expected == "espu-ext-vector"
        ));

        let catalog = Catalog::builder("ESPU", "0.1.0")
            .with("espu", ComponentKind::Core, "core")
            .with("espu_lib_vector", ComponentKind::Library, "Vector")
            .build()
            .unwrap();
        assert!(catalog.contains("espu-lib-vector"));
    }

    #[test]
    fn test_len() {
        let catalog = sample();
        assert_eq!(catalog.len(), 3);
        assert!(!catalog.is_empty());
        assert_eq!(catalog.namespace(), "espu");
        assert_eq!(catalog.version(), &semver::Version::new(1, 2, 0));
    }
}
