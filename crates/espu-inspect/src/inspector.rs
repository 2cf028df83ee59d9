//! Reconciles the catalog against the installed environment.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::Serialize;

use espu_catalog::{Catalog, canonicalize, is_under_namespace};

use crate::error::Result;
use crate::package::InstalledPackage;
use crate::scanner::NamespaceScanner;

/// All inspection views derived from a single environment snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InspectionReport {
    /// Every catalog identifier, in declaration order.
    pub available: Vec<String>,
    /// Catalog identifiers that are installed, in declaration order.
    pub installed: Vec<String>,
    /// Catalog identifiers that are not installed, in declaration order.
    pub missing: Vec<String>,
    /// Namespace packages absent from the catalog, in discovery order.
    pub unknown: Vec<String>,
}

/// An installed catalog package whose version differs from the catalog's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionDrift {
    pub identifier: String,
    pub expected: semver::Version,
    /// Version from the installed metadata, `None` if it declares none.
    pub installed: Option<String>,
}

/// Answers "what is installed?" for one catalog and one environment.
///
/// Every environment query goes back to the scanner. Results are never
/// cached, so two calls observe the environment as it is at call time.
#[derive(Debug, Clone)]
pub struct Inspector<S> {
    catalog: Catalog,
    scanner: S,
}

impl<S: NamespaceScanner> Inspector<S> {
    pub fn new(catalog: Catalog, scanner: S) -> Self {
        Self { catalog, scanner }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn scanner(&self) -> &S {
        &self.scanner
    }

    /// Every official component identifier. Never touches the environment.
    pub fn available(&self) -> Vec<String> {
        self.catalog.available()
    }

    /// Catalog identifiers whose package metadata resolves, in catalog order.
    pub fn installed(&self) -> Result<Vec<String>> {
        let mut installed = Vec::new();

        for record in self.catalog.records() {
            if self.scanner.resolve(&record.identifier)?.is_some() {
                installed.push(record.identifier.clone());
            }
        }

        tracing::debug!(
            installed = installed.len(),
            available = self.catalog.len(),
            "Resolved catalog components"
        );
        Ok(installed)
    }

    /// Catalog identifiers that are not installed, in catalog order.
    pub fn missing(&self) -> Result<Vec<String>> {
        let installed: HashSet<String> = self
            .installed()?
            .iter()
            .map(|id| canonicalize(id))
            .collect();

        Ok(self
            .catalog
            .records()
            .iter()
            .filter(|r| !installed.contains(&canonicalize(&r.identifier)))
            .map(|r| r.identifier.clone())
            .collect())
    }

    /// Installed namespace packages that the catalog does not know about.
    ///
    /// Each one is logged as a warning. Unknown packages are a signal for
    /// manual review, never an error.
    pub fn unknown(&self) -> Result<Vec<String>> {
        let discovered = self.scanner.scan(self.catalog.namespace())?;
        Ok(self.unknown_from(&discovered))
    }

    /// Compute every view from one namespace scan.
    pub fn report(&self) -> Result<InspectionReport> {
        let discovered = self.scanner.scan(self.catalog.namespace())?;
        let present: HashSet<String> = discovered.iter().map(|p| p.canonical_name()).collect();

        let (installed, missing): (Vec<_>, Vec<_>) = self
            .catalog
            .records()
            .iter()
            .map(|r| r.identifier.clone())
            .partition(|id| present.contains(&canonicalize(id)));

        Ok(InspectionReport {
            available: self.catalog.available(),
            installed,
            missing,
            unknown: self.unknown_from(&discovered),
        })
    }

    /// Map each installed distribution to the components it ships files for.
    ///
    /// Path rules under the namespace package directory:
    /// - `<ns>/core/...` contributes `core`
    /// - `<ns>/lib/<name>/...` contributes `<name>`
    /// - `<ns>/<name>/...` contributes `<name>`
    ///
    /// Loose files directly under `<ns>/` or `<ns>/lib/` contribute nothing.
    /// Distributions outside the namespace are included, since a foreign
    /// package writing into the namespace directory is exactly what this
    /// view exists to expose.
    pub fn contributors(&self) -> Result<BTreeMap<String, BTreeSet<String>>> {
        let root = module_root(self.catalog.namespace());
        let mut result: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

        for package in self.scanner.distributions()? {
            let found: BTreeSet<String> = package
                .files
                .iter()
                .filter_map(|file| contributed_component(&root, file))
                .collect();

            if !found.is_empty() {
                result.entry(package.name).or_default().extend(found);
            }
        }

        Ok(result)
    }

    /// Installed catalog packages whose version differs from the catalog's.
    ///
    /// Every component shares the catalog version. Missing or unparsable
    /// installed versions count as drift.
    pub fn version_drift(&self) -> Result<Vec<VersionDrift>> {
        let expected = self.catalog.version();
        let mut drift = Vec::new();

        for record in self.catalog.records() {
            let Some(package) = self.scanner.resolve(&record.identifier)? else {
                continue;
            };

            let matches = package
                .version
                .as_deref()
                .and_then(|v| semver::Version::parse(v.trim()).ok())
                .is_some_and(|v| &v == expected);

            if !matches {
                tracing::warn!(
                    package = %record.identifier,
                    expected = %expected,
                    installed = ?package.version,
                    "Installed version differs from catalog"
                );
                drift.push(VersionDrift {
                    identifier: record.identifier.clone(),
                    expected: expected.clone(),
                    installed: package.version,
                });
            }
        }

        Ok(drift)
    }

    fn unknown_from(&self, discovered: &[InstalledPackage]) -> Vec<String> {
        let namespace = self.catalog.namespace();
        let mut seen = HashSet::new();
        let mut unknown = Vec::new();

        for package in discovered {
            if !is_under_namespace(&package.name, namespace) {
                continue;
            }
            let canonical = package.canonical_name();
            if self.catalog.contains(&canonical) || !seen.insert(canonical) {
                continue;
            }

            tracing::warn!(
                package = %package.name,
                version = ?package.version,
                "Unknown component installed in namespace"
            );
            unknown.push(package.name.clone());
        }

        unknown
    }
}

/// Import package directory for a namespace (`espu-x` installs as `espu_x`).
fn module_root(namespace: &str) -> String {
    canonicalize(namespace).replace('-', "_")
}

fn contributed_component(root: &str, file: &str) -> Option<String> {
    let parts: Vec<&str> = file.split('/').collect();
    if parts.first() != Some(&root) {
        return None;
    }

    let name = match parts.as_slice() {
        [_, "core", _, ..] => "core",
        [_, "lib", name, _, ..] => *name,
        [_, "lib", ..] => return None,
        [_, name, _, ..] => *name,
        _ => return None,
    };

    (name != "__pycache__").then(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("espu/core/__init__.py", Some("core"))]
    #[case("espu/core/sub/mod.py", Some("core"))]
    #[case("espu/lib/vector/vector2.py", Some("vector"))]
    #[case("espu/lib/__init__.py", None)]
    #[case("espu/bezier/curve.py", Some("bezier"))]
    #[case("espu/__init__.py", None)]
    #[case("espu/__pycache__/x.pyc", None)]
    #[case("espu/lib/__pycache__/x.pyc", None)]
    #[case("espu-0.1.0.dist-info/RECORD", None)]
    #[case("numpy/core/multiarray.py", None)]
    fn test_contributed_component(#[case] file: &str, #[case] expected: Option<&str>) {
        assert_eq!(contributed_component("espu", file).as_deref(), expected);
    }

    #[test]
    fn test_module_root() {
        assert_eq!(module_root("espu"), "espu");
        assert_eq!(module_root("Espu.Tools"), "espu_tools");
    }
}
