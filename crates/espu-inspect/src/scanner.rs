//! NamespaceScanner trait and the in-memory implementation.

use espu_catalog::{canonicalize, is_namespace_lookalike, is_under_namespace};

use crate::error::{Error, Result};
use crate::package::InstalledPackage;

/// Read-only view of the host environment's installed-package metadata.
///
/// Only [`distributions`](NamespaceScanner::distributions) is required.
/// Implementations backed by a real metadata store may override
/// [`scan`](NamespaceScanner::scan) and [`resolve`](NamespaceScanner::resolve)
/// with cheaper lookups, as long as the results match the defaults.
///
/// Every method reads the store at call time. Implementations must not cache.
pub trait NamespaceScanner {
    /// Every installed distribution, in a discovery order that is stable for
    /// an unchanged environment.
    fn distributions(&self) -> Result<Vec<InstalledPackage>>;

    /// Installed distributions whose name falls under `namespace`.
    ///
    /// Names that merely start with the namespace text (`espuu-ext-evil`)
    /// are excluded and logged at debug level.
    fn scan(&self, namespace: &str) -> Result<Vec<InstalledPackage>> {
        Ok(self
            .distributions()?
            .into_iter()
            .filter(|p| {
                if is_namespace_lookalike(&p.name, namespace) {
                    tracing::debug!(
                        package = %p.name,
                        namespace,
                        "Package name resembles namespace but is outside it"
                    );
                }
                is_under_namespace(&p.name, namespace)
            })
            .collect())
    }

    /// Resolve the metadata of a single distribution.
    ///
    /// `Ok(None)` means the package is not installed. An error means the
    /// store could not answer.
    fn resolve(&self, identifier: &str) -> Result<Option<InstalledPackage>> {
        let wanted = canonicalize(identifier);
        Ok(self
            .distributions()?
            .into_iter()
            .find(|p| p.canonical_name() == wanted))
    }
}

impl<T: NamespaceScanner + ?Sized> NamespaceScanner for &T {
    fn distributions(&self) -> Result<Vec<InstalledPackage>> {
        (**self).distributions()
    }

    fn scan(&self, namespace: &str) -> Result<Vec<InstalledPackage>> {
        (**self).scan(namespace)
    }

    fn resolve(&self, identifier: &str) -> Result<Option<InstalledPackage>> {
        (**self).resolve(identifier)
    }
}

impl<T: NamespaceScanner + ?Sized> NamespaceScanner for Box<T> {
    fn distributions(&self) -> Result<Vec<InstalledPackage>> {
        (**self).distributions()
    }

    fn scan(&self, namespace: &str) -> Result<Vec<InstalledPackage>> {
        (**self).scan(namespace)
    }

    fn resolve(&self, identifier: &str) -> Result<Option<InstalledPackage>> {
        (**self).resolve(identifier)
    }
}

/// Scanner over a fixed list of packages.
///
/// Can be switched into a failing state to simulate an unreadable or corrupt
/// metadata store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryScanner {
    packages: Vec<InstalledPackage>,
    failure: Option<String>,
}

impl InMemoryScanner {
    /// Create a scanner with nothing installed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scanner with the given packages installed, in order.
    pub fn with_packages(packages: impl IntoIterator<Item = InstalledPackage>) -> Self {
        Self {
            packages: packages.into_iter().collect(),
            failure: None,
        }
    }

    /// Create a scanner whose every query fails with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            packages: Vec::new(),
            failure: Some(reason.into()),
        }
    }

    /// Add a package to the simulated environment.
    pub fn install(&mut self, package: InstalledPackage) {
        self.packages.push(package);
    }

    /// Remove every package whose canonical name matches `name`.
    pub fn uninstall(&mut self, name: &str) {
        let wanted = canonicalize(name);
        self.packages.retain(|p| p.canonical_name() != wanted);
    }

    /// Make subsequent queries fail with `reason`.
    pub fn fail_with(&mut self, reason: impl Into<String>) {
        self.failure = Some(reason.into());
    }

    /// Clear a previously set failure.
    pub fn recover(&mut self) {
        self.failure = None;
    }
}

impl NamespaceScanner for InMemoryScanner {
    fn distributions(&self) -> Result<Vec<InstalledPackage>> {
        if let Some(reason) = &self.failure {
            return Err(Error::inspection("<memory>", reason.clone()));
        }
        Ok(self.packages.clone())
    }
}
