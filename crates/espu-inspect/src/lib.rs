//! Installation inspection for the ESPU namespace.
//!
//! An [`Inspector`] pairs an immutable [`Catalog`](espu_catalog::Catalog)
//! with a [`NamespaceScanner`] and reports which official components are
//! installed, which are missing, and which namespace packages are unknown.
//!
//! ```no_run
//! use espu_inspect::InspectorConfig;
//!
//! let inspector = InspectorConfig::from_env().open()?;
//! for id in inspector.unknown()? {
//!     println!("unrecognized package: {id}");
//! }
//! # Ok::<(), espu_inspect::Error>(())
//! ```

pub mod config;
pub mod dist_info;
pub mod error;
pub mod inspector;
pub mod logging;
pub mod package;
pub mod scanner;

pub use config::InspectorConfig;
pub use dist_info::DistInfoScanner;
pub use error::{Error, Result};
pub use inspector::{InspectionReport, Inspector, VersionDrift};
pub use package::InstalledPackage;
pub use scanner::{InMemoryScanner, NamespaceScanner};
