//! Catalog of official ESPU components.
//!
//! The catalog is the ground truth of which packages belong to the namespace.
//! It is loaded once, validated, and never mutated afterwards. Reconciling it
//! against the installed environment is the job of `espu-inspect`.

pub mod catalog;
pub mod error;
pub mod identifier;
pub mod kind;
mod loader;

pub use catalog::{Catalog, CatalogBuilder, ComponentRecord};
pub use error::{Error, Result};
pub use identifier::{canonicalize, is_namespace_lookalike, is_under_namespace};
pub use kind::ComponentKind;
