//! Shared test utilities for the espu workspace.
//!
//! This crate provides on-disk fixtures so scanner tests run against real
//! metadata directories. It is a dev-dependency only and never published.
//!
//! # Modules
//!
//! - [`site_packages`]: [`SitePackages`] builder for `site-packages` trees

pub mod site_packages;

pub use site_packages::SitePackages;
