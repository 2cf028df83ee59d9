//! Component kinds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What role a component plays in the ecosystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    /// The namespace's root package. Exactly one per catalog.
    Core,

    /// An optional feature package built on top of core.
    #[serde(alias = "ext")]
    Extension,

    /// A shared library package. Libraries may only depend on other libraries.
    #[serde(alias = "lib")]
    Library,
}

impl ComponentKind {
    /// The short tag used in package identifiers (`ext`, `lib`).
    pub fn tag(&self) -> Option<&'static str> {
        match self {
            ComponentKind::Core => None,
            ComponentKind::Extension => Some("ext"),
            ComponentKind::Library => Some("lib"),
        }
    }
}

impl FromStr for ComponentKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "core" => Ok(ComponentKind::Core),
            "extension" | "ext" => Ok(ComponentKind::Extension),
            "library" | "lib" => Ok(ComponentKind::Library),
            _ => Err(format!("unknown component kind: {s}")),
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentKind::Core => write!(f, "core"),
            ComponentKind::Extension => write!(f, "extension"),
            ComponentKind::Library => write!(f, "library"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_accepts_short_forms() {
        assert_eq!("core".parse::<ComponentKind>().unwrap(), ComponentKind::Core);
        assert_eq!("ext".parse::<ComponentKind>().unwrap(), ComponentKind::Extension);
        assert_eq!(
            "Extension".parse::<ComponentKind>().unwrap(),
            ComponentKind::Extension
        );
        assert_eq!("lib".parse::<ComponentKind>().unwrap(), ComponentKind::Library);
        assert_eq!(
            "library".parse::<ComponentKind>().unwrap(),
            ComponentKind::Library
        );
        assert!("plugin".parse::<ComponentKind>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(ComponentKind::Core.to_string(), "core");
        assert_eq!(ComponentKind::Extension.to_string(), "extension");
        assert_eq!(ComponentKind::Library.to_string(), "library");
    }

    #[test]
    fn test_tag() {
        assert_eq!(ComponentKind::Core.tag(), None);
        assert_eq!(ComponentKind::Extension.tag(), Some("ext"));
        assert_eq!(ComponentKind::Library.tag(), Some("lib"));
    }
}
