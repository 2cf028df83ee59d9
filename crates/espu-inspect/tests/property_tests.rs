use std::collections::HashSet;

use espu_catalog::{Catalog, canonicalize};
use espu_inspect::{InMemoryScanner, InstalledPackage, Inspector};
use proptest::prelude::*;

/// Package names drawn from the builtin catalog, from the namespace and from
/// outside it, with installer-style spelling variants.
fn package_name() -> impl Strategy<Value = String> {
    let catalog_ids: Vec<String> = Catalog::builtin().unwrap().available();
    prop_oneof![
        prop::sample::select(catalog_ids),
        "espu[-_.](ext|lib)[-_.][a-z]{1,6}",
        "[a-z]{1,8}",
    ]
    .prop_flat_map(|name| {
        let upper = name.to_uppercase();
        let underscored = name.replace('-', "_");
        prop::sample::select(vec![name, upper, underscored])
    })
}

fn environment() -> impl Strategy<Value = Vec<InstalledPackage>> {
    prop::collection::vec(
        package_name().prop_map(|name| InstalledPackage::new(name, "0.1.0")),
        0..12,
    )
}

proptest! {
    #[test]
    fn test_installed_is_subset_of_available(packages in environment()) {
        let inspector = Inspector::new(
            Catalog::builtin().unwrap(),
            InMemoryScanner::with_packages(packages),
        );
        let available: HashSet<String> = inspector.available().into_iter().collect();

        for id in inspector.installed().unwrap() {
            prop_assert!(available.contains(&id), "{} not available", id);
        }
    }

    #[test]
    fn test_unknown_never_overlaps_catalog(packages in environment()) {
        let inspector = Inspector::new(
            Catalog::builtin().unwrap(),
            InMemoryScanner::with_packages(packages),
        );
        let available: HashSet<String> =
            inspector.available().iter().map(|id| canonicalize(id)).collect();

        let unknown = inspector.unknown().unwrap();
        let mut seen = HashSet::new();
        for id in &unknown {
            let canonical = canonicalize(id);
            prop_assert!(!available.contains(&canonical), "{} is a catalog member", id);
            prop_assert!(canonical.starts_with("espu-"), "{} is outside the namespace", id);
            prop_assert!(seen.insert(canonical), "{} reported twice", id);
        }
    }

    #[test]
    fn test_views_are_consistent_and_idempotent(packages in environment()) {
        let inspector = Inspector::new(
            Catalog::builtin().unwrap(),
            InMemoryScanner::with_packages(packages),
        );

        let installed = inspector.installed().unwrap();
        prop_assert_eq!(&installed, &inspector.installed().unwrap());

        let report = inspector.report().unwrap();
        prop_assert_eq!(&report.installed, &installed);
        prop_assert_eq!(&report.unknown, &inspector.unknown().unwrap());
        prop_assert_eq!(&report.missing, &inspector.missing().unwrap());
        prop_assert_eq!(
            report.installed.len() + report.missing.len(),
            report.available.len()
        );
    }
}
