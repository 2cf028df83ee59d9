//! Package identifier normalization.
//!
//! Installed distributions spell their names inconsistently (`espu_ext_wol`,
//! `ESPU.ext.wol`, `espu-ext-wol`). All comparisons go through
//! [`canonicalize`], while reported identifiers keep their original spelling.

/// Lowercase `name` and collapse every run of `-`, `_` and `.` into one `-`.
pub fn canonicalize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_separator = false;

    for ch in name.trim().chars() {
        if matches!(ch, '-' | '_' | '.') {
            if !in_separator {
                out.push('-');
                in_separator = true;
            }
        } else {
            out.extend(ch.to_lowercase());
            in_separator = false;
        }
    }

    out
}

/// Whether `identifier` falls under `namespace`.
///
/// The canonical identifier must equal the canonical namespace or start with
/// it followed by a separator, so `espuxyz` is not part of `espu`.
pub fn is_under_namespace(identifier: &str, namespace: &str) -> bool {
    let identifier = canonicalize(identifier);
    let namespace = canonicalize(namespace);

    if namespace.is_empty() {
        return false;
    }

    match identifier.strip_prefix(namespace.as_str()) {
        Some(rest) => rest.is_empty() || rest.starts_with('-'),
        None => false,
    }
}

/// Whether `identifier` starts with the namespace text without belonging to
/// it, e.g. `espuu-ext-evil` against `espu`.
pub fn is_namespace_lookalike(identifier: &str, namespace: &str) -> bool {
    let namespace = canonicalize(namespace);
    !namespace.is_empty()
        && canonicalize(identifier).starts_with(namespace.as_str())
        && !is_under_namespace(identifier, &namespace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("espu", "espu")]
    #[case("ESPU", "espu")]
    #[case("espu_ext_wol", "espu-ext-wol")]
    #[case("espu.ext.wol", "espu-ext-wol")]
    #[case("espu--_.lib__vector", "espu-lib-vector")]
    #[case("  espu-ext-bezier ", "espu-ext-bezier")]
    fn test_canonicalize(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(canonicalize(input), expected);
    }

    #[rstest]
    #[case("espu", "espu", true)]
    #[case("espu-ext-wol", "espu", true)]
    #[case("espu.ext-rogue", "espu", true)]
    #[case("Espu_Lib_Vector", "espu", true)]
    #[case("espuxyz", "espu", false)]
    #[case("numpy", "espu", false)]
    #[case("esp", "espu", false)]
    #[case("espu", "", false)]
    fn test_is_under_namespace(
        #[case] identifier: &str,
        #[case] namespace: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(is_under_namespace(identifier, namespace), expected);
    }

    #[rstest]
    #[case("espuu-ext-evil", true)]
    #[case("espuxyz", true)]
    #[case("ESPU_", false)]
    #[case("espu-ext-wol", false)]
    #[case("espu", false)]
    #[case("numpy", false)]
    fn test_is_namespace_lookalike(#[case] identifier: &str, #[case] expected: bool) {
        assert_eq!(is_namespace_lookalike(identifier, "espu"), expected);
    }
}
