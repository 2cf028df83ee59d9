//! Scanner over `site-packages` style metadata directories.
//!
//! Each installed distribution owns one metadata directory next to the code
//! it installed:
//!
//! ```text
//! site-packages/
//!   espu/
//!     core/__init__.py
//!   espu-0.1.0.dist-info/
//!     METADATA          # "Name: espu" / "Version: 0.1.0"
//!     RECORD            # espu/core/__init__.py,sha256=...,120
//!   espu_ext_wol-0.1.0.dist-info/
//!   legacy_pkg-1.0-py3.12.egg-info/
//!     PKG-INFO
//!     installed-files.txt
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::package::InstalledPackage;
use crate::scanner::NamespaceScanner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MetadataFormat {
    DistInfo,
    EggInfo,
}

impl MetadataFormat {
    fn metadata_file(&self) -> &'static str {
        match self {
            MetadataFormat::DistInfo => "METADATA",
            MetadataFormat::EggInfo => "PKG-INFO",
        }
    }

    fn file_list(&self) -> &'static str {
        match self {
            MetadataFormat::DistInfo => "RECORD",
            MetadataFormat::EggInfo => "installed-files.txt",
        }
    }
}

/// A metadata directory found on a search path.
#[derive(Debug)]
struct MetadataDir {
    path: PathBuf,
    format: MetadataFormat,
}

/// Reads installed distributions from one or more `site-packages` directories.
///
/// Discovery order is search-path order, then directory-name order within a
/// path. Nothing is cached: every call re-reads the filesystem.
///
/// Directory names are not trusted. Every query reads the `Name:` header of
/// every metadata directory, so a distribution installed under a misleading
/// directory name is still attributed to the name it declares. Any unreadable
/// metadata fails the whole query.
#[derive(Debug, Clone)]
pub struct DistInfoScanner {
    search_paths: Vec<PathBuf>,
}

impl DistInfoScanner {
    pub fn new<I, P>(search_paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            search_paths: search_paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Directories searched, in priority order.
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    fn metadata_dirs(&self) -> Result<Vec<MetadataDir>> {
        let mut found = Vec::new();

        for root in &self.search_paths {
            let entries = fs::read_dir(root).map_err(|e| Error::io(root, e))?;
            let mut dirs = Vec::new();

            for entry in entries {
                let entry = entry.map_err(|e| Error::io(root, e))?;
                let raw_name = entry.file_name();
                let Some(file_name) = raw_name.to_str() else {
                    if split_metadata_suffix(&raw_name.to_string_lossy()).is_some() {
                        return Err(Error::inspection(
                            entry.path(),
                            "metadata directory name is not valid UTF-8",
                        ));
                    }
                    tracing::debug!("Skipping non UTF-8 entry: {:?}", entry.path());
                    continue;
                };
                let Some((format, _)) = split_metadata_suffix(file_name) else {
                    continue;
                };

                let path = entry.path();
                if !path.is_dir() {
                    tracing::debug!("Skipping metadata file that is not a directory: {:?}", path);
                    continue;
                }

                dirs.push(MetadataDir { path, format });
            }

            dirs.sort_by(|a, b| a.path.cmp(&b.path));
            found.extend(dirs);
        }

        Ok(found)
    }

    fn read_distribution(&self, dir: &MetadataDir) -> Result<InstalledPackage> {
        let metadata_path = dir.path.join(dir.format.metadata_file());
        let content =
            fs::read_to_string(&metadata_path).map_err(|e| Error::io(&metadata_path, e))?;
        let (name, version) = parse_headers(&content);

        let name = name.ok_or_else(|| Error::inspection(&metadata_path, "missing Name header"))?;
        let files = self.read_file_list(dir)?;

        Ok(InstalledPackage {
            name,
            version,
            files,
        })
    }

    fn read_file_list(&self, dir: &MetadataDir) -> Result<Vec<String>> {
        let list_path = dir.path.join(dir.format.file_list());
        if !list_path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&list_path).map_err(|e| Error::io(&list_path, e))?;
        let mut files = Vec::new();

        // egg-info lists paths relative to the metadata directory itself
        let relative_to = match dir.format {
            MetadataFormat::DistInfo => None,
            MetadataFormat::EggInfo => dir_name(&dir.path),
        };

        for (idx, line) in content.lines().enumerate() {
            let entry = match dir.format {
                MetadataFormat::DistInfo => record_path(line).map_err(|reason| {
                    Error::inspection(&list_path, format!("line {}: {}", idx + 1, reason))
                })?,
                MetadataFormat::EggInfo => {
                    let line = line.trim();
                    (!line.is_empty()).then(|| line.to_string())
                }
            };

            let Some(entry) = entry else {
                continue;
            };

            files.push(normalize_relative(relative_to.as_deref(), &entry));
        }

        Ok(files)
    }
}

impl NamespaceScanner for DistInfoScanner {
    fn distributions(&self) -> Result<Vec<InstalledPackage>> {
        let packages = self
            .metadata_dirs()?
            .iter()
            .map(|dir| self.read_distribution(dir))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(count = packages.len(), "Read installed distributions");
        Ok(packages)
    }
}

fn split_metadata_suffix(file_name: &str) -> Option<(MetadataFormat, &str)> {
    if let Some(base) = file_name.strip_suffix(".dist-info") {
        Some((MetadataFormat::DistInfo, base))
    } else {
        file_name
            .strip_suffix(".egg-info")
            .map(|base| (MetadataFormat::EggInfo, base))
    }
}

fn dir_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
}

/// Extract `Name` and `Version` from an RFC 822 style metadata header block.
fn parse_headers(content: &str) -> (Option<String>, Option<String>) {
    let mut name = None;
    let mut version = None;

    for line in content.lines() {
        if line.trim().is_empty() {
            break;
        }
        if line.starts_with([' ', '\t']) {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }

        if key.trim().eq_ignore_ascii_case("name") && name.is_none() {
            name = Some(value.to_string());
        } else if key.trim().eq_ignore_ascii_case("version") && version.is_none() {
            version = Some(value.to_string());
        }
    }

    (name, version)
}

/// First CSV field of a `RECORD` line. Blank lines yield `None`.
fn record_path(line: &str) -> std::result::Result<Option<String>, &'static str> {
    let line = line.trim_end_matches('\r');
    if line.trim().is_empty() {
        return Ok(None);
    }

    let Some(rest) = line.strip_prefix('"') else {
        let path = line.split(',').next().unwrap_or(line);
        return Ok(Some(path.to_string()));
    };

    let mut out = String::new();
    let mut chars = rest.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '"' {
            out.push(ch);
        } else if chars.peek() == Some(&'"') {
            chars.next();
            out.push('"');
        } else {
            return Ok(Some(out));
        }
    }

    Err("unterminated quoted path")
}

/// Join `path` onto `base` with `/` separators, folding `.` and `..`.
fn normalize_relative(base: Option<&str>, path: &str) -> String {
    let mut parts: Vec<&str> = base.into_iter().collect();

    for part in path.split(['/', '\\']) {
        match part {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|p| *p != "..") {
                    parts.pop();
                } else {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }

    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_parse_headers_stops_at_body() {
        let content = "Metadata-Version: 2.1\nName: espu-ext-wol\nVersion: 0.1.0\nSummary: Wake on LAN\n\nName: not-a-header\n";
        let (name, version) = parse_headers(content);
        assert_eq!(name.as_deref(), Some("espu-ext-wol"));
        assert_eq!(version.as_deref(), Some("0.1.0"));
    }

    #[test]
    fn test_parse_headers_without_name() {
        let (name, version) = parse_headers("Metadata-Version: 2.1\nVersion: 1.0\n");
        assert!(name.is_none());
        assert_eq!(version.as_deref(), Some("1.0"));
    }

    #[rstest]
    #[case("espu/core/__init__.py,sha256=abc,120", Some("espu/core/__init__.py"))]
    #[case("espu-0.1.0.dist-info/RECORD,,", Some("espu-0.1.0.dist-info/RECORD"))]
    #[case("\"espu/odd,name.py\",sha256=abc,1", Some("espu/odd,name.py"))]
    #[case("\"espu/say \"\"hi\"\".py\",,", Some("espu/say \"hi\".py"))]
    #[case("", None)]
    #[case("   \r", None)]
    fn test_record_path(#[case] line: &str, #[case] expected: Option<&str>) {
        assert_eq!(record_path(line).unwrap().as_deref(), expected);
    }

    #[test]
    fn test_record_path_unterminated_quote() {
        assert!(record_path("\"espu/core.py,sha256=abc").is_err());
    }

    #[rstest]
    #[case(None, "espu/core/__init__.py", "espu/core/__init__.py")]
    #[case(None, "espu\\lib\\vector\\v.py", "espu/lib/vector/v.py")]
    #[case(Some("legacy-1.0.egg-info"), "../espu/wol/wol.py", "espu/wol/wol.py")]
    #[case(Some("legacy-1.0.egg-info"), "PKG-INFO", "legacy-1.0.egg-info/PKG-INFO")]
    #[case(None, "../../bin/espu", "../../bin/espu")]
    fn test_normalize_relative(
        #[case] base: Option<&str>,
        #[case] path: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(normalize_relative(base, path), expected);
    }

    #[rstest]
    #[case("espu-0.1.0.dist-info", Some(MetadataFormat::DistInfo), "espu-0.1.0")]
    #[case("legacy-1.0-py3.12.egg-info", Some(MetadataFormat::EggInfo), "legacy-1.0-py3.12")]
    #[case("espu", None, "")]
    fn test_split_metadata_suffix(
        #[case] file_name: &str,
        #[case] format: Option<MetadataFormat>,
        #[case] base: &str,
    ) {
        match split_metadata_suffix(file_name) {
            Some((found, found_base)) => {
                assert_eq!(Some(found), format);
                assert_eq!(found_base, base);
            }
            None => assert!(format.is_none()),
        }
    }

    #[test]
    fn test_missing_search_path_is_inspection_error() {
        let scanner = DistInfoScanner::new(["/nonexistent/site-packages"]);
        let err = scanner.distributions().unwrap_err();
        assert!(err.is_environment_failure());
        assert!(scanner.resolve("espu").unwrap_err().is_environment_failure());
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_metadata_dir_is_inspection_error() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let site = tempfile::TempDir::new().unwrap();
        fs::create_dir(site.path().join(OsStr::from_bytes(b"espu_ext_\xff-0.1.0.dist-info")))
            .unwrap();

        let err = DistInfoScanner::new([site.path()])
            .distributions()
            .unwrap_err();
        assert!(err.is_environment_failure());
        assert!(err.to_string().contains("not valid UTF-8"));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_unrelated_entry_is_ignored() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let site = tempfile::TempDir::new().unwrap();
        fs::create_dir(site.path().join(OsStr::from_bytes(b"data_\xff"))).unwrap();

        let packages = DistInfoScanner::new([site.path()]).distributions().unwrap();
        assert!(packages.is_empty());
    }
}
