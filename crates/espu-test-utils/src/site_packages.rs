//! [`SitePackages`] builder for installed-package metadata fixtures.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary `site-packages` directory populated with `dist-info` and
/// `egg-info` metadata.
///
/// # Example
///
/// ```rust,no_run
/// use espu_test_utils::SitePackages;
///
/// let site = SitePackages::new();
/// site.add_dist("espu", "0.1.0", &["espu/core/__init__.py"]);
/// site.add_dist("espu-ext-rogue", "9.9.9", &[]);
/// assert!(site.path().join("espu-0.1.0.dist-info/METADATA").is_file());
/// ```
pub struct SitePackages {
    temp_dir: TempDir,
}

impl Default for SitePackages {
    fn default() -> Self {
        Self::new()
    }
}

impl SitePackages {
    /// Create an empty `site-packages` directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("SitePackages::new: failed to create temp dir"),
        }
    }

    /// Root of the directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Install a wheel-style distribution.
    ///
    /// Writes `<name>-<version>.dist-info/` with `METADATA` and a `RECORD`
    /// listing `files` plus the metadata files themselves. The directory name
    /// escapes `-` to `_` the way installers do. The listed files are created
    /// empty.
    pub fn add_dist(&self, name: &str, version: &str, files: &[&str]) -> PathBuf {
        let dir_name = format!("{}-{}.dist-info", escape_name(name), version);
        let dist_dir = self.path().join(&dir_name);
        fs::create_dir_all(&dist_dir).expect("SitePackages::add_dist: failed to create dist-info");

        fs::write(
            dist_dir.join("METADATA"),
            format!("Metadata-Version: 2.1\nName: {name}\nVersion: {version}\n\nLong description.\n"),
        )
        .expect("SitePackages::add_dist: failed to write METADATA");

        let mut record = String::new();
        for file in files {
            self.touch(file);
            record.push_str(&format!("{file},sha256=00,0\n"));
        }
        record.push_str(&format!("{dir_name}/METADATA,,\n{dir_name}/RECORD,,\n"));
        fs::write(dist_dir.join("RECORD"), record)
            .expect("SitePackages::add_dist: failed to write RECORD");

        dist_dir
    }

    /// Install a legacy egg-style distribution with `PKG-INFO` and
    /// `installed-files.txt` (paths relative to the egg-info directory).
    pub fn add_egg(&self, name: &str, version: &str, files: &[&str]) -> PathBuf {
        let egg_dir = self
            .path()
            .join(format!("{}-{}-py3.12.egg-info", escape_name(name), version));
        fs::create_dir_all(&egg_dir).expect("SitePackages::add_egg: failed to create egg-info");

        fs::write(
            egg_dir.join("PKG-INFO"),
            format!("Metadata-Version: 1.1\nName: {name}\nVersion: {version}\n"),
        )
        .expect("SitePackages::add_egg: failed to write PKG-INFO");

        let mut listing = String::new();
        for file in files {
            self.touch(file);
            listing.push_str(&format!("../{file}\n"));
        }
        listing.push_str("PKG-INFO\n");
        fs::write(egg_dir.join("installed-files.txt"), listing)
            .expect("SitePackages::add_egg: failed to write installed-files.txt");

        egg_dir
    }

    /// Write a `dist-info` directory with arbitrary `METADATA` and `RECORD`
    /// content, for corrupt-metadata scenarios. `None` omits the file.
    pub fn add_raw_dist_info(
        &self,
        dir_name: &str,
        metadata: Option<&str>,
        record: Option<&str>,
    ) -> PathBuf {
        let dist_dir = self.path().join(dir_name);
        fs::create_dir_all(&dist_dir)
            .expect("SitePackages::add_raw_dist_info: failed to create dist-info");
        if let Some(metadata) = metadata {
            fs::write(dist_dir.join("METADATA"), metadata)
                .expect("SitePackages::add_raw_dist_info: failed to write METADATA");
        }
        if let Some(record) = record {
            fs::write(dist_dir.join("RECORD"), record)
                .expect("SitePackages::add_raw_dist_info: failed to write RECORD");
        }
        dist_dir
    }

    /// Remove a distribution installed with [`add_dist`](Self::add_dist).
    pub fn remove_dist(&self, name: &str, version: &str) {
        let dist_dir = self
            .path()
            .join(format!("{}-{}.dist-info", escape_name(name), version));
        fs::remove_dir_all(dist_dir).expect("SitePackages::remove_dist: failed to remove");
    }

    fn touch(&self, relative: &str) {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("SitePackages: failed to create package dir");
        }
        fs::write(&path, "").expect("SitePackages: failed to write package file");
    }
}

/// Distribution names in metadata directory names use `_` for `-`.
fn escape_name(name: &str) -> String {
    name.replace(['-', '.'], "_")
}
