//! Package root lookup
//!
//! Maps a logical package name to the directory holding its files, so mount
//! roots never have to be hard-coded.

use crate::config::PackagesConfig;
use crate::error::PackageNotFoundError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Explicit package locations plus an ordered search path
#[derive(Debug, Clone, Default)]
pub struct PackageRegistry {
    locations: HashMap<String, PathBuf>,
    search_paths: Vec<PathBuf>,
}

impl PackageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &PackagesConfig) -> Self {
        Self {
            locations: config
                .locations
                .iter()
                .map(|(name, dir)| (name.clone(), PathBuf::from(dir)))
                .collect(),
            search_paths: config.search_paths.iter().map(PathBuf::from).collect(),
        }
    }

    #[must_use]
    pub fn with_location(mut self, name: &str, dir: impl Into<PathBuf>) -> Self {
        self.locations.insert(name.to_string(), dir.into());
        self
    }

    #[must_use]
    pub fn with_search_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_paths.push(dir.into());
        self
    }

    /// Locate the root directory of `name`
    ///
    /// An explicit location wins over the search path. The returned path is
    /// absolute and canonical.
    pub fn resolve_package_root(&self, name: &str) -> Result<PathBuf, PackageNotFoundError> {
        if is_valid_package_name(name) {
            if let Some(dir) = self.locations.get(name) {
                if let Some(root) = existing_dir(dir) {
                    return Ok(root);
                }
            } else if let Some(root) = self
                .search_paths
                .iter()
                .find_map(|base| existing_dir(&base.join(name)))
            {
                return Ok(root);
            }
        }

        Err(PackageNotFoundError {
            name: name.to_string(),
            searched: self.describe_search(name),
        })
    }

    fn describe_search(&self, name: &str) -> String {
        let candidates: Vec<String> = match self.locations.get(name) {
            Some(dir) => vec![dir.display().to_string()],
            None => self
                .search_paths
                .iter()
                .map(|base| base.join(name).display().to_string())
                .collect(),
        };
        if candidates.is_empty() {
            "nothing".to_string()
        } else {
            candidates.join(", ")
        }
    }
}

fn is_valid_package_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

fn existing_dir(path: &Path) -> Option<PathBuf> {
    path.is_dir().then(|| path.canonicalize().ok()).flatten()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_search_path_lookup() {
        let site = tempfile::tempdir().unwrap();
        fs::create_dir(site.path().join("gridchen")).unwrap();

        let registry = PackageRegistry::new().with_search_path(site.path());
        let root = registry.resolve_package_root("gridchen").unwrap();
        assert!(root.is_absolute());
        assert_eq!(root, site.path().join("gridchen").canonicalize().unwrap());
    }

    #[test]
    fn test_first_search_path_wins() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        fs::create_dir(first.path().join("pkg")).unwrap();
        fs::create_dir(second.path().join("pkg")).unwrap();

        let registry = PackageRegistry::new()
            .with_search_path(first.path())
            .with_search_path(second.path());
        let root = registry.resolve_package_root("pkg").unwrap();
        assert_eq!(root, first.path().join("pkg").canonicalize().unwrap());
    }

    #[test]
    fn test_explicit_location_wins() {
        let site = tempfile::tempdir().unwrap();
        let vendored = tempfile::tempdir().unwrap();
        fs::create_dir(site.path().join("gridchen")).unwrap();

        let registry = PackageRegistry::new()
            .with_search_path(site.path())
            .with_location("gridchen", vendored.path());
        let root = registry.resolve_package_root("gridchen").unwrap();
        assert_eq!(root, vendored.path().canonicalize().unwrap());
    }

    #[test]
    fn test_missing_package() {
        let site = tempfile::tempdir().unwrap();
        let registry = PackageRegistry::new().with_search_path(site.path());
        let err = registry.resolve_package_root("gridchen").unwrap_err();
        assert_eq!(err.name, "gridchen");
        assert!(err.searched.contains("gridchen"));
    }

    #[test]
    fn test_plain_file_is_not_a_package() {
        let site = tempfile::tempdir().unwrap();
        fs::write(site.path().join("gridchen"), b"not a dir").unwrap();
        let registry = PackageRegistry::new().with_search_path(site.path());
        assert!(registry.resolve_package_root("gridchen").is_err());
    }

    #[test]
    fn test_rejects_path_like_names() {
        let site = tempfile::tempdir().unwrap();
        fs::create_dir_all(site.path().join("a/b")).unwrap();
        let registry = PackageRegistry::new().with_search_path(site.path().join("a"));
        assert!(registry.resolve_package_root("..").is_err());
        assert!(registry.resolve_package_root("../a").is_err());
        assert!(registry.resolve_package_root("").is_err());
        assert!(registry.resolve_package_root("b").is_ok());
    }
}
