//! Mount table
//!
//! Binds URL prefixes to root directories and selects the most specific
//! mount for a request path.

use crate::config::{Config, MountSource};
use crate::error::{ConfigurationError, StartupError};
use crate::mount::PackageRegistry;
use std::path::{Path, PathBuf};

/// A URL prefix bound to a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mount {
    prefix: String,
    root: PathBuf,
    name: String,
}

impl Mount {
    /// Normalized prefix, empty for the catch-all mount
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Canonical root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_catch_all(&self) -> bool {
        self.prefix.is_empty()
    }

    /// Remainder of `path` after this mount's prefix, if the prefix applies
    ///
    /// Matching stops at segment boundaries: `/a` governs `/a` and `/a/x`
    /// but not `/ab`.
    fn strip<'p>(&self, path: &'p str) -> Option<&'p str> {
        let rest = path.strip_prefix(self.prefix.as_str())?;
        (self.prefix.is_empty() || rest.is_empty() || rest.starts_with('/')).then_some(rest)
    }
}

/// Ordered set of mounts, longest prefix first
#[derive(Debug, Clone, Default)]
pub struct MountTable {
    mounts: Vec<Mount>,
}

impl MountTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every configured mount, locating package roots via `registry`
    pub fn from_config(config: &Config, registry: &PackageRegistry) -> Result<Self, StartupError> {
        let mut table = Self::new();
        for mount in &config.mounts {
            let root = match &mount.source {
                MountSource::Package { package } => registry.resolve_package_root(package)?,
                MountSource::Dir { path } => PathBuf::from(path),
            };
            table.register(&mount.prefix, root, &mount.name)?;
        }
        Ok(table)
    }

    /// Add a mount
    ///
    /// The root must be an existing directory at registration time.
    pub fn register(
        &mut self,
        prefix: &str,
        root: impl AsRef<Path>,
        name: &str,
    ) -> Result<(), ConfigurationError> {
        let prefix = normalize_prefix(prefix)?;
        if self.mounts.iter().any(|m| m.prefix == prefix) {
            return Err(ConfigurationError::DuplicatePrefix { prefix });
        }

        let root = root.as_ref();
        if !root.exists() {
            return Err(ConfigurationError::MissingRoot {
                name: name.to_string(),
                root: root.to_path_buf(),
            });
        }
        if !root.is_dir() {
            return Err(ConfigurationError::NotADirectory {
                name: name.to_string(),
                root: root.to_path_buf(),
            });
        }
        let root = root
            .canonicalize()
            .map_err(|_| ConfigurationError::MissingRoot {
                name: name.to_string(),
                root: root.to_path_buf(),
            })?;

        let position = self
            .mounts
            .iter()
            .position(|m| m.prefix.len() < prefix.len())
            .unwrap_or(self.mounts.len());
        self.mounts.insert(
            position,
            Mount {
                prefix,
                root,
                name: name.to_string(),
            },
        );
        Ok(())
    }

    /// Longest-prefix match
    ///
    /// Returns the governing mount and the remainder of `path`, such that
    /// `mount.prefix() + remainder == path`.
    pub fn match_path<'p>(&self, path: &'p str) -> Option<(&Mount, &'p str)> {
        self.mounts
            .iter()
            .find_map(|mount| mount.strip(path).map(|rest| (mount, rest)))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mount> {
        self.mounts.iter()
    }

    pub fn len(&self) -> usize {
        self.mounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mounts.is_empty()
    }
}

fn normalize_prefix(prefix: &str) -> Result<String, ConfigurationError> {
    let invalid = |reason| ConfigurationError::InvalidPrefix {
        prefix: prefix.to_string(),
        reason,
    };

    let trimmed = prefix.strip_prefix('/').unwrap_or(prefix);
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    if trimmed.contains(['%', '\\', '?', '#']) {
        return Err(invalid("reserved character"));
    }
    for segment in trimmed.split('/') {
        match segment {
            "" => return Err(invalid("empty segment")),
            "." | ".." => return Err(invalid("dot segment")),
            _ => {}
        }
    }
    Ok(format!("/{trimmed}"))
}
