// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;
use std::collections::HashMap;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    pub browser: BrowserConfig,
    #[serde(default)]
    pub packages: PackagesConfig,
    #[serde(default = "default_mounts")]
    pub mounts: Vec<MountConfig>,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    /// Seconds an idle keep-alive connection stays open (0 disables keep-alive)
    pub keep_alive_timeout: u64,
    pub max_connections: Option<u64>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub enable_cors: bool,
    /// File served for a bare `/` request (no substitution when unset)
    #[serde(default)]
    pub root_index: Option<String>,
    /// Serve symlinks whose real path lies outside the mount root.
    /// Turning this on gives up the guarantee that every served file lives
    /// under its mount root.
    pub follow_symlinks: bool,
}

/// Browser launch configuration
#[derive(Debug, Deserialize, Clone)]
pub struct BrowserConfig {
    pub open: bool,
    pub entry_path: String,
}

/// Package location configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PackagesConfig {
    /// Directories searched for `<dir>/<package>`, in order
    #[serde(default = "default_search_paths")]
    pub search_paths: Vec<String>,
    /// Explicit package locations, checked before the search paths
    #[serde(default)]
    pub locations: HashMap<String, String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_search_paths() -> Vec<String> {
    vec![".".to_string()]
}

impl Default for PackagesConfig {
    fn default() -> Self {
        Self {
            search_paths: default_search_paths(),
            locations: HashMap::new(),
        }
    }
}

/// A single mount binding
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct MountConfig {
    /// URL prefix; empty or `/` for the catch-all mount
    pub prefix: String,
    /// Label used in diagnostics
    pub name: String,
    pub source: MountSource,
}

/// Where a mount's root directory comes from
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MountSource {
    /// Installed package, located through the package registry
    Package { package: String },
    /// Plain directory, relative to the working directory
    Dir { path: String },
}

impl MountConfig {
    pub fn dir(prefix: &str, name: &str, path: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            name: name.to_string(),
            source: MountSource::Dir {
                path: path.to_string(),
            },
        }
    }

    pub fn package(prefix: &str, name: &str, package: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            name: name.to_string(),
            source: MountSource::Package {
                package: package.to_string(),
            },
        }
    }
}

fn default_mounts() -> Vec<MountConfig> {
    vec![
        MountConfig::dir("/formchen", "formchen", "formchen"),
        MountConfig::package("/gridchen", "gridchen", "gridchen"),
        MountConfig::dir("", "static", "."),
    ]
}
