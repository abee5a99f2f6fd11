// Configuration module entry point
// Loads layered configuration and holds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{
    BrowserConfig, Config, HttpConfig, LoggingConfig, MountConfig, MountSource, PackagesConfig,
    PerformanceConfig, ServerConfig,
};

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// Environment variables override the file, e.g. `GRIDCHEN_SERVER__PORT=9000`.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("GRIDCHEN")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("http.server_name", "gridchen-dev-server")?
            .set_default("http.enable_cors", false)?
            .set_default("http.follow_symlinks", false)?
            .set_default("browser.open", true)?
            .set_default("browser.entry_path", "/index.html")?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_from("/nonexistent/gridchen-config").unwrap();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 8000);
        assert!(cfg.browser.open);
        assert_eq!(cfg.browser.entry_path, "/index.html");
        assert_eq!(cfg.http.root_index, None);
        assert!(!cfg.http.follow_symlinks);
        assert_eq!(cfg.packages.search_paths, vec![".".to_string()]);

        let prefixes: Vec<&str> = cfg.mounts.iter().map(|m| m.prefix.as_str()).collect();
        assert_eq!(prefixes, vec!["/formchen", "/gridchen", ""]);
        assert_eq!(
            cfg.mounts[1].source,
            MountSource::Package {
                package: "gridchen".to_string()
            }
        );
    }

    #[test]
    fn test_load_mounts_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devserver.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9100

[packages]
search_paths = ["vendor"]
locations = {{ gridchen = "/opt/gridchen" }}

[[mounts]]
prefix = "/widget"
name = "widget"
source = {{ type = "package", package = "gridchen" }}

[[mounts]]
prefix = ""
name = "root"
source = {{ type = "dir", path = "." }}
"#
        )
        .unwrap();

        let base = path.with_extension("");
        let cfg = Config::load_from(base.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 9100);
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.packages.search_paths, vec!["vendor".to_string()]);
        assert_eq!(
            cfg.packages.locations.get("gridchen").map(String::as_str),
            Some("/opt/gridchen")
        );
        assert_eq!(
            cfg.mounts,
            vec![
                MountConfig::package("/widget", "widget", "gridchen"),
                MountConfig::dir("", "root", "."),
            ]
        );
    }

    #[test]
    fn test_socket_addr() {
        let mut cfg = Config::load_from("/nonexistent/gridchen-config").unwrap();
        assert_eq!(cfg.get_socket_addr().unwrap().port(), 8000);
        cfg.server.host = "not a host".to_string();
        assert!(cfg.get_socket_addr().is_err());
    }
}
