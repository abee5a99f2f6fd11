//! Browser launcher
//!
//! Opens the entry page once the listener is bound. Purely a convenience:
//! failures are logged and never affect serving.

use crate::logger;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

/// URL of the entry page for a server bound to `addr`
///
/// A wildcard bind address is replaced by the loopback address of the same
/// family, since browsers cannot connect to `0.0.0.0`.
pub fn entry_url(addr: SocketAddr, entry_path: &str) -> String {
    let ip = match addr.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
        IpAddr::V6(ip) if ip.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
        ip => ip,
    };
    let host = SocketAddr::new(ip, addr.port());
    format!("http://{host}/{}", entry_path.trim_start_matches('/'))
}

/// Open `url` in the default browser on a blocking thread
pub fn launch(url: String) {
    tokio::task::spawn_blocking(move || {
        logger::log_info(&format!("Opening {url}"));
        if let Err(e) = webbrowser::open(&url) {
            logger::log_warning(&format!("Could not open browser for {url}: {e}"));
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_url_loopback() {
        let addr: SocketAddr = "127.0.0.1:8000".parse().unwrap();
        assert_eq!(entry_url(addr, "/index.html"), "http://127.0.0.1:8000/index.html");
        assert_eq!(entry_url(addr, "index.html"), "http://127.0.0.1:8000/index.html");
    }

    #[test]
    fn test_entry_url_wildcard() {
        let v4: SocketAddr = "0.0.0.0:9000".parse().unwrap();
        assert_eq!(entry_url(v4, "/index.html"), "http://127.0.0.1:9000/index.html");
        let v6: SocketAddr = "[::]:9000".parse().unwrap();
        assert_eq!(entry_url(v6, "/"), "http://[::1]:9000/");
    }
}
