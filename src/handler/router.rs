//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, mount
//! matching and dispatch to static file serving.

use crate::config::AppState;
use crate::handler::static_files;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response};
use std::borrow::Cow;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub is_head: bool,
    pub server_name: &'a str,
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let method = req.method();
    let uri = req.uri();

    let path = match &state.config.http.root_index {
        Some(index) if uri.path() == "/" => {
            Cow::Owned(format!("/{}", index.trim_start_matches('/')))
        }
        _ => Cow::Borrowed(uri.path()),
    };

    let (response, mount_name) = match check_http_method(method, state.config.http.enable_cors) {
        Some(resp) => (resp, None),
        None => route_request(&path, *method == Method::HEAD, &state).await,
    };

    if state.access_log() {
        let mut entry = AccessLogEntry::new(peer, method.as_str(), uri.path());
        entry.query = uri.query().map(ToString::to_string);
        entry.http_version = format_version(req.version()).to_string();
        entry.status = response.status().as_u16();
        entry.body_bytes = usize::try_from(response.body().size_hint().exact().unwrap_or(0))
            .unwrap_or(usize::MAX);
        entry.mount = mount_name;
        entry.user_agent = req
            .headers()
            .get("user-agent")
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method, enable_cors: bool) -> Option<Response<Full<Bytes>>> {
    match method {
        &Method::GET | &Method::HEAD => None,
        &Method::OPTIONS => Some(http::build_options_response(enable_cors)),
        _ => {
            logger::log_debug(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Route request to the governing mount
async fn route_request(
    path: &str,
    is_head: bool,
    state: &AppState,
) -> (Response<Full<Bytes>>, Option<String>) {
    let Some((mount, remainder)) = state.mounts.match_path(path) else {
        return (http::build_404_response(is_head), None);
    };

    let ctx = RequestContext {
        path,
        is_head,
        server_name: &state.config.http.server_name,
    };
    let response =
        static_files::serve_from_mount(&ctx, mount, remainder, state.resolve_options).await;
    (response, Some(mount.name().to_string()))
}

const fn format_version(version: hyper::Version) -> &'static str {
    match version {
        hyper::Version::HTTP_09 => "0.9",
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        hyper::Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
