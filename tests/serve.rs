use gridchen_dev_server::config::{AppState, Config};
use gridchen_dev_server::handler::handle_request;
use gridchen_dev_server::mount::MountTable;
use http_body_util::BodyExt;
use hyper::{Method, Request, StatusCode};
use std::fs;
use std::net::SocketAddr;
use std::sync::Arc;

struct Fixture {
    _dir: tempfile::TempDir,
    state: Arc<AppState>,
}

/// `/widget` -> D1 with x.js, catch-all -> W with index.html
fn fixture(root_index: Option<&str>) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let widget = dir.path().join("w/widget-pkg");
    let work = dir.path().join("w");
    fs::create_dir_all(widget.join("lib")).unwrap();
    fs::write(widget.join("x.js"), b"export default 42;").unwrap();
    fs::write(work.join("index.html"), b"<html>grid</html>").unwrap();
    fs::write(dir.path().join("outside.txt"), b"outside").unwrap();

    let mut table = MountTable::new();
    table.register("/widget", &widget, "widget").unwrap();
    table.register("", &work, "static").unwrap();

    let mut config = Config::load_from("/nonexistent/gridchen-config").unwrap();
    config.logging.access_log = false;
    config.http.root_index = root_index.map(ToString::to_string);

    Fixture {
        _dir: dir,
        state: Arc::new(AppState::new(config, table)),
    }
}

async fn request(
    state: &Arc<AppState>,
    method: Method,
    uri: &str,
) -> (StatusCode, hyper::HeaderMap, Vec<u8>) {
    let req = Request::builder().method(method).uri(uri).body(()).unwrap();
    let peer: SocketAddr = "127.0.0.1:40000".parse().unwrap();
    let response = handle_request(req, Arc::clone(state), peer).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, body.to_vec())
}

async fn get(state: &Arc<AppState>, uri: &str) -> (StatusCode, Vec<u8>) {
    let (status, _, body) = request(state, Method::GET, uri).await;
    (status, body)
}

#[tokio::test]
async fn serves_file_from_prefixed_mount() {
    let fx = fixture(None);
    let (status, headers, body) = request(&fx.state, Method::GET, "/widget/x.js").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"export default 42;");
    assert_eq!(headers["Content-Type"], "text/javascript; charset=utf-8");
    assert_eq!(headers["Content-Length"], "18");
}

#[tokio::test]
async fn serves_file_from_catch_all() {
    let fx = fixture(None);
    let (status, headers, body) = request(&fx.state, Method::GET, "/index.html").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"<html>grid</html>");
    assert_eq!(headers["Content-Type"], "text/html; charset=utf-8");
}

#[tokio::test]
async fn traversal_is_forbidden() {
    let fx = fixture(None);
    for uri in [
        "/widget/../../etc/passwd",
        "/widget/%2e%2e/%2e%2e/outside.txt",
        "/widget/..%2f..%2foutside.txt",
        "/widget/lib/..%5c..%5c..%5coutside.txt",
        "/../outside.txt",
    ] {
        let (status, body) = get(&fx.state, uri).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "uri {uri}");
        assert_eq!(body, b"403 Forbidden");
    }
}

#[tokio::test]
async fn missing_file_is_not_found() {
    let fx = fixture(None);
    let (status, _) = get(&fx.state, "/widget/missing.js").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn directory_is_not_listed() {
    let fx = fixture(None);
    for uri in ["/widget/", "/widget", "/widget/lib", "/"] {
        let (status, body) = get(&fx.state, uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "uri {uri}");
        assert_eq!(body, b"404 Not Found");
    }
}

#[tokio::test]
async fn catch_all_reaches_nested_package_by_directory_name() {
    let fx = fixture(None);
    // widget-pkg lives inside W, so the catch-all also reaches it by its own name
    let (status, body) = get(&fx.state, "/widget-pkg/x.js").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"export default 42;");
}

#[tokio::test]
async fn root_index_rewrites_bare_slash() {
    let fx = fixture(Some("index.html"));
    let (status, body) = get(&fx.state, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"<html>grid</html>");

    // Only the bare root is rewritten
    let (status, _) = get(&fx.state, "/widget/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn head_reports_length_without_body() {
    let fx = fixture(None);
    let (status, headers, body) = request(&fx.state, Method::HEAD, "/widget/x.js").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["Content-Length"], "18");
    assert!(body.is_empty());
}

#[tokio::test]
async fn other_methods_are_rejected() {
    let fx = fixture(None);
    let (status, headers, _) = request(&fx.state, Method::POST, "/widget/x.js").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(headers["Allow"], "GET, HEAD, OPTIONS");

    let (status, _, _) = request(&fx.state, Method::OPTIONS, "/widget/x.js").await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn no_mount_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let mut table = MountTable::new();
    table.register("/widget", dir.path(), "widget").unwrap();
    let mut config = Config::load_from("/nonexistent/gridchen-config").unwrap();
    config.logging.access_log = false;
    let state = Arc::new(AppState::new(config, table));

    let (status, _) = get(&state, "/index.html").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn repeated_requests_agree() {
    let fx = fixture(None);
    for uri in ["/widget/x.js", "/widget/missing.js", "/widget/../../etc/passwd"] {
        let first = get(&fx.state, uri).await;
        let second = get(&fx.state, uri).await;
        assert_eq!(first, second, "uri {uri}");
    }
}
