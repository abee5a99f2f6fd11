//! Static file serving module
//!
//! Resolves a request against its mount, reads the file and builds the
//! response.

use crate::error::ResolveError;
use crate::handler::router::RequestContext;
use crate::http::{self, mime};
use crate::logger;
use crate::mount::Mount;
use crate::resolve::{self, ResolveOptions, ResolvedResource};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use tokio::fs;

/// Serve `remainder` from `mount`
pub async fn serve_from_mount(
    ctx: &RequestContext<'_>,
    mount: &Mount,
    remainder: &str,
    options: ResolveOptions,
) -> Response<Full<Bytes>> {
    match resolve::resolve(mount, remainder, options) {
        Ok(resource) => serve_resource(ctx, &resource).await,
        Err(ResolveError::Forbidden) => {
            // The filesystem path stays out of the log
            logger::log_warning(&format!(
                "Forbidden path rejected on mount '{}': {}",
                mount.name(),
                ctx.path
            ));
            failure_response(ResolveError::Forbidden, ctx.is_head)
        }
        Err(err) => failure_response(err, ctx.is_head),
    }
}

async fn serve_resource(
    ctx: &RequestContext<'_>,
    resource: &ResolvedResource,
) -> Response<Full<Bytes>> {
    let content_type = mime::get_content_type(resource.extension());

    // HEAD only needs the size, which resolution already produced
    if ctx.is_head {
        let mut response =
            http::build_file_response(Bytes::new(), content_type, ctx.server_name, true);
        response.headers_mut().insert(
            hyper::header::CONTENT_LENGTH,
            hyper::header::HeaderValue::from(resource.size),
        );
        return response;
    }

    match fs::read(&resource.path).await {
        Ok(content) => {
            http::build_file_response(Bytes::from(content), content_type, ctx.server_name, false)
        }
        Err(e) => {
            logger::log_error(&format!("Failed to read file for '{}': {e}", ctx.path));
            http::build_status_response(StatusCode::INTERNAL_SERVER_ERROR, false)
        }
    }
}

/// Map a resolution failure to its response
pub fn failure_response(err: ResolveError, is_head: bool) -> Response<Full<Bytes>> {
    let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::NOT_FOUND);
    http::build_status_response(status, is_head)
}
