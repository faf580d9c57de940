//! Request dispatch module
//!
//! Entry point for HTTP request processing: method check, static file
//! serving, then header augmentation and access logging.

use crate::config::AppState;
use crate::handler::static_files;
use crate::http::{self, HttpResponse};
use crate::logger::{self, AccessLogEntry};
use hyper::body::Body as _;
use hyper::header::{
    HeaderName, IF_MODIFIED_SINCE, IF_NONE_MATCH, ORIGIN, REFERER, USER_AGENT,
};
use hyper::http::request::Parts;
use hyper::{HeaderMap, Method, Request, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
#[derive(Debug)]
pub struct RequestContext<'a> {
    /// Raw (still percent-encoded) request path
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub is_head: bool,
    pub if_modified_since: Option<&'a str>,
    pub if_none_match: Option<&'a str>,
}

impl<'a> RequestContext<'a> {
    fn from_parts(parts: &'a Parts) -> Self {
        Self {
            path: parts.uri.path(),
            query: parts.uri.query(),
            is_head: parts.method == Method::HEAD,
            if_modified_since: header_str(&parts.headers, &IF_MODIFIED_SINCE),
            if_none_match: header_str(&parts.headers, &IF_NONE_MATCH),
        }
    }
}

/// Main entry point for HTTP request handling
///
/// Every response leaves through here, so every response, including
/// errors, carries the configured CORS and cache headers.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<HttpResponse, Infallible> {
    let started = Instant::now();
    let (parts, _) = req.into_parts();

    let mut response = respond(&parts, &state).await;
    state.headers.apply(&mut response);

    if state.access_log_enabled() {
        log_access(&parts, &response, peer_addr, started, &state);
    }

    Ok(response)
}

/// Produce the bare response, before header augmentation
async fn respond(parts: &Parts, state: &AppState) -> HttpResponse {
    let ctx = RequestContext::from_parts(parts);

    if parts.method != Method::GET && !ctx.is_head {
        logger::log_debug(&format!("Unsupported method: {}", parts.method));
        return http::build_501_response(parts.method.as_str(), false);
    }

    static_files::serve(&ctx, state.root(), &state.config.http.index_files).await
}

fn log_access(
    parts: &Parts,
    response: &HttpResponse,
    peer_addr: SocketAddr,
    started: Instant,
    state: &AppState,
) {
    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        parts.method.to_string(),
        parts.uri.path().to_string(),
    );
    entry.query = parts.uri.query().map(ToString::to_string);
    entry.http_version = version_str(parts.version).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .body()
        .size_hint()
        .exact()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0);
    entry.referer = header_str(&parts.headers, &REFERER).map(ToString::to_string);
    entry.user_agent = header_str(&parts.headers, &USER_AGENT).map(ToString::to_string);
    entry.origin = header_str(&parts.headers, &ORIGIN).map(ToString::to_string);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    logger::log_access(&entry, &state.config.logging.access_log_format);
}

fn header_str<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn version_str(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
