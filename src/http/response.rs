//! HTTP response building module
//!
//! Provides builders for the responses the file server produces, decoupled from
//! request handling. None of these set CORS or caching headers; those are
//! applied afterwards to every response by the handler.

use super::body::ResponseBody;
use hyper::body::Bytes;
use hyper::header::{CONTENT_LENGTH, CONTENT_TYPE, LAST_MODIFIED, LOCATION};
use hyper::{Response, StatusCode};

pub type HttpResponse = Response<ResponseBody>;

const ERROR_CONTENT_TYPE: &str = "text/html;charset=utf-8";

/// Build 200 response carrying a file's content
///
/// `content_length` is sent as-is; for HEAD the body is dropped.
pub fn build_file_response(
    body: ResponseBody,
    content_length: u64,
    content_type: &str,
    last_modified: Option<&str>,
    is_head: bool,
) -> HttpResponse {
    let body = if is_head { ResponseBody::empty() } else { body };

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .header(CONTENT_LENGTH, content_length);
    if let Some(date) = last_modified {
        builder = builder.header(LAST_MODIFIED, date);
    }

    builder.body(body).unwrap_or_else(|e| {
        log_build_error("200", &e);
        Response::new(ResponseBody::empty())
    })
}

/// Build generic HTML response (directory listings)
pub fn build_html_response(content: String, is_head: bool) -> HttpResponse {
    let content_length = content.len();
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from(content)
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "text/html; charset=utf-8")
        .header(CONTENT_LENGTH, content_length)
        .body(ResponseBody::full(body))
        .unwrap_or_else(|e| {
            log_build_error("HTML", &e);
            Response::new(ResponseBody::empty())
        })
}

/// Build 304 Not Modified response
pub fn build_304_response(last_modified: &str) -> HttpResponse {
    Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header(LAST_MODIFIED, last_modified)
        .body(ResponseBody::empty())
        .unwrap_or_else(|e| {
            log_build_error("304", &e);
            Response::new(ResponseBody::empty())
        })
}

/// Build 301 redirect response (directory without trailing slash)
pub fn build_redirect_response(location: &str) -> HttpResponse {
    Response::builder()
        .status(StatusCode::MOVED_PERMANENTLY)
        .header(LOCATION, location)
        .header(CONTENT_LENGTH, 0)
        .body(ResponseBody::empty())
        .unwrap_or_else(|e| {
            log_build_error("301", &e);
            Response::new(ResponseBody::empty())
        })
}

/// Build 404 Not Found response
pub fn build_404_response(message: &str, is_head: bool) -> HttpResponse {
    build_error_response(StatusCode::NOT_FOUND, Some(message), is_head)
}

/// Build 501 response for anything other than GET and HEAD
pub fn build_501_response(method: &str, is_head: bool) -> HttpResponse {
    build_error_response(
        StatusCode::NOT_IMPLEMENTED,
        Some(&format!("Unsupported method ('{method}')")),
        is_head,
    )
}

/// Build an HTML error page
///
/// `message` defaults to the canonical reason phrase. HEAD responses keep the
/// headers but carry no body.
pub fn build_error_response(status: StatusCode, message: Option<&str>, is_head: bool) -> HttpResponse {
    let reason = status.canonical_reason().unwrap_or("Unknown");
    let message = message.unwrap_or(reason);
    let page = error_page(status.as_u16(), message, explain(status));
    let content_length = page.len();
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from(page)
    };

    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, ERROR_CONTENT_TYPE)
        .header(CONTENT_LENGTH, content_length)
        .body(ResponseBody::full(body))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            let mut fallback = Response::new(ResponseBody::empty());
            *fallback.status_mut() = status;
            fallback
        })
}

fn error_page(code: u16, message: &str, explanation: &str) -> String {
    format!(
        "<!DOCTYPE HTML>\n\
         <html lang=\"en\">\n\
         \x20   <head>\n\
         \x20       <meta charset=\"utf-8\">\n\
         \x20       <title>Error response</title>\n\
         \x20   </head>\n\
         \x20   <body>\n\
         \x20       <h1>Error response</h1>\n\
         \x20       <p>Error code: {code}</p>\n\
         \x20       <p>Message: {}.</p>\n\
         \x20       <p>Error code explanation: {code} - {explanation}.</p>\n\
         \x20   </body>\n\
         </html>\n",
        escape_html(message),
    )
}

/// Long-form explanation shown on error pages
fn explain(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "Bad request syntax or unsupported method",
        StatusCode::FORBIDDEN => "Request forbidden -- authorization will not help",
        StatusCode::NOT_FOUND => "Nothing matches the given URI",
        StatusCode::METHOD_NOT_ALLOWED => "Specified method is invalid for this resource",
        StatusCode::INTERNAL_SERVER_ERROR => "Server got itself in trouble",
        StatusCode::NOT_IMPLEMENTED => "Server does not support this operation",
        _ => "No further information",
    }
}

/// Escape text for inclusion in HTML element content and attributes
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
