//! HTTP validators module
//!
//! `Last-Modified` generation and `If-Modified-Since` handling. Responses are
//! never cacheable, but clients that revalidate still get a 304 when the
//! file is unchanged.

use chrono::{DateTime, Utc};
use std::time::SystemTime;

const HTTP_DATE: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Format a timestamp as an IMF-fixdate, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`
pub fn http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).format(HTTP_DATE).to_string()
}

/// Parse an HTTP date header value
///
/// Returns `None` for anything that is not a valid RFC 2822 style date.
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Check whether a conditional GET can be answered with 304
///
/// `If-None-Match` takes precedence: when present, `If-Modified-Since` is
/// ignored and the full response is sent. Sub-second precision of the file
/// time is dropped before comparing.
pub fn is_not_modified(
    if_modified_since: Option<&str>,
    if_none_match: Option<&str>,
    modified: SystemTime,
) -> bool {
    if if_none_match.is_some() {
        return false;
    }
    let Some(since) = if_modified_since.and_then(parse_http_date) else {
        return false;
    };
    let modified = DateTime::<Utc>::from(modified).timestamp();
    modified <= since.timestamp()
}
