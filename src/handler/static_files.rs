//! Static file serving module
//!
//! Maps request paths onto the root directory and builds the file, directory
//! listing, redirect or not-found response. No CORS or cache headers are set
//! here.

use crate::handler::listing;
use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime, HttpResponse, ResponseBody};
use crate::logger;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use tokio::fs;

const FILE_NOT_FOUND: &str = "File not found";
const NO_LISTING_PERMISSION: &str = "No permission to list directory";

/// Request path mapped onto the filesystem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedPath {
    pub path: PathBuf,
    /// The request path ended in `/`
    pub trailing_slash: bool,
}

/// Translate a URL path into a filesystem path under `root`
///
/// Query string and fragment are dropped, the path is percent-decoded and
/// normalized: empty and `.` segments vanish, `..` removes the previous
/// segment and is ignored at the top. The result never leaves `root`
/// lexically; symlinks inside `root` are followed when the file is opened.
pub fn translate_path(root: &Path, request_path: &str) -> TranslatedPath {
    let raw = request_path.split(['?', '#']).next().unwrap_or_default();
    let trailing_slash = raw.trim_end().ends_with('/');

    let decoded_bytes = urlencoding::decode_binary(raw.as_bytes());
    let decoded = String::from_utf8_lossy(&decoded_bytes);

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s if is_foreign_segment(s) => {}
            s => segments.push(s),
        }
    }

    let mut path = root.to_path_buf();
    path.extend(segments);
    TranslatedPath {
        path,
        trailing_slash,
    }
}

/// Segments that would be interpreted as more than one path component
fn is_foreign_segment(segment: &str) -> bool {
    cfg!(windows) && (segment.contains('\\') || segment.contains(':'))
}

/// Serve the request from `root`
pub async fn serve(ctx: &RequestContext<'_>, root: &Path, index_files: &[String]) -> HttpResponse {
    let target = translate_path(root, ctx.path);

    match fs::metadata(&target.path).await {
        Ok(meta) if meta.is_dir() => serve_directory(ctx, &target.path, index_files).await,
        // a file cannot be addressed as a directory
        Ok(_) if target.trailing_slash => http::build_404_response(FILE_NOT_FOUND, ctx.is_head),
        Ok(meta) => serve_file(ctx, &target.path, &meta).await,
        Err(_) => http::build_404_response(FILE_NOT_FOUND, ctx.is_head),
    }
}

/// Serve a directory: redirect to the slash form, then index file, then listing
async fn serve_directory(
    ctx: &RequestContext<'_>,
    dir: &Path,
    index_files: &[String],
) -> HttpResponse {
    if !ctx.path.ends_with('/') {
        // a leading `//` would make the Location protocol-relative
        let path = ctx.path.trim_start_matches('/');
        let location = match ctx.query {
            Some(q) => format!("/{path}/?{q}"),
            None => format!("/{path}/"),
        };
        return http::build_redirect_response(&location);
    }

    for index_file in index_files {
        let index_path = dir.join(index_file);
        if let Ok(meta) = fs::metadata(&index_path).await {
            if meta.is_file() {
                return serve_file(ctx, &index_path, &meta).await;
            }
        }
    }

    match listing::read_entries(dir).await {
        Ok(entries) => {
            let decoded = urlencoding::decode_binary(ctx.path.as_bytes());
            let page = listing::render(&String::from_utf8_lossy(&decoded), &entries);
            http::build_html_response(page, ctx.is_head)
        }
        Err(e) => {
            logger::log_warning(&format!(
                "Failed to list directory '{}': {e}",
                dir.display()
            ));
            http::build_404_response(NO_LISTING_PERMISSION, ctx.is_head)
        }
    }
}

/// Serve a single regular file
async fn serve_file(ctx: &RequestContext<'_>, path: &Path, meta: &Metadata) -> HttpResponse {
    let modified = meta.modified().ok();
    let last_modified = modified.map(cache::http_date);

    if let (Some(time), Some(date)) = (modified, last_modified.as_deref()) {
        if cache::is_not_modified(ctx.if_modified_since, ctx.if_none_match, time) {
            return http::build_304_response(date);
        }
    }

    let body = if ctx.is_head {
        ResponseBody::empty()
    } else {
        match fs::File::open(path).await {
            Ok(file) => ResponseBody::file(file, meta.len()),
            Err(e) => {
                logger::log_warning(&format!("Failed to open file '{}': {e}", path.display()));
                return http::build_404_response(FILE_NOT_FOUND, ctx.is_head);
            }
        }
    };

    http::build_file_response(
        body,
        meta.len(),
        mime::for_path(path),
        last_modified.as_deref(),
        ctx.is_head,
    )
}
