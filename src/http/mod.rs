//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from the file
//! serving logic: response bodies and builders, MIME lookup and date validators.

pub mod body;
pub mod cache;
pub mod mime;
pub mod response;

// Re-export commonly used types
pub use body::ResponseBody;
pub use response::{
    build_304_response, build_404_response, build_501_response, build_error_response,
    build_file_response, build_html_response, build_redirect_response, HttpResponse,
};
