//! Request handler module
//!
//! Static file serving wrapped by a header-augmentation step.

pub mod headers;
pub mod listing;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use headers::ResponseHeaders;
pub use router::handle_request;
