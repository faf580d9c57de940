// Application state module
// Immutable per-process state shared by every connection

use hyper::header::SERVER;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use super::types::Config;
use crate::error::ServerError;
use crate::handler::ResponseHeaders;

/// Application state
#[derive(Debug)]
pub struct AppState {
    pub config: Config,
    /// Canonical directory served as `/`
    root: PathBuf,
    /// Headers applied to every response
    pub headers: ResponseHeaders,

    // Cached config values for fast access without locks
    pub cached_access_log: AtomicBool,
}

impl AppState {
    /// Build state from a loaded config and an already resolved root directory
    pub fn new(config: &Config, root: PathBuf) -> Result<Self, ServerError> {
        Ok(Self {
            headers: ResponseHeaders::from_config(&config.headers)?
                .with_header(SERVER, &config.http.server_name)?,
            cached_access_log: AtomicBool::new(config.logging.access_log),
            config: config.clone(),
            root,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn access_log_enabled(&self) -> bool {
        self.cached_access_log.load(Ordering::Relaxed)
    }
}
