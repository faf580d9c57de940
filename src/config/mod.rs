// Configuration module entry point
// Loads configuration and resolves the served root directory

mod state;
mod types;

use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::error::ServerError;

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, HeadersConfig, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig,
};

/// Default config file looked up in the working directory (extension optional)
pub const DEFAULT_CONFIG_PATH: &str = "config";

/// Prefix for environment overrides, e.g. `CORS_SERVER__PORT=8080`
pub const ENV_PREFIX: &str = "CORS";

impl Config {
    /// Load configuration from the default `config.toml`, if present
    pub fn load() -> Result<Self, ServerError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from specified file path (without extension)
    /// Missing file is not an error; every key has a default.
    pub fn load_from(config_path: &str) -> Result<Self, ServerError> {
        let defaults = Self::default();
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", 12001)?
            .set_default("logging.level", defaults.logging.level)?
            .set_default("logging.access_log", defaults.logging.access_log)?
            .set_default("logging.access_log_format", defaults.logging.access_log_format)?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.header_read_timeout", 30)?
            .set_default("http.index_files", defaults.http.index_files)?
            .set_default("http.server_name", defaults.http.server_name)?
            .set_default("headers.allow_origin", defaults.headers.allow_origin)?
            .set_default("headers.allow_methods", defaults.headers.allow_methods)?
            .set_default("headers.allow_headers", defaults.headers.allow_headers)?
            .set_default("headers.cache_control", defaults.headers.cache_control)?
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would only fail later, at runtime setup
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.server.workers == Some(0) {
            return Err(ServerError::InvalidSetting {
                key: "server.workers",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, ServerError> {
        let address = format!("{}:{}", self.server.host, self.server.port);
        address
            .parse()
            .map_err(|source| ServerError::InvalidAddress { address, source })
    }

    /// Resolve the directory served as `/`
    ///
    /// Uses `server.root` when set, otherwise the directory holding the
    /// running executable. The result is canonical and must be a directory.
    pub fn root_dir(&self) -> Result<PathBuf, ServerError> {
        let path = match &self.server.root {
            Some(root) => PathBuf::from(root),
            None => executable_dir()?,
        };

        let canonical = match path.canonicalize() {
            Ok(p) => p,
            Err(source) => return Err(ServerError::RootDirectory { path, source }),
        };

        if !canonical.is_dir() {
            return Err(ServerError::RootDirectory {
                path,
                source: io::Error::other("not a directory"),
            });
        }

        Ok(canonical)
    }
}

fn executable_dir() -> io::Result<PathBuf> {
    let exe = std::env::current_exe()?;
    exe.parent().map(Path::to_path_buf).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            "executable path has no parent directory",
        )
    })
}
