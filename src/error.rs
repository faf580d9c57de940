//! Startup and serve errors
//!
//! Request-level failures never surface here; they become HTTP responses.

use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid listen address '{address}': {source}")]
    InvalidAddress {
        address: String,
        source: std::net::AddrParseError,
    },

    #[error("invalid setting {key}: {reason}")]
    InvalidSetting { key: &'static str, reason: String },

    #[error("invalid value for response header {name}: '{value}'")]
    InvalidHeader { name: String, value: String },

    #[error("root directory '{}' is not usable: {source}", .path.display())]
    RootDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ServerError {
    /// True when the listen port is already taken by another socket.
    pub fn is_addr_in_use(&self) -> bool {
        matches!(
            self,
            Self::Bind { source, .. } if source.kind() == std::io::ErrorKind::AddrInUse
        )
    }
}
