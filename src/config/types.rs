// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    pub headers: HeadersConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory served as `/`. Defaults to the directory of the executable.
    #[serde(default)]
    pub root: Option<String>,
    pub workers: Option<usize>,
    /// Externally reachable URL printed at startup (tunnels, ingress)
    #[serde(default)]
    pub public_url: Option<String>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PerformanceConfig {
    /// Serve more than one request per connection
    pub keep_alive: bool,
    /// Seconds allowed to receive a request head, including the idle wait
    /// for the next request on a kept-alive connection. 0 disables it.
    /// Sending the response is never time-limited.
    pub header_read_timeout: u64,
    pub max_connections: Option<u64>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    pub index_files: Vec<String>,
    pub server_name: String,
}

/// Headers set on every response, whatever its status
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct HeadersConfig {
    pub allow_origin: String,
    pub allow_methods: String,
    pub allow_headers: String,
    pub cache_control: String,
}

impl Default for HeadersConfig {
    fn default() -> Self {
        Self {
            allow_origin: "*".to_string(),
            allow_methods: "GET".to_string(),
            allow_headers: "Content-Type".to_string(),
            cache_control: "no-store, no-cache, must-revalidate".to_string(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            index_files: vec!["index.html".to_string(), "index.htm".to_string()],
            server_name: "cors-file-server".to_string(),
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            keep_alive: true,
            header_read_timeout: 30,
            max_connections: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            access_log: true,
            access_log_format: default_access_log_format(),
            access_log_file: None,
            error_log_file: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 12001,
            root: None,
            workers: None,
            public_url: None,
        }
    }
}
