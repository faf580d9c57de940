//! Static file server that stamps permissive CORS headers and disables
//! caching on every response.
//!
//! ```no_run
//! use cors_file_server::{Config, Server};
//!
//! # async fn run() -> Result<(), cors_file_server::ServerError> {
//! let config = Config::load()?;
//! let server = Server::bind(&config)?;
//! server.serve(cors_file_server::server::shutdown_signal()).await
//! # }
//! ```

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;

pub use config::Config;
pub use error::ServerError;
pub use server::Server;
