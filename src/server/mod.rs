// Server module entry point
// Binds the listener and runs the accept loop

pub mod connection;
pub mod listener;
pub mod signal;

// Rust does not allow `loop` as a module name (keyword)
#[path = "loop.rs"]
pub mod server_loop;

use std::future::Future;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::{AppState, Config};
use crate::error::ServerError;
use crate::logger;

pub use listener::create_listener;
pub use server_loop::start_server_loop;
pub use signal::shutdown_signal;

/// A bound file server, ready to serve
#[derive(Debug)]
pub struct Server {
    listener: TcpListener,
    state: Arc<AppState>,
    active_connections: Arc<AtomicUsize>,
}

impl Server {
    /// Resolve the root directory and bind the listening socket
    ///
    /// Fails with [`ServerError::Bind`] when the address is taken; callers
    /// treat that as fatal. Must be called from within a Tokio runtime.
    pub fn bind(config: &Config) -> Result<Self, ServerError> {
        let addr = config.get_socket_addr()?;
        let root = config.root_dir()?;
        let state = AppState::new(config, root)?;

        let listener =
            create_listener(addr).map_err(|source| ServerError::Bind { addr, source })?;

        Ok(Self {
            listener,
            state: Arc::new(state),
            active_connections: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Actual bound address (resolves port 0)
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Directory served as `/`
    pub fn root(&self) -> &Path {
        self.state.root()
    }

    /// Print the startup banner and serve until `shutdown` resolves
    pub async fn serve<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()>,
    {
        let addr = self.local_addr()?;
        logger::log_server_start(&addr, self.root(), &self.state.config);

        start_server_loop(self.listener, self.state, self.active_connections, shutdown).await;
        Ok(())
    }
}
