// Signal handling module
//
// SIGTERM and SIGINT end the accept loop; anything else keeps default handling.

use crate::logger;

/// Resolve when the process is asked to terminate
///
/// Unix: SIGTERM or SIGINT. Elsewhere: Ctrl+C. If a handler cannot be
/// registered the error is logged and the future never resolves, leaving
/// termination to the default signal disposition.
#[cfg(unix)]
pub async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut sigterm, mut sigint) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(term), Ok(int)) => (term, int),
        (Err(e), _) | (_, Err(e)) => {
            logger::log_error(&format!("Failed to register signal handlers: {e}"));
            return std::future::pending().await;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => logger::log_debug("SIGTERM received"),
        _ = sigint.recv() => logger::log_debug("SIGINT received"),
    }
}

/// Windows fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => logger::log_debug("Ctrl+C received"),
        Err(e) => {
            logger::log_error(&format!("Failed to listen for Ctrl+C: {e}"));
            std::future::pending::<()>().await;
        }
    }
}
