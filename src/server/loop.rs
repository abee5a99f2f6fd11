// Server loop module
// Accepts connections until a shutdown is requested

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use super::signal::SignalHandler;
use crate::config;
use crate::logger;

/// Accept loop for the dev server
///
/// Must run inside a `LocalSet`: connections are served with `spawn_local`.
/// Returns once `signals` requests shutdown; connections already accepted
/// keep running until they finish.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<config::AppState>,
    active_connections: Arc<AtomicUsize>,
    signals: Arc<SignalHandler>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        let shutdown = signals.shutdown.notified();
        tokio::pin!(shutdown);
        // Register interest before checking the flag so a notification
        // landing in between is not lost
        shutdown.as_mut().enable();
        if signals.shutdown_requested.load(Ordering::SeqCst) {
            break;
        }

        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = &mut shutdown => break,
        }
    }

    drop(listener);
    logger::log_shutdown(active_connections.load(Ordering::SeqCst));
    Ok(())
}
