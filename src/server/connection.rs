// Connection handling module
// Accepts a single TCP connection and serves it over HTTP/1.1

use std::cell::Cell;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::time::Instant;

use crate::config;
use crate::handler;
use crate::logger;

/// Accept and process a connection, checking limits and logging.
///
/// # Arguments
///
/// * `stream` - The TCP stream to handle
/// * `peer_addr` - The peer's socket address
/// * `state` - Shared application state
/// * `conn_counter` - Active connection counter
pub fn accept_connection(
    stream: tokio::net::TcpStream,
    peer_addr: std::net::SocketAddr,
    state: &Arc<config::AppState>,
    conn_counter: &Arc<AtomicUsize>,
) {
    // Increment counter first, then check limit (prevents race condition)
    let prev_count = conn_counter.fetch_add(1, Ordering::SeqCst);

    if let Some(max_conn) = state.config.performance.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            // Exceeded limit: rollback counter and reject
            conn_counter.fetch_sub(1, Ordering::SeqCst);
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. Connection rejected."
            ));
            drop(stream);
            return;
        }
    }

    logger::log_connection_accepted(&peer_addr);

    handle_connection(
        stream,
        peer_addr,
        Arc::clone(state),
        Arc::clone(conn_counter),
    );
}

/// Request activity on one connection, shared with its service
struct Activity {
    in_flight: Cell<usize>,
    last: Cell<Instant>,
}

impl Activity {
    fn new() -> Self {
        Self {
            in_flight: Cell::new(0),
            last: Cell::new(Instant::now()),
        }
    }

    fn begin(&self) {
        self.in_flight.set(self.in_flight.get() + 1);
        self.last.set(Instant::now());
    }

    fn end(&self) {
        self.in_flight.set(self.in_flight.get().saturating_sub(1));
        self.last.set(Instant::now());
    }

    fn idle_deadline(&self, idle: Duration) -> Option<Instant> {
        (self.in_flight.get() == 0).then(|| self.last.get() + idle)
    }
}

/// Handle a single connection in a spawned task.
///
/// Keep-alive connections stay open while they keep sending requests.
/// Once no request has been in progress for `keep_alive_timeout`
/// seconds the connection is shut down gracefully, so a response that
/// is still being written is finished first.
fn handle_connection(
    stream: tokio::net::TcpStream,
    peer_addr: std::net::SocketAddr,
    state: Arc<config::AppState>,
    conn_counter: Arc<AtomicUsize>,
) {
    tokio::task::spawn_local(async move {
        let io = TokioIo::new(stream);

        let keep_alive_timeout = state.config.performance.keep_alive_timeout;
        let idle = Duration::from_secs(keep_alive_timeout);
        let activity = Rc::new(Activity::new());

        let mut builder = http1::Builder::new();
        builder.keep_alive(keep_alive_timeout > 0);

        let tracker = Rc::clone(&activity);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| {
                let tracker = Rc::clone(&tracker);
                let state = Arc::clone(&state);
                async move {
                    tracker.begin();
                    let response = handler::handle_request(req, state, peer_addr).await;
                    tracker.end();
                    response
                }
            }),
        );
        tokio::pin!(conn);

        // Without keep-alive hyper closes after the first response
        if idle.is_zero() {
            if let Err(err) = conn.as_mut().await {
                logger::log_connection_error(&err);
            }
            conn_counter.fetch_sub(1, Ordering::SeqCst);
            return;
        }

        loop {
            // An in-flight request re-checks shortly after it completes
            let deadline = activity
                .idle_deadline(idle)
                .unwrap_or_else(|| Instant::now() + Duration::from_millis(100));

            tokio::select! {
                result = conn.as_mut() => {
                    if let Err(err) = result {
                        logger::log_connection_error(&err);
                    }
                    break;
                }
                () = tokio::time::sleep_until(deadline) => {
                    let expired = activity
                        .idle_deadline(idle)
                        .is_some_and(|at| at <= Instant::now());
                    if expired {
                        logger::log_debug(&format!(
                            "Connection from {peer_addr} idle for {keep_alive_timeout} seconds, closing"
                        ));
                        conn.as_mut().graceful_shutdown();
                        if let Err(err) = conn.as_mut().await {
                            logger::log_connection_error(&err);
                        }
                        break;
                    }
                }
            }
        }

        conn_counter.fetch_sub(1, Ordering::SeqCst);
    });
}
