//! Process shutdown: signal handling, the bounded graceful phase, and the
//! cleanup hook.
//!
//! ```text
//! signal ─► stop accepting ─► drain requests (at most `grace`) ─► hook
//! ```
//!
//! Requests still waiting on a solve when the grace period ends are
//! abandoned; their solver threads die with the process.

use std::future::{Future, IntoFuture};
use std::io;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::AppState;
use crate::logs::SERVICE_SHUTTING_DOWN;

/// Resolves when the process is asked to stop (Ctrl-C, or SIGTERM on Unix).
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

/// Serves `app` on `listener` until `signal` resolves, then shuts down.
///
/// After the signal the listener is closed and open requests get `grace` to
/// finish. Whatever is still running after that is left behind. The shutdown
/// hook runs in both cases, and also if the server stops on its own.
pub async fn serve_until_shutdown<F>(
    listener: TcpListener,
    app: Router,
    app_state: &AppState,
    signal: F,
    grace: Duration,
) -> io::Result<()>
where
    F: Future<Output = ()> + Send,
{
    let stop = CancellationToken::new();
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(stop.clone().cancelled_owned())
        .into_future();
    tokio::pin!(server);
    tokio::pin!(signal);

    let result = tokio::select! {
        result = &mut server => result,
        () = &mut signal => {
            stop.cancel();
            match tokio::time::timeout(grace, &mut server).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(
                        grace_ms = grace.as_millis() as u64,
                        in_flight = app_state.pool().in_flight(),
                        "Grace period elapsed, abandoning open requests"
                    );
                    Ok(())
                }
            }
        }
    };

    run_shutdown_hook(app_state).await;
    result
}

/// Runs once the server has stopped serving requests.
///
/// Stops the worker pool without waiting for solves still in progress, then
/// records a final line. The line lands in the shared buffer and may be wiped
/// by a solve that is still starting up.
pub async fn run_shutdown_hook(app_state: &AppState) {
    app_state.pool().shutdown(false).await;
    app_state.logs().append(SERVICE_SHUTTING_DOWN);
    info!(
        in_flight = app_state.pool().in_flight(),
        "Shutdown hook complete"
    );
}
