use std::sync::Arc;

use sbc_solver::config::{ConfigError, ServiceConfig};
use sbc_solver::logs::LogBuffer;
use sbc_solver::pool::WorkerPool;
use sbc_solver::server::{AppState, build_router, serve_until_shutdown, shutdown_signal};
use sbc_solver::solver::UnconfiguredSolver;
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Error)]
enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

fn main() -> Result<(), StartupError> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sbc_solver=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServiceConfig::from_env()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(serve(config));

    // Solves still running on blocking threads are not waited for.
    runtime.shutdown_background();
    result
}

async fn serve(config: ServiceConfig) -> Result<(), StartupError> {
    let pool = WorkerPool::new(config.workers);
    tracing::warn!("no solver backend linked; every solve will fail");
    let app_state = AppState::new(LogBuffer::new(), pool, Arc::new(UnconfiguredSolver));

    let app = build_router(app_state.clone(), config.allowed_origins.clone());

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        workers = config.workers.get(),
        shutdown_grace_secs = config.shutdown_grace.as_secs(),
        "listening"
    );

    serve_until_shutdown(
        listener,
        app,
        &app_state,
        shutdown_signal(),
        config.shutdown_grace,
    )
    .await?;
    Ok(())
}
