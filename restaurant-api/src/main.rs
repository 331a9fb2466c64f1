use std::net::SocketAddr;

use anyhow::Context;
use restaurant_api::{AppState, Config, build_app, init_logger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment and logging
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    init_logger(&config.log_level, config.log_json, config.log_dir.as_deref())?;

    tracing::info!(
        environment = %config.environment,
        version = env!("CARGO_PKG_VERSION"),
        "Restaurant API starting"
    );

    // 2. State: store, email worker, admin seed
    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let state = AppState::new(config).await?;
    state.rate_limiter.spawn_cleanup();

    // 3. Serve
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "Listening");

    axum::serve(
        listener,
        build_app(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
