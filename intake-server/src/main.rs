//! intake-server binary

use intake_server::{AppState, BoxError, Config, api, logger};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;
    logger::init_logger(&config.log_level, config.log_dir.as_deref());

    tracing::info!(
        "Starting intake-server (env: {}, store: {})",
        config.environment,
        config.store_backend.as_str()
    );
    if config.webhook_secret.is_none() {
        tracing::warn!("AGGREGATOR_WEBHOOK_SECRET not set, webhook accepts unauthenticated deliveries");
    }

    let http_port = config.http_port;
    let state = AppState::new(config)?;

    let shutdown = CancellationToken::new();
    let reconciler_handle = tokio::spawn(state.reconciler.clone().run(shutdown.clone()));

    let app = api::create_router(state);
    let http_addr = format!("0.0.0.0:{http_port}");
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("intake-server HTTP listening on {http_addr}");

    let server_shutdown = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {e}");
            }
            tracing::info!("Shutdown signal received");
            server_shutdown.cancel();
        })
        .await?;

    shutdown.cancel();
    reconciler_handle.await?;
    tracing::info!("intake-server stopped");
    Ok(())
}
