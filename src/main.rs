use conversation_cart::cart::{AppState, ExpirySweeper};
use conversation_cart::config::Settings;
use conversation_cart::router::create_app_router;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // `.env` first so LOG_LEVEL can come from it
    dotenvy::dotenv().ok();
    init_tracing();

    let settings = Settings::from_env()?;
    let bind_address = settings.bind_address();
    let cleanup_interval = settings.cleanup_interval();
    let max_age = settings.max_conversation_age();

    // Initialize application state
    let state = Arc::new(AppState::new(settings)?);
    let store = Arc::clone(&state.store);

    let sweeper = ExpirySweeper::spawn(Arc::clone(&store), cleanup_interval, max_age);

    // Build application router with all routes and middleware
    let app = create_app_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server running on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.shutdown().await;
    let dropped = store.drain();
    tracing::info!(dropped, "cart store drained, shutting down");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        EnvFilter::new(level.to_lowercase())
    });

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
