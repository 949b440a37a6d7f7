//! # React AI Bot
//!
//! Entry point: loads configuration, starts the OAuth callback server and the
//! posting scheduler, and runs until Ctrl+C.
//!
//! ```bash
//! # Run with default port 3000
//! cargo run
//!
//! # Run with debug logging
//! RUST_LOG=debug cargo run
//! ```

use axum::Router;
use log::{error, info};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use react_ai_bot::{build_router, planned_jobs, start_bot_scheduler, AppState, BotConfig};

/// Main entry point for the bot.
///
/// Any failure before the server is listening (configuration, client
/// construction, scheduler setup, binding the port) ends the process with a
/// non-zero exit status. Failures inside scheduled runs are recorded and logged
/// only.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize the logging system
    env_logger::init();

    let config = BotConfig::from_env()?;
    let state = Arc::new(AppState::from_config(&config)?);

    let mut scheduler = start_bot_scheduler(state.clone(), &planned_jobs(&config)).await?;

    // Build the HTTP application with all routes and middleware
    let app: Router =
        build_router(state).layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));

    let addr: SocketAddr = ([0, 0, 0, 0], config.port).into();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server running on port {}", config.port);
    info!("Please visit {} to authenticate", config.auth_url());

    scheduler.start().await?;
    info!("Bot started successfully");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    info!("Shutting down scheduler");
    if let Err(e) = scheduler.shutdown().await {
        error!("Failed to stop scheduler: {}", e);
    }

    served?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}
