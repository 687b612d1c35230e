use bingo::{app, room::start_cleanup_task, AppState, ServerConfig};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bingo=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting bingo server");

    let config = ServerConfig::from_env();
    let app_state = AppState::from_config(config.clone());

    let cleanup = tokio::spawn(start_cleanup_task(
        app_state.room_service.clone(),
        app_state.game_service.clone(),
        config.cleanup.clone(),
    ));

    let listener = match tokio::net::TcpListener::bind(&config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(addr = %config.bind_addr, error = %e, "Failed to bind");
            return;
        }
    };
    info!("Server running on http://{}", config.bind_addr);

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for shutdown signal");
        }
        info!("Shutting down");
    };

    if let Err(e) = axum::serve(listener, app(app_state))
        .with_graceful_shutdown(shutdown)
        .await
    {
        error!(error = %e, "Server error");
    }

    cleanup.abort();
}
