use std::net::SocketAddr;

use tracing_subscriber::EnvFilter;

use starfall_server::build_app;
use starfall_server::config::ServerConfig;
use starfall_server::rate_limit::spawn_cleanup;

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if std::env::var_os("STARFALL_LOG_JSON").is_some() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let config = ServerConfig::load();
    if let Err(errors) = config.validate() {
        for e in &errors {
            tracing::error!("{e}");
        }
        std::process::exit(1);
    }

    let addr = config.listen_addr.clone();
    let (app, state) = build_app(config);
    tracing::info!(store = state.store.backend_name(), "Score store ready");
    spawn_cleanup(state);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind to {addr}: {e}");
            std::process::exit(1);
        },
    };
    tracing::info!("Starfall server listening on {addr}");

    let served = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await;
    if let Err(e) = served {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
