pub mod api;
pub mod config;
pub mod error;
pub mod health;
pub mod origin;
pub mod rate_limit;
pub mod state;
pub mod store;
pub mod validation;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use config::ServerConfig;
use state::AppState;

/// Build the Axum router and application state from a config.
pub fn build_app(config: ServerConfig) -> (Router<()>, AppState) {
    build_app_with_state(AppState::new(config))
}

/// Build the router around an existing state.
pub fn build_app_with_state(state: AppState) -> (Router<()>, AppState) {
    let web_root = state.config.web_root.clone();

    // Submissions and reads are charged to separate per-IP budgets
    let api_routes = Router::new()
        .route(
            "/submit-score",
            post(api::submit_score).route_layer(middleware::from_fn_with_state(
                state.clone(),
                rate_limit::limit_submissions,
            )),
        )
        .route(
            "/leaderboard",
            get(api::leaderboard).route_layer(middleware::from_fn_with_state(
                state.clone(),
                rate_limit::limit_leaderboard,
            )),
        );

    let app = Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health::health_check))
        .fallback_service(ServeDir::new(&web_root))
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    (app, state)
}
