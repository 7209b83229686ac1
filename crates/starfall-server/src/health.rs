use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::state::AppState;

/// Structured health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub store: &'static str,
}

/// Liveness plus the active store backend. An unconfigured store reports
/// `degraded` but the endpoint still answers 200.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let store = state.store.backend_name();
    Json(HealthResponse {
        status: if store == "unconfigured" {
            "degraded"
        } else {
            "healthy"
        },
        version: env!("CARGO_PKG_VERSION"),
        store,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_response_serializes() {
        let resp = HealthResponse {
            status: "healthy",
            version: "0.1.0",
            store: "memory",
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"healthy\""));
        assert!(json.contains("\"store\":\"memory\""));
    }
}
