//! Root-level liveness endpoint, mounted outside `/api/v1`.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the database is unreachable.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// `demo` when no AI credential is configured, otherwise `live`.
    pub ai_mode: &'static str,
    pub high_risk_policy: &'static str,
}

/// GET /health
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = match pmo_db::health_check(&state.pool).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not reach the database");
            false
        }
    };

    Json(HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        ai_mode: if state.ai.is_demo() { "demo" } else { "live" },
        high_risk_policy: state.config.high_risk_policy.as_str(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
