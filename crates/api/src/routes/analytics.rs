//! Route definitions for `/analytics` and `/reports`.

use axum::routing::get;
use axum::Router;

use crate::handlers::{analytics, reports};
use crate::state::AppState;

/// Routes mounted at `/analytics`.
///
/// ```text
/// GET /dashboard  -> dashboard
/// GET /projects   -> projects
/// GET /risks      -> risks
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(analytics::dashboard))
        .route("/projects", get(analytics::projects))
        .route("/risks", get(analytics::risks))
}

/// Routes mounted at `/reports`.
pub fn reports_router() -> Router<AppState> {
    Router::new().route("/portfolio", get(reports::portfolio))
}
