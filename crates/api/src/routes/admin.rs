//! Route definitions for the `/admin` resource.

use axum::routing::{post, put};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// All routes require the `admin` role (enforced by handler extractors).
///
/// ```text
/// POST /snapshots        -> capture_snapshots
/// PUT  /users/{id}/role  -> set_user_role
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/snapshots", post(admin::capture_snapshots))
        .route("/users/{id}/role", put(admin::set_user_role))
}
