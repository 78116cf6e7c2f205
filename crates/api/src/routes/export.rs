//! Route definitions for CSV export and import.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::export;
use crate::state::AppState;

/// Routes mounted at `/export`.
///
/// ```text
/// GET /projects.csv   -> export_projects
/// GET /tasks.csv      -> export_tasks
/// GET /risks.csv      -> export_risks
/// GET /resources.csv  -> export_resources
/// GET /all.zip        -> export_all
/// ```
pub fn export_router() -> Router<AppState> {
    Router::new()
        .route("/projects.csv", get(export::export_projects))
        .route("/tasks.csv", get(export::export_tasks))
        .route("/risks.csv", get(export::export_risks))
        .route("/resources.csv", get(export::export_resources))
        .route("/all.zip", get(export::export_all))
}

/// Routes mounted at `/import`.
pub fn import_router() -> Router<AppState> {
    Router::new().route("/projects.csv", post(export::import_projects))
}
