//! Route definitions for the `/projects` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::projects;
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                     -> list
/// POST   /                     -> create
/// GET    /dashboard-stats      -> dashboard_stats
/// GET    /at-risk              -> at_risk
/// GET    /{id}                 -> get_by_id
/// PUT    /{id}                 -> update
/// DELETE /{id}                 -> delete
/// GET    /{id}/health-report   -> health_report
/// GET    /{id}/snapshots       -> snapshots
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(projects::list).post(projects::create))
        .route("/dashboard-stats", get(projects::dashboard_stats))
        .route("/at-risk", get(projects::at_risk))
        .route(
            "/{id}",
            get(projects::get_by_id)
                .put(projects::update)
                .delete(projects::delete),
        )
        .route("/{id}/health-report", get(projects::health_report))
        .route("/{id}/snapshots", get(projects::snapshots))
}
