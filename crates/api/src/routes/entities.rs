//! Route definitions for the project child entities: risks, tasks,
//! resources, milestones and issues.
//!
//! Each collection is flat (`/risks`, `/tasks`, ...) and filtered by
//! `?project=` rather than nested under `/projects/{id}`.

use axum::routing::get;
use axum::Router;

use crate::handlers::{issues, milestones, resources, risks, tasks};
use crate::state::AppState;

/// Routes mounted at `/risks`.
///
/// ```text
/// GET    /                -> list
/// POST   /                -> create
/// GET    /high-priority   -> high_priority
/// GET    /{id}            -> get_by_id
/// PUT    /{id}            -> update
/// DELETE /{id}            -> delete
/// ```
pub fn risk_router() -> Router<AppState> {
    Router::new()
        .route("/", get(risks::list).post(risks::create))
        .route("/high-priority", get(risks::high_priority))
        .route(
            "/{id}",
            get(risks::get_by_id).put(risks::update).delete(risks::delete),
        )
}

/// Routes mounted at `/tasks`.
///
/// ```text
/// GET    /          -> list
/// POST   /          -> create
/// GET    /overdue   -> overdue
/// GET    /{id}      -> get_by_id
/// PUT    /{id}      -> update
/// DELETE /{id}      -> delete
/// ```
pub fn task_router() -> Router<AppState> {
    Router::new()
        .route("/", get(tasks::list).post(tasks::create))
        .route("/overdue", get(tasks::overdue))
        .route(
            "/{id}",
            get(tasks::get_by_id).put(tasks::update).delete(tasks::delete),
        )
}

/// Routes mounted at `/resources`.
pub fn resource_router() -> Router<AppState> {
    Router::new()
        .route("/", get(resources::list).post(resources::create))
        .route(
            "/{id}",
            get(resources::get_by_id)
                .put(resources::update)
                .delete(resources::delete),
        )
}

/// Routes mounted at `/milestones`.
pub fn milestone_router() -> Router<AppState> {
    Router::new()
        .route("/", get(milestones::list).post(milestones::create))
        .route(
            "/{id}",
            get(milestones::get_by_id)
                .put(milestones::update)
                .delete(milestones::delete),
        )
}

/// Routes mounted at `/issues`.
pub fn issue_router() -> Router<AppState> {
    Router::new()
        .route("/", get(issues::list).post(issues::create))
        .route(
            "/{id}",
            get(issues::get_by_id)
                .put(issues::update)
                .delete(issues::delete),
        )
}
