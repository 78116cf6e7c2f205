pub mod admin;
pub mod ai;
pub mod analytics;
pub mod auth;
pub mod entities;
pub mod export;
pub mod health;
pub mod projects;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                     register (public)
/// /auth/login                        login (public)
/// /auth/refresh                      refresh (public)
/// /auth/logout                       logout (requires auth)
/// /auth/me                           get, update own profile
/// /auth/activities                   own activity log
///
/// /admin/snapshots                   capture snapshots now (POST, admin only)
/// /admin/users/{id}/role             change role (PUT, admin only)
///
/// /projects                          list, create
/// /projects/dashboard-stats          portfolio counts and averages
/// /projects/at-risk                  projects with warning signs
/// /projects/{id}                     get, update, delete
/// /projects/{id}/health-report       health report
/// /projects/{id}/snapshots           snapshot history
///
/// /risks                             list, create (?project, category, severity, status)
/// /risks/high-priority               live high and critical risks
/// /risks/{id}                        get, update, delete
///
/// /tasks                             list, create (?project, status, assigned_to, is_milestone)
/// /tasks/overdue                     overdue tasks
/// /tasks/{id}                        get, update, delete
///
/// /resources                         list, create (?project, role, is_active)
/// /resources/{id}                    get, update, delete
///
/// /milestones                        list, create (?project, status)
/// /milestones/{id}                   get, update, delete
///
/// /issues                            list, create (?project, severity, status)
/// /issues/{id}                       get, update, delete
///
/// /analytics/dashboard               portfolio dashboard
/// /analytics/projects                per-project performance
/// /analytics/risks                   risk categories and top risks
///
/// /reports/portfolio                 executive portfolio report
///
/// /export/{projects,tasks,risks,resources}.csv   CSV download
/// /export/all.zip                    all four CSV files
/// /import/projects.csv               update projects from CSV (POST)
///
/// /ai/project-summary/{project_id}   project narrative
/// /ai/portfolio-summary              portfolio narrative
/// /ai/risk-analysis/{risk_id}        risk narrative
/// /ai/ask                            free-form question (POST)
/// /ai/compare-projects               comparison (POST)
/// /ai/executive-report               executive narrative
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication and own profile.
        .nest("/auth", auth::router())
        // Administration (snapshots, roles).
        .nest("/admin", admin::router())
        // Projects and their portfolio views.
        .nest("/projects", projects::router())
        // Project child entities.
        .nest("/risks", entities::risk_router())
        .nest("/tasks", entities::task_router())
        .nest("/resources", entities::resource_router())
        .nest("/milestones", entities::milestone_router())
        .nest("/issues", entities::issue_router())
        // Derived views.
        .nest("/analytics", analytics::router())
        .nest("/reports", analytics::reports_router())
        // File exchange.
        .nest("/export", export::export_router())
        .nest("/import", export::import_router())
        // Narrative summaries.
        .nest("/ai", ai::router())
}
