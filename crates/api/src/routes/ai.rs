//! Route definitions for the `/ai` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::ai;
use crate::state::AppState;

/// Routes mounted at `/ai`.
///
/// ```text
/// GET  /project-summary/{project_id}  -> project_summary
/// GET  /portfolio-summary             -> portfolio_summary
/// GET  /risk-analysis/{risk_id}       -> risk_analysis
/// POST /ask                           -> ask
/// POST /compare-projects              -> compare_projects
/// GET  /executive-report              -> executive_report
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/project-summary/{project_id}", get(ai::project_summary))
        .route("/portfolio-summary", get(ai::portfolio_summary))
        .route("/risk-analysis/{risk_id}", get(ai::risk_analysis))
        .route("/ask", post(ai::ask))
        .route("/compare-projects", post(ai::compare_projects))
        .route("/executive-report", get(ai::executive_report))
}
