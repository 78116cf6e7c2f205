//! Handler for `/reports`: the executive portfolio report.

use axum::extract::State;
use axum::Json;
use pmo_core::domain::ActivityAction;
use pmo_core::report::{self, PortfolioReport};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::portfolio::{load_portfolio, today};
use crate::state::AppState;

/// GET /api/v1/reports/portfolio
///
/// Executive summary, health metrics, status lines, top risks, budget lines
/// and recommendations, as structured JSON.
pub async fn portfolio(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<PortfolioReport>> {
    let today = today();
    let (projects, risks) =
        load_portfolio(&state.pool, today, state.config.high_risk_policy).await?;
    let report = report::build_portfolio_report(&projects, &risks, today);

    tracing::info!(
        projects = report.executive_summary.total_projects,
        recommendations = report.recommendations.len(),
        "Portfolio report generated",
    );
    state.record(
        user.activity(ActivityAction::Export)
            .with_model("report")
            .with_description("Generated portfolio report"),
    );
    Ok(Json(report))
}
