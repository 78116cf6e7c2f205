//! Handlers for `/analytics`: portfolio dashboard, project performance and
//! risk breakdowns.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::Json;
use pmo_core::portfolio::{
    self, BudgetOverview, BudgetVarianceEntry, CategoryCount, PerformanceStats, PortfolioProject,
    PortfolioRisk, SpiDistribution, TaskTotals, BUDGET_VARIANCE_LIST_SIZE, HEALTH_RANKING_SIZE,
    TOP_RISK_LIST_SIZE,
};
use pmo_core::types::Money;
use pmo_db::repositories::{RiskRepo, TaskRepo};
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::portfolio::{load_portfolio, today};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AnalyticsDashboard {
    pub total_projects: usize,
    /// Projects not yet completed.
    pub active_projects: usize,
    pub status_breakdown: BTreeMap<&'static str, usize>,
    pub performance: PerformanceStats,
    pub budget: BudgetOverview,
    pub total_risks: usize,
    pub risk_by_severity: BTreeMap<&'static str, usize>,
    pub tasks: TaskTotals,
    pub top_projects: Vec<PortfolioProject>,
    pub bottom_projects: Vec<PortfolioProject>,
}

#[derive(Debug, Serialize)]
pub struct ProjectAnalytics {
    pub projects: Vec<PortfolioProject>,
    pub projects_by_spi: SpiDistribution,
    /// Largest overruns first.
    pub budget_projects: Vec<BudgetVarianceEntry>,
}

#[derive(Debug, Serialize)]
pub struct TopRisk {
    #[serde(flatten)]
    pub risk: PortfolioRisk,
    pub risk_score: Money,
}

#[derive(Debug, Serialize)]
pub struct RiskAnalytics {
    pub total_risks: usize,
    pub risk_categories: Vec<CategoryCount>,
    pub top_risks: Vec<TopRisk>,
}

/// GET /api/v1/analytics/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<AnalyticsDashboard>> {
    let today = today();
    let (projects, risks) =
        load_portfolio(&state.pool, today, state.config.high_risk_policy).await?;
    let tasks: Vec<_> = TaskRepo::list_all(&state.pool)
        .await?
        .iter()
        .map(|t| t.to_portfolio())
        .collect();

    let stats = portfolio::dashboard_stats(&projects, &risks);
    let severities: Vec<_> = risks.iter().map(|r| r.severity).collect();
    let (top, bottom) = portfolio::health_rankings(&projects, HEALTH_RANKING_SIZE);

    Ok(Json(AnalyticsDashboard {
        total_projects: projects.len(),
        active_projects: projects.iter().filter(|p| p.status.is_active()).count(),
        status_breakdown: stats.by_status,
        performance: stats.performance,
        budget: portfolio::budget_overview(&projects),
        total_risks: risks.len(),
        risk_by_severity: portfolio::risks_by_severity(&severities),
        tasks: portfolio::task_totals(&tasks, today),
        top_projects: top.into_iter().cloned().collect(),
        bottom_projects: bottom.into_iter().cloned().collect(),
    }))
}

/// GET /api/v1/analytics/projects
pub async fn projects(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<ProjectAnalytics>> {
    let (projects, _) =
        load_portfolio(&state.pool, today(), state.config.high_risk_policy).await?;
    Ok(Json(ProjectAnalytics {
        projects_by_spi: portfolio::spi_distribution(&projects),
        budget_projects: portfolio::worst_budget_variances(&projects, BUDGET_VARIANCE_LIST_SIZE),
        projects,
    }))
}

/// GET /api/v1/analytics/risks
pub async fn risks(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<RiskAnalytics>> {
    let risks: Vec<PortfolioRisk> = RiskRepo::list_all_with_project(&state.pool)
        .await?
        .iter()
        .map(|r| r.to_portfolio())
        .collect();
    let top_risks = portfolio::top_risks_by_score(&risks, TOP_RISK_LIST_SIZE)
        .into_iter()
        .map(|r| TopRisk {
            risk_score: r.risk_score(),
            risk: r.clone(),
        })
        .collect();
    Ok(Json(RiskAnalytics {
        total_risks: risks.len(),
        risk_categories: portfolio::risk_category_counts(&risks),
        top_risks,
    }))
}
