//! Handlers for `/ai`: narrative summaries generated from portfolio data.
//!
//! Every endpoint returns the engine's reply object with a `formatted` key
//! added, holding the display rendering of that reply.

use axum::extract::{Path, State};
use axum::Json;
use pmo_ai::format::format_for_display;
use pmo_ai::prompts::{
    self, ComparedProject, ExecutivePortfolio, ExecutiveProject, PortfolioCounts,
    PortfolioSummaryInput, ProjectSummaryInput, QuestionContext, RecentProject, RiskAnalysisInput,
};
use pmo_core::domain::ProjectStatus;
use pmo_core::error::CoreError;
use pmo_core::portfolio::{self, PortfolioProject, PortfolioRisk};
use pmo_core::types::DbId;
use pmo_db::repositories::{ProjectRepo, RiskRepo};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::portfolio::{load_bundle, load_bundles, load_portfolio, today};
use crate::state::AppState;

/// Projects given as context to free-form questions.
const RECENT_PROJECTS: usize = 5;

/// Upper bound on projects listed in the executive report prompt.
const EXECUTIVE_REPORT_PROJECTS: usize = 10;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub question: String,
}

#[derive(Debug, Deserialize)]
pub struct CompareRequest {
    #[serde(default)]
    pub project_ids: Vec<DbId>,
}

/// Attach the display rendering to a reply object.
fn with_display(mut reply: Value) -> Value {
    let formatted = format_for_display(&reply);
    if let Value::Object(map) = &mut reply {
        map.insert("formatted".to_string(), Value::String(formatted));
    }
    reply
}

fn status_count(projects: &[PortfolioProject], status: ProjectStatus) -> usize {
    projects.iter().filter(|p| p.status == status).count()
}

fn high_risk_count(risks: &[PortfolioRisk]) -> usize {
    risks.iter().filter(|r| r.is_high_or_critical()).count()
}

/// Summary input for the whole portfolio.
pub fn portfolio_summary_input(
    projects: &[PortfolioProject],
    risks: &[PortfolioRisk],
) -> PortfolioSummaryInput {
    let stats = portfolio::dashboard_stats(projects, risks);
    PortfolioSummaryInput {
        total_projects: projects.len(),
        on_track: status_count(projects, ProjectStatus::OnTrack),
        at_risk: status_count(projects, ProjectStatus::AtRisk),
        delayed: status_count(projects, ProjectStatus::Delayed),
        completed: status_count(projects, ProjectStatus::Completed),
        projects_behind_schedule: stats.performance.projects_behind_schedule,
        avg_completion: prompts::to_f64(stats.performance.avg_completion),
        avg_spi: prompts::to_f64(stats.performance.avg_spi),
        total_risks: risks.len(),
        high_risks: high_risk_count(risks),
    }
}

/// Executive report input: portfolio figures plus up to ten projects that
/// are at risk or delayed, in listing order.
pub fn executive_report_input(
    projects: &[PortfolioProject],
    risks: &[PortfolioRisk],
) -> (ExecutivePortfolio, Vec<ExecutiveProject>) {
    let summary = portfolio_summary_input(projects, risks);
    let portfolio = ExecutivePortfolio {
        total_projects: summary.total_projects,
        on_track: summary.on_track,
        at_risk: summary.at_risk,
        delayed: summary.delayed,
        avg_completion: summary.avg_completion,
        projects_behind_schedule: summary.projects_behind_schedule,
        total_risks: summary.total_risks,
        high_risks: summary.high_risks,
    };
    let critical = projects
        .iter()
        .filter(|p| matches!(p.status, ProjectStatus::AtRisk | ProjectStatus::Delayed))
        .take(EXECUTIVE_REPORT_PROJECTS)
        .map(|p| ExecutiveProject {
            name: p.name.clone(),
            status: p.status,
            spi: prompts::to_f64(p.spi),
            completion_percentage: p.completion_percentage,
            health_score: p.health_score,
        })
        .collect();
    (portfolio, critical)
}

/// GET /api/v1/ai/project-summary/{project_id}
pub async fn project_summary(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<Value>> {
    let project = ProjectRepo::find_by_id(&state.pool, project_id)
        .await?
        .ok_or_else(|| AppError::not_found("Project", project_id))?;
    let bundle = load_bundle(&state.pool, project).await?;
    let indicators = bundle.indicators(today(), state.config.high_risk_policy);
    let p = &bundle.project;

    let input = ProjectSummaryInput {
        name: p.name.clone(),
        status: p.status,
        completion_percentage: p.completion_percentage,
        spi: p.spi,
        cpi: p.cpi,
        total_risks: bundle.risks.len(),
        high_risks: bundle.high_risks(),
        budget: p.budget,
        spent: p.spent,
        days_remaining: indicators.days_remaining,
    };
    let reply = state.ai.project_summary(&input).await;
    Ok(Json(with_display(reply)))
}

/// GET /api/v1/ai/portfolio-summary
pub async fn portfolio_summary(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<Value>> {
    let (projects, risks) =
        load_portfolio(&state.pool, today(), state.config.high_risk_policy).await?;
    let input = portfolio_summary_input(&projects, &risks);
    let reply = state.ai.portfolio_summary(&input).await;
    Ok(Json(with_display(reply)))
}

/// GET /api/v1/ai/risk-analysis/{risk_id}
pub async fn risk_analysis(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(risk_id): Path<DbId>,
) -> AppResult<Json<Value>> {
    let risk = RiskRepo::find_by_id(&state.pool, risk_id)
        .await?
        .ok_or_else(|| AppError::not_found("Risk", risk_id))?;

    let input = RiskAnalysisInput {
        title: risk.title,
        category: risk.category,
        severity: risk.severity,
        probability: risk.probability,
        impact: risk.impact,
        description: risk.description,
        mitigation_plan: risk.mitigation_plan,
    };
    let reply = state.ai.analyze_risk(&input).await;
    Ok(Json(with_display(reply)))
}

/// POST /api/v1/ai/ask
pub async fn ask(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(input): Json<AskRequest>,
) -> AppResult<Json<Value>> {
    let question = input.question.trim();
    if question.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Question is required".into(),
        )));
    }

    let projects = ProjectRepo::list_all(&state.pool).await?;
    let context = QuestionContext {
        portfolio: PortfolioCounts {
            total_projects: projects.len(),
            on_track: projects.iter().filter(|p| p.status == ProjectStatus::OnTrack).count(),
            at_risk: projects.iter().filter(|p| p.status == ProjectStatus::AtRisk).count(),
            delayed: projects.iter().filter(|p| p.status == ProjectStatus::Delayed).count(),
        },
        recent_projects: projects
            .iter()
            .take(RECENT_PROJECTS)
            .map(|p| RecentProject {
                name: p.name.clone(),
                code: p.code.clone(),
                status: p.status,
                spi: prompts::to_f64(p.spi),
                completion_percentage: p.completion_percentage,
            })
            .collect(),
    };

    let reply = state.ai.answer_question(question, &context).await;
    Ok(Json(with_display(reply)))
}

/// POST /api/v1/ai/compare-projects
pub async fn compare_projects(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(input): Json<CompareRequest>,
) -> AppResult<Json<Value>> {
    if input.project_ids.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Project IDs are required".into(),
        )));
    }

    let projects = ProjectRepo::list_by_ids(&state.pool, &input.project_ids).await?;
    if projects.is_empty() {
        return Err(AppError::NotFound("No projects found".into()));
    }

    let today = today();
    let policy = state.config.high_risk_policy;
    let compared: Vec<ComparedProject> = load_bundles(&state.pool, projects)
        .await?
        .iter()
        .map(|b| ComparedProject {
            name: b.project.name.clone(),
            code: b.project.code.clone(),
            status: b.project.status,
            completion_percentage: b.project.completion_percentage,
            spi: prompts::to_f64(b.project.spi),
            cpi: prompts::to_f64(b.project.cpi),
            health_score: b.health_score(today, policy),
            total_risks: b.risks.len(),
            high_risks: b.high_risks(),
        })
        .collect();

    let reply = state.ai.compare_projects(&compared).await;
    Ok(Json(with_display(reply)))
}

/// GET /api/v1/ai/executive-report
pub async fn executive_report(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<Value>> {
    let (projects, risks) =
        load_portfolio(&state.pool, today(), state.config.high_risk_policy).await?;
    let (portfolio, critical) = executive_report_input(&projects, &risks);
    let reply = state.ai.executive_report(&portfolio, &critical).await;
    Ok(Json(with_display(reply)))
}
