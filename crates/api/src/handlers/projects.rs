//! Handlers for the `/projects` resource.
//!
//! Besides CRUD this serves the portfolio dashboard counts, the at-risk list,
//! a per-project health report and the snapshot history. List rows and the
//! detail view carry indicators derived from the project's risks and tasks.

use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use pmo_core::domain::{ActivityAction, Priority, ProjectStatus, RiskStatus};
use pmo_core::error::CoreError;
use pmo_core::metrics::{HighRiskPolicy, ProjectIndicators};
use pmo_core::portfolio::{self, DashboardStats, TaskTotals};
use pmo_core::search::MAX_LIST_LIMIT;
use pmo_core::types::{Date, DbId, Money};
use pmo_core::validation::{
    validate_date_order, validate_non_negative, validate_non_negative_count, validate_percentage,
    validate_required,
};
use pmo_db::models::milestone::{Milestone, MilestoneFilter};
use pmo_db::models::project::{CreateProject, Project, ProjectFilter, UpdateProject};
use pmo_db::models::resource::{Resource, ResourceFilter};
use pmo_db::models::snapshot::ProjectSnapshot;
use pmo_db::repositories::{MilestoneRepo, ProjectRepo, ResourceRepo, SnapshotRepo};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::handlers::risks::RiskView;
use crate::handlers::tasks::TaskView;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireProjectEditor;
use crate::portfolio::{load_bundle, load_bundles, load_portfolio, today, ProjectBundle};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// One row of the project list.
#[derive(Debug, Serialize)]
pub struct ProjectListItem {
    pub id: DbId,
    pub name: String,
    pub code: String,
    pub status: ProjectStatus,
    pub priority: Priority,
    pub completion_percentage: i32,
    pub spi: Money,
    pub cpi: Money,
    pub health_score: i32,
    pub is_overbudget: bool,
    pub is_behind_schedule: bool,
    pub days_remaining: i64,
    pub total_risks: usize,
    pub high_risks: usize,
    pub project_manager: String,
    pub start_date: Date,
    pub planned_end_date: Date,
}

impl ProjectListItem {
    fn from_bundle(bundle: &ProjectBundle, today: NaiveDate, policy: HighRiskPolicy) -> Self {
        let p = &bundle.project;
        let indicators = bundle.indicators(today, policy);
        Self {
            id: p.id,
            name: p.name.clone(),
            code: p.code.clone(),
            status: p.status,
            priority: p.priority,
            completion_percentage: p.completion_percentage,
            spi: p.spi,
            cpi: p.cpi,
            health_score: indicators.health_score,
            is_overbudget: indicators.is_overbudget,
            is_behind_schedule: indicators.is_behind_schedule,
            days_remaining: indicators.days_remaining,
            total_risks: bundle.risks.len(),
            high_risks: bundle.high_risks(),
            project_manager: p.project_manager.clone(),
            start_date: p.start_date,
            planned_end_date: p.planned_end_date,
        }
    }
}

/// Full project view with every indicator and the child collections.
#[derive(Debug, Serialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    #[serde(flatten)]
    pub indicators: ProjectIndicators,
    pub total_risks: usize,
    pub high_risks: usize,
    pub open_tasks: usize,
    pub overdue_tasks: usize,
    pub risks: Vec<RiskView>,
    pub tasks: Vec<TaskView>,
    pub resources: Vec<Resource>,
    pub milestones: Vec<Milestone>,
}

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub project_name: String,
    pub project_code: String,
    pub status: ProjectStatus,
    pub health_score: i32,
    pub completion_percentage: i32,
    pub performance_indices: PerformanceIndices,
    pub budget: BudgetSection,
    pub timeline: TimelineSection,
    pub risks: RiskSection,
    pub tasks: TaskTotals,
    pub team: TeamSection,
}

#[derive(Debug, Serialize)]
pub struct PerformanceIndices {
    pub spi: Money,
    pub cpi: Money,
    pub is_behind_schedule: bool,
    pub is_overbudget: bool,
}

#[derive(Debug, Serialize)]
pub struct BudgetSection {
    pub total: Money,
    pub spent: Money,
    pub variance: Money,
}

#[derive(Debug, Serialize)]
pub struct TimelineSection {
    pub start_date: Date,
    pub planned_end_date: Date,
    pub days_remaining: i64,
}

#[derive(Debug, Serialize)]
pub struct RiskSection {
    pub total: usize,
    pub by_severity: BTreeMap<&'static str, usize>,
    pub open: usize,
}

#[derive(Debug, Serialize)]
pub struct TeamSection {
    pub size: i32,
    pub resources: usize,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_new_project(input: &CreateProject) -> Result<(), CoreError> {
    validate_required(&input.name, "name")?;
    validate_required(&input.code, "code")?;
    validate_required(&input.project_manager, "project_manager")?;
    validate_date_order(
        Some(input.start_date),
        Some(input.planned_end_date),
        "start_date",
        "planned_end_date",
    )?;
    validate_figures(
        input.completion_percentage,
        input.budget,
        input.spent,
        input.spi,
        input.cpi,
        input.team_size,
    )
}

/// Checks an update against the stored row so a single changed date is
/// still compared with the other one.
fn validate_project_update(input: &UpdateProject, current: &Project) -> Result<(), CoreError> {
    for (value, name) in [
        (&input.name, "name"),
        (&input.code, "code"),
        (&input.project_manager, "project_manager"),
    ] {
        if let Some(value) = value {
            validate_required(value, name)?;
        }
    }
    validate_date_order(
        Some(input.start_date.unwrap_or(current.start_date)),
        Some(input.planned_end_date.unwrap_or(current.planned_end_date)),
        "start_date",
        "planned_end_date",
    )?;
    validate_figures(
        input.completion_percentage,
        input.budget,
        input.spent,
        input.spi,
        input.cpi,
        input.team_size,
    )
}

fn validate_figures(
    completion: Option<i32>,
    budget: Option<Money>,
    spent: Option<Money>,
    spi: Option<Money>,
    cpi: Option<Money>,
    team_size: Option<i32>,
) -> Result<(), CoreError> {
    if let Some(pct) = completion {
        validate_percentage(pct, "completion_percentage")?;
    }
    for (value, name) in [(budget, "budget"), (spent, "spent"), (spi, "spi"), (cpi, "cpi")] {
        if let Some(value) = value {
            validate_non_negative(value, name)?;
        }
    }
    if let Some(size) = team_size {
        validate_non_negative_count(size, "team_size")?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// POST /api/v1/projects
pub async fn create(
    State(state): State<AppState>,
    RequireProjectEditor(user): RequireProjectEditor,
    Json(input): Json<CreateProject>,
) -> AppResult<(StatusCode, Json<ProjectDetail>)> {
    validate_new_project(&input)?;
    let project = ProjectRepo::create(&state.pool, &input).await?;

    tracing::info!(project_id = project.id, code = %project.code, "Project created");
    state.record(
        user.activity(ActivityAction::Create)
            .with_object("project", project.id)
            .with_description(format!("Created project {}", project.code)),
    );

    let detail = build_detail(&state, project).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// GET /api/v1/projects?status=&priority=&project_manager=&search=&ordering=&limit=&offset=
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(filter): Query<ProjectFilter>,
) -> AppResult<Json<Vec<ProjectListItem>>> {
    let projects = ProjectRepo::list(&state.pool, &filter).await?;
    let bundles = load_bundles(&state.pool, projects).await?;
    let today = today();
    let policy = state.config.high_risk_policy;
    Ok(Json(
        bundles
            .iter()
            .map(|b| ProjectListItem::from_bundle(b, today, policy))
            .collect(),
    ))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<ProjectDetail>> {
    let project = find_project(&state, id).await?;
    Ok(Json(build_detail(&state, project).await?))
}

/// PUT /api/v1/projects/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireProjectEditor(user): RequireProjectEditor,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProject>,
) -> AppResult<Json<ProjectDetail>> {
    let current = find_project(&state, id).await?;
    validate_project_update(&input, &current)?;

    let project = ProjectRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("Project", id))?;

    state.record(
        user.activity(ActivityAction::Update)
            .with_object("project", project.id)
            .with_description(format!("Updated project {}", project.code)),
    );
    Ok(Json(build_detail(&state, project).await?))
}

/// DELETE /api/v1/projects/{id}
///
/// Removes the project and all of its children.
pub async fn delete(
    State(state): State<AppState>,
    RequireProjectEditor(user): RequireProjectEditor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !ProjectRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Project", id));
    }
    tracing::info!(project_id = id, "Project deleted");
    state.record(user.activity(ActivityAction::Delete).with_object("project", id));
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Portfolio views
// ---------------------------------------------------------------------------

/// GET /api/v1/projects/dashboard-stats
pub async fn dashboard_stats(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<DashboardStats>> {
    let (projects, risks) =
        load_portfolio(&state.pool, today(), state.config.high_risk_policy).await?;
    Ok(Json(portfolio::dashboard_stats(&projects, &risks)))
}

/// GET /api/v1/projects/at-risk
///
/// Projects flagged at risk or delayed, or with SPI or CPI below 0.9.
pub async fn at_risk(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<Vec<ProjectListItem>>> {
    let projects = ProjectRepo::list_all(&state.pool).await?;
    let bundles = load_bundles(&state.pool, projects).await?;
    let today = today();
    let policy = state.config.high_risk_policy;
    Ok(Json(
        bundles
            .iter()
            .filter(|b| portfolio::is_at_risk(&b.to_portfolio(today, policy)))
            .map(|b| ProjectListItem::from_bundle(b, today, policy))
            .collect(),
    ))
}

/// GET /api/v1/projects/{id}/health-report
pub async fn health_report(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<HealthReport>> {
    let project = find_project(&state, id).await?;
    let team = ResourceRepo::list_active_by_project(&state.pool, id).await?;
    let bundle = load_bundle(&state.pool, project).await?;
    let today = today();
    let indicators = bundle.indicators(today, state.config.high_risk_policy);

    let severities: Vec<_> = bundle.risks.iter().map(|r| r.severity).collect();
    let tasks: Vec<_> = bundle.tasks.iter().map(|t| t.to_portfolio()).collect();
    let p = &bundle.project;

    Ok(Json(HealthReport {
        project_name: p.name.clone(),
        project_code: p.code.clone(),
        status: p.status,
        health_score: indicators.health_score,
        completion_percentage: p.completion_percentage,
        performance_indices: PerformanceIndices {
            spi: p.spi,
            cpi: p.cpi,
            is_behind_schedule: indicators.is_behind_schedule,
            is_overbudget: indicators.is_overbudget,
        },
        budget: BudgetSection {
            total: p.budget,
            spent: p.spent,
            variance: indicators.budget_variance,
        },
        timeline: TimelineSection {
            start_date: p.start_date,
            planned_end_date: p.planned_end_date,
            days_remaining: indicators.days_remaining,
        },
        risks: RiskSection {
            total: bundle.risks.len(),
            by_severity: portfolio::risks_by_severity(&severities),
            open: bundle
                .risks
                .iter()
                .filter(|r| r.status == RiskStatus::Open)
                .count(),
        },
        tasks: portfolio::task_totals(&tasks, today),
        team: TeamSection {
            size: p.team_size,
            resources: team.len(),
        },
    }))
}

/// GET /api/v1/projects/{id}/snapshots
///
/// Daily snapshots, newest first.
pub async fn snapshots(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<ProjectSnapshot>>> {
    find_project(&state, id).await?;
    let snapshots = SnapshotRepo::list_by_project(&state.pool, id).await?;
    Ok(Json(snapshots))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_project(state: &AppState, id: DbId) -> AppResult<Project> {
    ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Project", id))
}

async fn build_detail(state: &AppState, project: Project) -> AppResult<ProjectDetail> {
    let id = project.id;
    let resources = ResourceRepo::list(
        &state.pool,
        &ResourceFilter {
            project: Some(id),
            limit: Some(MAX_LIST_LIMIT),
            ..Default::default()
        },
    )
    .await?;
    let milestones = MilestoneRepo::list(
        &state.pool,
        &MilestoneFilter {
            project: Some(id),
            limit: Some(MAX_LIST_LIMIT),
            ..Default::default()
        },
    )
    .await?;

    let bundle = load_bundle(&state.pool, project).await?;
    let today = today();
    let indicators = bundle.indicators(today, state.config.high_risk_policy);

    Ok(ProjectDetail {
        indicators,
        total_risks: bundle.risks.len(),
        high_risks: bundle.high_risks(),
        open_tasks: bundle.open_tasks(),
        overdue_tasks: bundle.overdue_tasks(today),
        risks: bundle.risks.into_iter().map(RiskView::from).collect(),
        tasks: bundle
            .tasks
            .into_iter()
            .map(|t| TaskView::new(t, today))
            .collect(),
        resources,
        milestones,
        project: bundle.project,
    })
}
