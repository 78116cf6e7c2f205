//! Handlers for the `/issues` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use pmo_core::domain::ActivityAction;
use pmo_core::error::CoreError;
use pmo_core::metrics;
use pmo_core::types::DbId;
use pmo_core::validation::{validate_date_order, validate_required};
use pmo_db::models::issue::{CreateIssue, Issue, IssueFilter, UpdateIssue};
use pmo_db::repositories::IssueRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireProjectEditor;
use crate::portfolio::today;
use crate::state::AppState;

/// An issue with its resolution indicators.
#[derive(Debug, Serialize)]
pub struct IssueView {
    #[serde(flatten)]
    pub issue: Issue,
    pub is_resolved: bool,
    pub days_open: i64,
}

impl IssueView {
    pub fn new(issue: Issue, today: NaiveDate) -> Self {
        Self {
            is_resolved: metrics::issue_is_resolved(issue.status),
            days_open: metrics::issue_days_open(issue.reported_date, issue.resolved_date, today),
            issue,
        }
    }
}

fn validate_new_issue(input: &CreateIssue) -> Result<(), CoreError> {
    validate_required(&input.title, "title")?;
    validate_required(&input.reported_by, "reported_by")?;
    validate_date_order(
        input.reported_date,
        input.resolved_date,
        "reported_date",
        "resolved_date",
    )
}

/// POST /api/v1/issues
pub async fn create(
    State(state): State<AppState>,
    RequireProjectEditor(user): RequireProjectEditor,
    Json(input): Json<CreateIssue>,
) -> AppResult<(StatusCode, Json<IssueView>)> {
    validate_new_issue(&input)?;
    let issue = IssueRepo::create(&state.pool, &input).await?;

    tracing::info!(issue_id = issue.id, project_id = issue.project_id, "Issue reported");
    state.record(
        user.activity(ActivityAction::Create)
            .with_object("issue", issue.id)
            .with_description(format!("Reported issue '{}'", issue.title)),
    );
    Ok((StatusCode::CREATED, Json(IssueView::new(issue, today()))))
}

/// GET /api/v1/issues?project=&severity=&status=&ordering=
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(filter): Query<IssueFilter>,
) -> AppResult<Json<Vec<IssueView>>> {
    let today = today();
    let issues = IssueRepo::list(&state.pool, &filter).await?;
    Ok(Json(
        issues.into_iter().map(|i| IssueView::new(i, today)).collect(),
    ))
}

/// GET /api/v1/issues/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<IssueView>> {
    let issue = IssueRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Issue", id))?;
    Ok(Json(IssueView::new(issue, today())))
}

/// PUT /api/v1/issues/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireProjectEditor(user): RequireProjectEditor,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateIssue>,
) -> AppResult<Json<IssueView>> {
    if let Some(title) = &input.title {
        validate_required(title, "title")?;
    }
    validate_date_order(
        input.reported_date,
        input.resolved_date,
        "reported_date",
        "resolved_date",
    )?;
    let issue = IssueRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("Issue", id))?;

    state.record(
        user.activity(ActivityAction::Update)
            .with_object("issue", issue.id)
            .with_description(format!("Issue '{}' is now {}", issue.title, issue.status)),
    );
    Ok(Json(IssueView::new(issue, today())))
}

/// DELETE /api/v1/issues/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireProjectEditor(user): RequireProjectEditor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !IssueRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Issue", id));
    }
    state.record(user.activity(ActivityAction::Delete).with_object("issue", id));
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use pmo_core::domain::{IssueCategory, IssueStatus, Severity};

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn issue(status: IssueStatus, resolved: Option<NaiveDate>) -> Issue {
        Issue {
            id: 3,
            project_id: 1,
            title: "Build broken".into(),
            description: String::new(),
            category: IssueCategory::Technical,
            severity: Severity::High,
            status,
            reported_by: "Kim".into(),
            assigned_to: String::new(),
            reported_date: date(2024, 5, 1),
            resolved_date: resolved,
            resolution: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn open_issue_counts_days_until_today() {
        let view = IssueView::new(issue(IssueStatus::InProgress, None), date(2024, 5, 11));
        assert!(!view.is_resolved);
        assert_eq!(view.days_open, 10);
    }

    #[test]
    fn resolved_issue_stops_counting() {
        let view = IssueView::new(
            issue(IssueStatus::Resolved, Some(date(2024, 5, 4))),
            date(2024, 6, 1),
        );
        assert!(view.is_resolved);
        assert_eq!(view.days_open, 3);
    }
}
