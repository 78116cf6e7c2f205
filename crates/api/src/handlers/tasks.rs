//! Handlers for the `/tasks` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use pmo_core::domain::ActivityAction;
use pmo_core::error::CoreError;
use pmo_core::metrics;
use pmo_core::types::DbId;
use pmo_core::validation::{
    validate_date_order, validate_non_negative, validate_percentage, validate_required,
};
use pmo_db::models::task::{CreateTask, Task, TaskFilter, UpdateTask};
use pmo_db::repositories::TaskRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireProjectEditor;
use crate::portfolio::today;
use crate::state::AppState;

/// A task with its due-date indicators.
#[derive(Debug, Serialize)]
pub struct TaskView {
    #[serde(flatten)]
    pub task: Task,
    pub is_overdue: bool,
    pub days_until_due: i64,
}

impl TaskView {
    pub fn new(task: Task, today: NaiveDate) -> Self {
        Self {
            is_overdue: metrics::task_is_overdue(task.status, Some(task.due_date), today),
            days_until_due: metrics::task_days_until_due(task.status, Some(task.due_date), today),
            task,
        }
    }
}

fn views(tasks: Vec<Task>) -> Vec<TaskView> {
    let today = today();
    tasks.into_iter().map(|t| TaskView::new(t, today)).collect()
}

fn validate_new_task(input: &CreateTask) -> Result<(), CoreError> {
    validate_required(&input.name, "name")?;
    validate_required(&input.assigned_to, "assigned_to")?;
    validate_date_order(
        Some(input.start_date),
        Some(input.due_date),
        "start_date",
        "due_date",
    )?;
    if let Some(pct) = input.completion_percentage {
        validate_percentage(pct, "completion_percentage")?;
    }
    if let Some(hours) = input.planned_hours {
        validate_non_negative(hours, "planned_hours")?;
    }
    if let Some(hours) = input.actual_hours {
        validate_non_negative(hours, "actual_hours")?;
    }
    Ok(())
}

fn validate_task_update(input: &UpdateTask) -> Result<(), CoreError> {
    if let Some(name) = &input.name {
        validate_required(name, "name")?;
    }
    validate_date_order(input.start_date, input.due_date, "start_date", "due_date")?;
    if let Some(pct) = input.completion_percentage {
        validate_percentage(pct, "completion_percentage")?;
    }
    if let Some(hours) = input.planned_hours {
        validate_non_negative(hours, "planned_hours")?;
    }
    if let Some(hours) = input.actual_hours {
        validate_non_negative(hours, "actual_hours")?;
    }
    Ok(())
}

/// POST /api/v1/tasks
pub async fn create(
    State(state): State<AppState>,
    RequireProjectEditor(user): RequireProjectEditor,
    Json(input): Json<CreateTask>,
) -> AppResult<(StatusCode, Json<TaskView>)> {
    validate_new_task(&input)?;
    let task = TaskRepo::create(&state.pool, &input).await?;

    tracing::info!(task_id = task.id, project_id = task.project_id, "Task created");
    state.record(
        user.activity(ActivityAction::Create)
            .with_object("task", task.id)
            .with_description(format!("Created task '{}'", task.name)),
    );
    Ok((StatusCode::CREATED, Json(TaskView::new(task, today()))))
}

/// GET /api/v1/tasks?project=&status=&assigned_to=&is_milestone=&ordering=
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(filter): Query<TaskFilter>,
) -> AppResult<Json<Vec<TaskView>>> {
    let tasks = TaskRepo::list(&state.pool, &filter).await?;
    Ok(Json(views(tasks)))
}

/// GET /api/v1/tasks/overdue
///
/// Tasks not yet started or in progress whose due date has passed.
pub async fn overdue(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<Vec<TaskView>>> {
    let tasks = TaskRepo::list_overdue(&state.pool, today()).await?;
    Ok(Json(views(tasks)))
}

/// GET /api/v1/tasks/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<TaskView>> {
    let task = TaskRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Task", id))?;
    Ok(Json(TaskView::new(task, today())))
}

/// PUT /api/v1/tasks/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireProjectEditor(user): RequireProjectEditor,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTask>,
) -> AppResult<Json<TaskView>> {
    validate_task_update(&input)?;
    let task = TaskRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("Task", id))?;

    state.record(
        user.activity(ActivityAction::Update)
            .with_object("task", task.id)
            .with_description(format!("Updated task '{}'", task.name)),
    );
    Ok(Json(TaskView::new(task, today())))
}

/// DELETE /api/v1/tasks/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireProjectEditor(user): RequireProjectEditor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !TaskRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Task", id));
    }
    state.record(user.activity(ActivityAction::Delete).with_object("task", id));
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Utc;
    use pmo_core::domain::TaskStatus;
    use rust_decimal_macros::dec;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn task(status: TaskStatus, due: NaiveDate) -> Task {
        Task {
            id: 1,
            project_id: 1,
            name: "Write migration".into(),
            description: String::new(),
            status,
            assigned_to: "Sam".into(),
            start_date: date(2024, 1, 1),
            due_date: due,
            completion_date: None,
            planned_hours: dec!(8),
            actual_hours: dec!(0),
            completion_percentage: 0,
            is_milestone: false,
            is_critical_path: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn view_flags_overdue_tasks() {
        let today = date(2024, 6, 10);
        let view = TaskView::new(task(TaskStatus::InProgress, date(2024, 6, 1)), today);
        assert!(view.is_overdue);
        assert_eq!(view.days_until_due, -9);

        let done = TaskView::new(task(TaskStatus::Completed, date(2024, 6, 1)), today);
        assert!(!done.is_overdue);
        assert_eq!(done.days_until_due, 0);
    }

    #[test]
    fn due_date_before_start_is_rejected() {
        let input = CreateTask {
            project_id: 1,
            name: "Design".into(),
            description: None,
            status: None,
            assigned_to: "Sam".into(),
            start_date: date(2024, 3, 1),
            due_date: date(2024, 2, 1),
            completion_date: None,
            planned_hours: None,
            actual_hours: None,
            completion_percentage: None,
            is_milestone: None,
            is_critical_path: None,
        };
        assert_matches!(validate_new_task(&input), Err(CoreError::Validation(m)) if m.contains("due_date"));
    }

    #[test]
    fn negative_hours_are_rejected_on_update() {
        let input = UpdateTask {
            actual_hours: Some(dec!(-1)),
            ..Default::default()
        };
        assert_matches!(validate_task_update(&input), Err(CoreError::Validation(_)));
    }
}
