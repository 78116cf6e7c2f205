//! Task entity model and DTOs.

use pmo_core::domain::TaskStatus;
use pmo_core::metrics::TaskFigures;
use pmo_core::portfolio::PortfolioTask;
use pmo_core::types::{Date, DbId, Money, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A task row from the `tasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Task {
    pub id: DbId,
    pub project_id: DbId,
    pub name: String,
    pub description: String,
    #[sqlx(try_from = "String")]
    pub status: TaskStatus,
    pub assigned_to: String,
    pub start_date: Date,
    pub due_date: Date,
    pub completion_date: Option<Date>,
    pub planned_hours: Money,
    pub actual_hours: Money,
    pub completion_percentage: i32,
    pub is_milestone: bool,
    pub is_critical_path: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Task {
    pub fn figures(&self) -> TaskFigures {
        TaskFigures {
            status: self.status,
            due_date: Some(self.due_date),
        }
    }

    pub fn to_portfolio(&self) -> PortfolioTask {
        PortfolioTask {
            status: self.status,
            due_date: Some(self.due_date),
        }
    }
}

/// DTO for creating a new task.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTask {
    pub project_id: DbId,
    pub name: String,
    pub description: Option<String>,
    /// Defaults to `not_started` if omitted.
    pub status: Option<TaskStatus>,
    pub assigned_to: String,
    pub start_date: Date,
    pub due_date: Date,
    pub completion_date: Option<Date>,
    pub planned_hours: Option<Money>,
    pub actual_hours: Option<Money>,
    pub completion_percentage: Option<i32>,
    pub is_milestone: Option<bool>,
    pub is_critical_path: Option<bool>,
}

/// DTO for updating an existing task. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTask {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub assigned_to: Option<String>,
    pub start_date: Option<Date>,
    pub due_date: Option<Date>,
    pub completion_date: Option<Date>,
    pub planned_hours: Option<Money>,
    pub actual_hours: Option<Money>,
    pub completion_percentage: Option<i32>,
    pub is_milestone: Option<bool>,
    pub is_critical_path: Option<bool>,
}

/// Query parameters for the task list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskFilter {
    pub project: Option<DbId>,
    pub status: Option<TaskStatus>,
    pub assigned_to: Option<String>,
    pub is_milestone: Option<bool>,
    pub ordering: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
