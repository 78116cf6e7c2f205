//! Issue entity model and DTOs.

use pmo_core::domain::{IssueCategory, IssueStatus, Severity};
use pmo_core::types::{Date, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An issue row from the `issues` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Issue {
    pub id: DbId,
    pub project_id: DbId,
    pub title: String,
    pub description: String,
    #[sqlx(try_from = "String")]
    pub category: IssueCategory,
    #[sqlx(try_from = "String")]
    pub severity: Severity,
    #[sqlx(try_from = "String")]
    pub status: IssueStatus,
    pub reported_by: String,
    pub assigned_to: String,
    pub reported_date: Date,
    pub resolved_date: Option<Date>,
    pub resolution: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Issue totals for one project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow, Serialize)]
pub struct IssueCounts {
    pub total: i64,
    /// Issues in `open` status; `in_progress` ones are not counted.
    pub open: i64,
}

/// DTO for creating a new issue.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateIssue {
    pub project_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub category: IssueCategory,
    pub severity: Severity,
    /// Defaults to `open` if omitted.
    pub status: Option<IssueStatus>,
    pub reported_by: String,
    pub assigned_to: Option<String>,
    /// Defaults to the current date if omitted.
    pub reported_date: Option<Date>,
    pub resolved_date: Option<Date>,
    pub resolution: Option<String>,
}

/// DTO for updating an existing issue. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateIssue {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<IssueCategory>,
    pub severity: Option<Severity>,
    pub status: Option<IssueStatus>,
    pub reported_by: Option<String>,
    pub assigned_to: Option<String>,
    pub reported_date: Option<Date>,
    pub resolved_date: Option<Date>,
    pub resolution: Option<String>,
}

/// Query parameters for the issue list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueFilter {
    pub project: Option<DbId>,
    pub severity: Option<Severity>,
    pub status: Option<IssueStatus>,
    pub ordering: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
