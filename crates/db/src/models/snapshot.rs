//! Daily project snapshot model.

use pmo_core::domain::ProjectStatus;
use pmo_core::types::{Date, DbId, Money, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `project_snapshots` table. One per project per date.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectSnapshot {
    pub id: DbId,
    pub project_id: DbId,
    pub snapshot_date: Date,
    #[sqlx(try_from = "String")]
    pub status: ProjectStatus,
    pub completion_percentage: i32,
    pub budget: Money,
    pub spent: Money,
    pub spi: Money,
    pub cpi: Money,
    pub health_score: i32,
    pub total_tasks: i32,
    pub completed_tasks: i32,
    pub total_risks: i32,
    pub high_risks: i32,
    pub total_issues: i32,
    pub open_issues: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Result of an upsert: the stored row and whether it was newly inserted.
#[derive(Debug, Clone, FromRow)]
pub struct UpsertedSnapshot {
    #[sqlx(flatten)]
    pub snapshot: ProjectSnapshot,
    pub inserted: bool,
}

/// Values captured for one project on one date.
#[derive(Debug, Clone)]
pub struct NewSnapshot {
    pub project_id: DbId,
    pub snapshot_date: Date,
    pub status: ProjectStatus,
    pub completion_percentage: i32,
    pub budget: Money,
    pub spent: Money,
    pub spi: Money,
    pub cpi: Money,
    pub health_score: i32,
    pub total_tasks: i32,
    pub completed_tasks: i32,
    pub total_risks: i32,
    pub high_risks: i32,
    pub total_issues: i32,
    pub open_issues: i32,
}
