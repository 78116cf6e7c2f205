//! Milestone entity model and DTOs.

use pmo_core::domain::MilestoneStatus;
use pmo_core::types::{Date, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A milestone row from the `milestones` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Milestone {
    pub id: DbId,
    pub project_id: DbId,
    pub name: String,
    pub description: String,
    pub planned_date: Date,
    pub actual_date: Option<Date>,
    #[sqlx(try_from = "String")]
    pub status: MilestoneStatus,
    pub deliverables: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new milestone.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMilestone {
    pub project_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub planned_date: Date,
    pub actual_date: Option<Date>,
    /// Defaults to `pending` if omitted.
    pub status: Option<MilestoneStatus>,
    pub deliverables: Option<String>,
}

/// DTO for updating an existing milestone. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMilestone {
    pub name: Option<String>,
    pub description: Option<String>,
    pub planned_date: Option<Date>,
    pub actual_date: Option<Date>,
    pub status: Option<MilestoneStatus>,
    pub deliverables: Option<String>,
}

/// Query parameters for the milestone list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MilestoneFilter {
    pub project: Option<DbId>,
    pub status: Option<MilestoneStatus>,
    pub ordering: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
