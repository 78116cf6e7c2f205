//! Activity log model.

use pmo_core::domain::ActivityAction;
use pmo_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `activity_logs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ActivityLog {
    pub id: DbId,
    pub user_id: DbId,
    #[sqlx(try_from = "String")]
    pub action: ActivityAction,
    pub model_name: String,
    pub object_id: Option<DbId>,
    pub description: String,
    pub ip_address: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for recording one activity.
#[derive(Debug, Clone)]
pub struct CreateActivityLog {
    pub user_id: DbId,
    pub action: ActivityAction,
    pub model_name: String,
    pub object_id: Option<DbId>,
    pub description: String,
    pub ip_address: Option<String>,
}
