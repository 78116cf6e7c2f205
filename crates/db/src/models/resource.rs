//! Resource (team member assignment) model and DTOs.

use pmo_core::domain::ResourceRole;
use pmo_core::types::{Date, DbId, Money, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A resource row from the `resources` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Resource {
    pub id: DbId,
    pub project_id: DbId,
    pub name: String,
    #[sqlx(try_from = "String")]
    pub role: ResourceRole,
    pub email: String,
    pub allocation_percentage: i32,
    pub hourly_rate: Money,
    pub start_date: Date,
    pub end_date: Option<Date>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new resource.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateResource {
    pub project_id: DbId,
    pub name: String,
    pub role: ResourceRole,
    pub email: String,
    /// Defaults to 100 if omitted.
    pub allocation_percentage: Option<i32>,
    pub hourly_rate: Option<Money>,
    pub start_date: Date,
    pub end_date: Option<Date>,
    pub is_active: Option<bool>,
}

/// DTO for updating an existing resource. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateResource {
    pub name: Option<String>,
    pub role: Option<ResourceRole>,
    pub email: Option<String>,
    pub allocation_percentage: Option<i32>,
    pub hourly_rate: Option<Money>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub is_active: Option<bool>,
}

/// Query parameters for the resource list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceFilter {
    pub project: Option<DbId>,
    pub role: Option<ResourceRole>,
    pub is_active: Option<bool>,
    pub ordering: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
