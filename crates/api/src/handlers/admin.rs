//! Handlers for the `/admin` resource.
//!
//! All handlers require the `admin` role via [`RequireAdmin`].

use axum::extract::{Path, State};
use axum::Json;
use pmo_core::domain::ActivityAction;
use pmo_core::error::CoreError;
use pmo_core::roles;
use pmo_core::types::DbId;
use pmo_db::models::user::UserResponse;
use pmo_db::repositories::UserRepo;
use pmo_worker::snapshots::{self, CaptureSummary};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::portfolio::today;
use crate::state::AppState;

/// Request body for `PUT /admin/users/{id}/role`.
#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: String,
}

/// POST /api/v1/admin/snapshots
///
/// Capture today's snapshot for every project now instead of waiting for
/// the scheduled run.
pub async fn capture_snapshots(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> AppResult<Json<CaptureSummary>> {
    let summary =
        snapshots::capture_all(&state.pool, today(), state.config.high_risk_policy).await?;
    state.record(
        admin
            .activity(ActivityAction::Create)
            .with_model("snapshot")
            .with_description(format!(
                "Captured snapshots ({} created, {} updated)",
                summary.created, summary.updated
            )),
    );
    Ok(Json(summary))
}

/// PUT /api/v1/admin/users/{id}/role
pub async fn set_user_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<SetRoleRequest>,
) -> AppResult<Json<UserResponse>> {
    if !roles::is_valid_role(&input.role) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Unknown role '{}'",
            input.role
        ))));
    }

    let user = UserRepo::set_role(&state.pool, id, &input.role)
        .await?
        .ok_or_else(|| AppError::not_found("User", id))?;

    tracing::info!(user_id = id, role = %input.role, admin_id = admin.user_id, "User role changed");
    state.record(
        admin
            .activity(ActivityAction::Update)
            .with_object("user", id)
            .with_description(format!("Set role of {} to {}", user.username, input.role)),
    );
    Ok(Json(UserResponse::from(user)))
}
