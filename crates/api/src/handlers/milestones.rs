//! Handlers for the `/milestones` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use pmo_core::domain::ActivityAction;
use pmo_core::types::DbId;
use pmo_core::validation::validate_required;
use pmo_db::models::milestone::{CreateMilestone, Milestone, MilestoneFilter, UpdateMilestone};
use pmo_db::repositories::MilestoneRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireProjectEditor;
use crate::state::AppState;

/// POST /api/v1/milestones
pub async fn create(
    State(state): State<AppState>,
    RequireProjectEditor(user): RequireProjectEditor,
    Json(input): Json<CreateMilestone>,
) -> AppResult<(StatusCode, Json<Milestone>)> {
    validate_required(&input.name, "name")?;
    let milestone = MilestoneRepo::create(&state.pool, &input).await?;

    state.record(
        user.activity(ActivityAction::Create)
            .with_object("milestone", milestone.id)
            .with_description(format!("Created milestone '{}'", milestone.name)),
    );
    Ok((StatusCode::CREATED, Json(milestone)))
}

/// GET /api/v1/milestones?project=&status=&ordering=
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(filter): Query<MilestoneFilter>,
) -> AppResult<Json<Vec<Milestone>>> {
    let milestones = MilestoneRepo::list(&state.pool, &filter).await?;
    Ok(Json(milestones))
}

/// GET /api/v1/milestones/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Milestone>> {
    let milestone = MilestoneRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Milestone", id))?;
    Ok(Json(milestone))
}

/// PUT /api/v1/milestones/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireProjectEditor(user): RequireProjectEditor,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateMilestone>,
) -> AppResult<Json<Milestone>> {
    if let Some(name) = &input.name {
        validate_required(name, "name")?;
    }
    let milestone = MilestoneRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("Milestone", id))?;

    state.record(
        user.activity(ActivityAction::Update)
            .with_object("milestone", milestone.id),
    );
    Ok(Json(milestone))
}

/// DELETE /api/v1/milestones/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireProjectEditor(user): RequireProjectEditor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !MilestoneRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Milestone", id));
    }
    state.record(user.activity(ActivityAction::Delete).with_object("milestone", id));
    Ok(StatusCode::NO_CONTENT)
}
