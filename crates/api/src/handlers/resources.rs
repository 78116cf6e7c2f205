//! Handlers for the `/resources` resource (people allocated to projects).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use pmo_core::domain::ActivityAction;
use pmo_core::error::CoreError;
use pmo_core::types::DbId;
use pmo_core::validation::{
    validate_date_order, validate_email, validate_non_negative, validate_percentage,
    validate_required,
};
use pmo_db::models::resource::{CreateResource, Resource, ResourceFilter, UpdateResource};
use pmo_db::repositories::ResourceRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireProjectEditor;
use crate::state::AppState;

fn validate_new_resource(input: &CreateResource) -> Result<(), CoreError> {
    validate_required(&input.name, "name")?;
    validate_email(&input.email)?;
    if let Some(pct) = input.allocation_percentage {
        validate_percentage(pct, "allocation_percentage")?;
    }
    if let Some(rate) = input.hourly_rate {
        validate_non_negative(rate, "hourly_rate")?;
    }
    validate_date_order(Some(input.start_date), input.end_date, "start_date", "end_date")
}

fn validate_resource_update(input: &UpdateResource) -> Result<(), CoreError> {
    if let Some(name) = &input.name {
        validate_required(name, "name")?;
    }
    if let Some(email) = &input.email {
        validate_email(email)?;
    }
    if let Some(pct) = input.allocation_percentage {
        validate_percentage(pct, "allocation_percentage")?;
    }
    if let Some(rate) = input.hourly_rate {
        validate_non_negative(rate, "hourly_rate")?;
    }
    validate_date_order(input.start_date, input.end_date, "start_date", "end_date")
}

/// POST /api/v1/resources
pub async fn create(
    State(state): State<AppState>,
    RequireProjectEditor(user): RequireProjectEditor,
    Json(input): Json<CreateResource>,
) -> AppResult<(StatusCode, Json<Resource>)> {
    validate_new_resource(&input)?;
    let resource = ResourceRepo::create(&state.pool, &input).await?;

    state.record(
        user.activity(ActivityAction::Create)
            .with_object("resource", resource.id)
            .with_description(format!("Allocated {} to project", resource.name)),
    );
    Ok((StatusCode::CREATED, Json(resource)))
}

/// GET /api/v1/resources?project=&role=&is_active=&ordering=
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(filter): Query<ResourceFilter>,
) -> AppResult<Json<Vec<Resource>>> {
    let resources = ResourceRepo::list(&state.pool, &filter).await?;
    Ok(Json(resources))
}

/// GET /api/v1/resources/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Resource>> {
    let resource = ResourceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Resource", id))?;
    Ok(Json(resource))
}

/// PUT /api/v1/resources/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireProjectEditor(user): RequireProjectEditor,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateResource>,
) -> AppResult<Json<Resource>> {
    validate_resource_update(&input)?;
    let resource = ResourceRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("Resource", id))?;

    state.record(
        user.activity(ActivityAction::Update)
            .with_object("resource", resource.id),
    );
    Ok(Json(resource))
}

/// DELETE /api/v1/resources/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireProjectEditor(user): RequireProjectEditor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !ResourceRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Resource", id));
    }
    state.record(user.activity(ActivityAction::Delete).with_object("resource", id));
    Ok(StatusCode::NO_CONTENT)
}
