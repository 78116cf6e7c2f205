//! Handlers for the `/risks` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use pmo_core::domain::ActivityAction;
use pmo_core::error::CoreError;
use pmo_core::metrics;
use pmo_core::types::{DbId, Money};
use pmo_core::validation::{
    validate_date_order, validate_impact, validate_probability, validate_required,
};
use pmo_db::models::risk::{CreateRisk, Risk, RiskFilter, UpdateRisk};
use pmo_db::repositories::RiskRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireProjectEditor;
use crate::state::AppState;

/// A risk with its derived score.
#[derive(Debug, Serialize)]
pub struct RiskView {
    #[serde(flatten)]
    pub risk: Risk,
    pub risk_score: Money,
}

impl From<Risk> for RiskView {
    fn from(risk: Risk) -> Self {
        Self {
            risk_score: metrics::risk_score(risk.probability, risk.impact),
            risk,
        }
    }
}

fn validate_new_risk(input: &CreateRisk) -> Result<(), CoreError> {
    validate_required(&input.title, "title")?;
    validate_required(&input.owner, "owner")?;
    validate_probability(input.probability)?;
    validate_impact(input.impact)?;
    validate_date_order(
        input.identified_date,
        input.target_closure_date,
        "identified_date",
        "target_closure_date",
    )
}

fn validate_risk_update(input: &UpdateRisk) -> Result<(), CoreError> {
    if let Some(title) = &input.title {
        validate_required(title, "title")?;
    }
    if let Some(probability) = input.probability {
        validate_probability(probability)?;
    }
    if let Some(impact) = input.impact {
        validate_impact(impact)?;
    }
    Ok(())
}

/// POST /api/v1/risks
pub async fn create(
    State(state): State<AppState>,
    RequireProjectEditor(user): RequireProjectEditor,
    Json(input): Json<CreateRisk>,
) -> AppResult<(StatusCode, Json<RiskView>)> {
    validate_new_risk(&input)?;
    let risk = RiskRepo::create(&state.pool, &input).await?;

    tracing::info!(risk_id = risk.id, project_id = risk.project_id, "Risk created");
    state.record(
        user.activity(ActivityAction::Create)
            .with_object("risk", risk.id)
            .with_description(format!("Created risk '{}'", risk.title)),
    );
    Ok((StatusCode::CREATED, Json(risk.into())))
}

/// GET /api/v1/risks?project=&category=&severity=&status=&ordering=
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(filter): Query<RiskFilter>,
) -> AppResult<Json<Vec<RiskView>>> {
    let risks = RiskRepo::list(&state.pool, &filter).await?;
    Ok(Json(risks.into_iter().map(RiskView::from).collect()))
}

/// GET /api/v1/risks/high-priority
///
/// Open or mitigating risks of severity `high` or `critical`.
pub async fn high_priority(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<Vec<RiskView>>> {
    let risks = RiskRepo::list_high_priority(&state.pool).await?;
    Ok(Json(risks.into_iter().map(RiskView::from).collect()))
}

/// GET /api/v1/risks/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<RiskView>> {
    let risk = RiskRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Risk", id))?;
    Ok(Json(risk.into()))
}

/// PUT /api/v1/risks/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireProjectEditor(user): RequireProjectEditor,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateRisk>,
) -> AppResult<Json<RiskView>> {
    validate_risk_update(&input)?;
    let risk = RiskRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("Risk", id))?;

    state.record(
        user.activity(ActivityAction::Update)
            .with_object("risk", risk.id)
            .with_description(format!("Updated risk '{}'", risk.title)),
    );
    Ok(Json(risk.into()))
}

/// DELETE /api/v1/risks/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireProjectEditor(user): RequireProjectEditor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !RiskRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Risk", id));
    }
    state.record(user.activity(ActivityAction::Delete).with_object("risk", id));
    Ok(StatusCode::NO_CONTENT)
}
