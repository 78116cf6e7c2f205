//! CSV exports, the combined ZIP archive and project CSV import.

use std::io::{Cursor, Write};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use pmo_core::csv::{
    self, ImportRowError, ProjectCsvRow, ResourceCsvRow, RiskCsvRow, TaskCsvRow, ARCHIVE_FILE,
    PROJECTS_FILE, RESOURCES_FILE, RISKS_FILE, TASKS_FILE,
};
use pmo_core::domain::ActivityAction;
use pmo_db::repositories::{ProjectRepo, ResourceRepo, RiskRepo, TaskRepo};
use pmo_db::DbPool;
use serde::Serialize;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireProjectEditor;
use crate::state::AppState;

/// Result of `POST /import/projects.csv`.
#[derive(Debug, Serialize)]
pub struct ImportSummary {
    pub updated: usize,
    /// Rows whose `project_id` matched no stored project.
    pub skipped: usize,
    pub errors: Vec<ImportRowError>,
}

fn attachment(content_type: &'static str, filename: &str, body: Vec<u8>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
}

// ---------------------------------------------------------------------------
// CSV builders over the stored rows
// ---------------------------------------------------------------------------

async fn projects_csv(pool: &DbPool) -> Result<String, sqlx::Error> {
    let rows: Vec<ProjectCsvRow> = ProjectRepo::list_all(pool)
        .await?
        .into_iter()
        .map(|p| ProjectCsvRow {
            id: p.id,
            name: p.name,
            start_date: Some(p.start_date),
            planned_end_date: Some(p.planned_end_date),
            actual_end_date: p.actual_end_date,
            budget: p.budget,
            status: p.status,
        })
        .collect();
    Ok(csv::build_projects_csv(&rows))
}

async fn tasks_csv(pool: &DbPool) -> Result<String, sqlx::Error> {
    let rows: Vec<TaskCsvRow> = TaskRepo::list_all(pool)
        .await?
        .into_iter()
        .map(|t| TaskCsvRow {
            id: t.id,
            project_id: t.project_id,
            name: t.name,
            start_date: Some(t.start_date),
            due_date: Some(t.due_date),
            completion_date: t.completion_date,
            completion_percentage: t.completion_percentage,
        })
        .collect();
    Ok(csv::build_tasks_csv(&rows))
}

async fn risks_csv(pool: &DbPool) -> Result<String, sqlx::Error> {
    let rows: Vec<RiskCsvRow> = RiskRepo::list_all_with_project(pool)
        .await?
        .into_iter()
        .map(|r| RiskCsvRow {
            id: r.risk.id,
            project_id: r.risk.project_id,
            category: r.risk.category,
            severity: r.risk.severity,
            description: r.risk.description,
        })
        .collect();
    Ok(csv::build_risks_csv(&rows))
}

async fn resources_csv(pool: &DbPool) -> Result<String, sqlx::Error> {
    let rows: Vec<ResourceCsvRow> = ResourceRepo::list_active(pool)
        .await?
        .into_iter()
        .map(|r| ResourceCsvRow {
            id: r.id,
            name: r.name,
            role: r.role,
            allocation_percentage: r.allocation_percentage,
        })
        .collect();
    Ok(csv::build_resources_csv(&rows))
}

/// Pack named files into an in-memory deflated ZIP archive.
pub fn build_archive(files: &[(&str, &str)]) -> Result<Vec<u8>, zip::result::ZipError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, contents) in files {
        writer.start_file(*name, options)?;
        writer.write_all(contents.as_bytes())?;
    }
    Ok(writer.finish()?.into_inner())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/export/projects.csv
pub async fn export_projects(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let body = projects_csv(&state.pool).await?;
    record_export(&state, &user, PROJECTS_FILE);
    Ok(attachment("text/csv", PROJECTS_FILE, body.into_bytes()))
}

/// GET /api/v1/export/tasks.csv
pub async fn export_tasks(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let body = tasks_csv(&state.pool).await?;
    record_export(&state, &user, TASKS_FILE);
    Ok(attachment("text/csv", TASKS_FILE, body.into_bytes()))
}

/// GET /api/v1/export/risks.csv
pub async fn export_risks(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let body = risks_csv(&state.pool).await?;
    record_export(&state, &user, RISKS_FILE);
    Ok(attachment("text/csv", RISKS_FILE, body.into_bytes()))
}

/// GET /api/v1/export/resources.csv
///
/// Active resources only.
pub async fn export_resources(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let body = resources_csv(&state.pool).await?;
    record_export(&state, &user, RESOURCES_FILE);
    Ok(attachment("text/csv", RESOURCES_FILE, body.into_bytes()))
}

/// GET /api/v1/export/all.zip
///
/// The four CSV files in one archive.
pub async fn export_all(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let projects = projects_csv(&state.pool).await?;
    let tasks = tasks_csv(&state.pool).await?;
    let risks = risks_csv(&state.pool).await?;
    let resources = resources_csv(&state.pool).await?;

    let archive = build_archive(&[
        (PROJECTS_FILE, &projects),
        (TASKS_FILE, &tasks),
        (RISKS_FILE, &risks),
        (RESOURCES_FILE, &resources),
    ])
    .map_err(|e| AppError::InternalError(format!("Failed to build export archive: {e}")))?;

    record_export(&state, &user, ARCHIVE_FILE);
    Ok(attachment("application/zip", ARCHIVE_FILE, archive))
}

/// POST /api/v1/import/projects.csv
///
/// The request body is the CSV file. Rows update existing projects by
/// `project_id`; unknown ids are skipped and unreadable rows reported.
pub async fn import_projects(
    State(state): State<AppState>,
    RequireProjectEditor(user): RequireProjectEditor,
    body: Bytes,
) -> AppResult<Json<ImportSummary>> {
    let parsed = csv::parse_projects_csv(&body)
        .map_err(|e| AppError::BadRequest(format!("CSV parse error: {e}")))?;

    let mut updated = 0usize;
    let mut skipped = 0usize;
    for row in &parsed.rows {
        match ProjectRepo::update_from_import(&state.pool, row).await? {
            Some(_) => updated += 1,
            None => {
                tracing::debug!(line = row.line, project_id = row.project_id, "Import row skipped");
                skipped += 1;
            }
        }
    }

    tracing::info!(updated, skipped, errors = parsed.errors.len(), "Project CSV imported");
    state.record(
        user.activity(ActivityAction::Update)
            .with_model("project")
            .with_description(format!("Imported {updated} projects from CSV")),
    );

    Ok(Json(ImportSummary {
        updated,
        skipped,
        errors: parsed.errors,
    }))
}

fn record_export(state: &AppState, user: &AuthUser, filename: &str) {
    state.record(
        user.activity(ActivityAction::Export)
            .with_description(format!("Exported {filename}")),
    );
}
