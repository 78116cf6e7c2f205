//! Repository for the `projects` table.

use pmo_core::csv::ProjectImportRow;
use pmo_core::search::{
    clamp_limit, clamp_offset, like_pattern, resolve_ordering, DEFAULT_LIST_LIMIT,
    MAX_LIST_LIMIT, PROJECT_DEFAULT_ORDERING, PROJECT_ORDERING_FIELDS,
};
use pmo_core::types::DbId;
use sqlx::PgPool;

use crate::models::project::{CreateProject, Project, ProjectFilter, UpdateProject};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, code, description, status, priority, start_date, \
                        planned_end_date, actual_end_date, budget, spent, completion_percentage, \
                        spi, cpi, project_manager, sponsor, team_size, created_at, updated_at";

/// Provides CRUD operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project, returning the created row.
    ///
    /// Omitted optional fields fall back to the column defaults.
    pub async fn create(pool: &PgPool, input: &CreateProject) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (
                name, code, description, status, priority, start_date, planned_end_date,
                actual_end_date, budget, spent, completion_percentage, spi, cpi,
                project_manager, sponsor, team_size
             ) VALUES (
                $1, $2, COALESCE($3, ''), COALESCE($4, 'on_track'), COALESCE($5, 'medium'),
                $6, $7, $8, COALESCE($9, 0), COALESCE($10, 0), COALESCE($11, 0),
                COALESCE($12, 1.00), COALESCE($13, 1.00), $14, COALESCE($15, ''),
                COALESCE($16, 0)
             )
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(&input.name)
            .bind(&input.code)
            .bind(&input.description)
            .bind(input.status.map(|s| s.as_str()))
            .bind(input.priority.map(|p| p.as_str()))
            .bind(input.start_date)
            .bind(input.planned_end_date)
            .bind(input.actual_end_date)
            .bind(input.budget)
            .bind(input.spent)
            .bind(input.completion_percentage)
            .bind(input.spi)
            .bind(input.cpi)
            .bind(&input.project_manager)
            .bind(&input.sponsor)
            .bind(input.team_size)
            .fetch_one(pool)
            .await
    }

    /// Find a project by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List projects matching `filter`, paginated.
    pub async fn list(pool: &PgPool, filter: &ProjectFilter) -> Result<Vec<Project>, sqlx::Error> {
        let limit = clamp_limit(filter.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
        let offset = clamp_offset(filter.offset);
        let ordering = resolve_ordering(
            filter.ordering.as_deref(),
            PROJECT_ORDERING_FIELDS,
            PROJECT_DEFAULT_ORDERING,
        );

        let mut conditions = Vec::new();
        let mut bind_idx = 1u32;

        if filter.status.is_some() {
            conditions.push(format!("status = ${bind_idx}"));
            bind_idx += 1;
        }
        if filter.priority.is_some() {
            conditions.push(format!("priority = ${bind_idx}"));
            bind_idx += 1;
        }
        if filter.project_manager.is_some() {
            conditions.push(format!("project_manager ILIKE ${bind_idx}"));
            bind_idx += 1;
        }
        if filter.search.is_some() {
            conditions.push(format!(
                "(name ILIKE ${bind_idx} OR code ILIKE ${bind_idx} OR description ILIKE ${bind_idx})"
            ));
            bind_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {COLUMNS} FROM projects {where_clause} \
             ORDER BY {ordering} \
             LIMIT ${bind_idx} OFFSET ${next_idx}",
            next_idx = bind_idx + 1,
        );

        let mut q = sqlx::query_as::<_, Project>(&query);
        if let Some(status) = filter.status {
            q = q.bind(status.as_str());
        }
        if let Some(priority) = filter.priority {
            q = q.bind(priority.as_str());
        }
        if let Some(ref manager) = filter.project_manager {
            q = q.bind(like_pattern(manager));
        }
        if let Some(ref search) = filter.search {
            q = q.bind(like_pattern(search));
        }
        q = q.bind(limit).bind(offset);
        q.fetch_all(pool).await
    }

    /// All projects, newest first. Used by dashboards, reports and exports.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects ORDER BY created_at DESC, id ASC");
        sqlx::query_as::<_, Project>(&query).fetch_all(pool).await
    }

    /// Fetch the given projects, in id order. Unknown ids are ignored.
    pub async fn list_by_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = ANY($1) ORDER BY id");
        sqlx::query_as::<_, Project>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Update a project. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProject,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                name = COALESCE($2, name),
                code = COALESCE($3, code),
                description = COALESCE($4, description),
                status = COALESCE($5, status),
                priority = COALESCE($6, priority),
                start_date = COALESCE($7, start_date),
                planned_end_date = COALESCE($8, planned_end_date),
                actual_end_date = COALESCE($9, actual_end_date),
                budget = COALESCE($10, budget),
                spent = COALESCE($11, spent),
                completion_percentage = COALESCE($12, completion_percentage),
                spi = COALESCE($13, spi),
                cpi = COALESCE($14, cpi),
                project_manager = COALESCE($15, project_manager),
                sponsor = COALESCE($16, sponsor),
                team_size = COALESCE($17, team_size)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.code)
            .bind(&input.description)
            .bind(input.status.map(|s| s.as_str()))
            .bind(input.priority.map(|p| p.as_str()))
            .bind(input.start_date)
            .bind(input.planned_end_date)
            .bind(input.actual_end_date)
            .bind(input.budget)
            .bind(input.spent)
            .bind(input.completion_percentage)
            .bind(input.spi)
            .bind(input.cpi)
            .bind(&input.project_manager)
            .bind(&input.sponsor)
            .bind(input.team_size)
            .fetch_optional(pool)
            .await
    }

    /// Apply one imported CSV row. Returns `None` when the project does not exist.
    pub async fn update_from_import(
        pool: &PgPool,
        row: &ProjectImportRow,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                name = COALESCE($2, name),
                start_date = COALESCE($3, start_date),
                budget = COALESCE($4, budget),
                status = COALESCE($5, status)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(row.project_id)
            .bind(&row.name)
            .bind(row.start_date)
            .bind(row.budget)
            .bind(row.status.map(|s| s.as_str()))
            .fetch_optional(pool)
            .await
    }

    /// Delete a project and, through the foreign keys, all of its children.
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
