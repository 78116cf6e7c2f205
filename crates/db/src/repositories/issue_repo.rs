//! Repository for the `issues` table.

use pmo_core::search::{
    clamp_limit, clamp_offset, resolve_ordering, DEFAULT_LIST_LIMIT, ISSUE_DEFAULT_ORDERING,
    ISSUE_ORDERING_FIELDS, MAX_LIST_LIMIT,
};
use pmo_core::types::DbId;
use sqlx::PgPool;

use crate::models::issue::{CreateIssue, Issue, IssueCounts, IssueFilter, UpdateIssue};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, title, description, category, severity, status, \
                        reported_by, assigned_to, reported_date, resolved_date, resolution, \
                        created_at, updated_at";

/// Provides CRUD operations for issues.
pub struct IssueRepo;

impl IssueRepo {
    /// Insert a new issue, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateIssue) -> Result<Issue, sqlx::Error> {
        let query = format!(
            "INSERT INTO issues (
                project_id, title, description, category, severity, status, reported_by,
                assigned_to, reported_date, resolved_date, resolution
             ) VALUES (
                $1, $2, COALESCE($3, ''), $4, $5, COALESCE($6, 'open'), $7,
                COALESCE($8, ''), COALESCE($9, CURRENT_DATE), $10, COALESCE($11, '')
             )
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Issue>(&query)
            .bind(input.project_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.category.as_str())
            .bind(input.severity.as_str())
            .bind(input.status.map(|s| s.as_str()))
            .bind(&input.reported_by)
            .bind(&input.assigned_to)
            .bind(input.reported_date)
            .bind(input.resolved_date)
            .bind(&input.resolution)
            .fetch_one(pool)
            .await
    }

    /// Find an issue by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Issue>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM issues WHERE id = $1");
        sqlx::query_as::<_, Issue>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List issues matching `filter`, most recently reported first unless ordered otherwise.
    pub async fn list(pool: &PgPool, filter: &IssueFilter) -> Result<Vec<Issue>, sqlx::Error> {
        let limit = clamp_limit(filter.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
        let offset = clamp_offset(filter.offset);
        let ordering = resolve_ordering(
            filter.ordering.as_deref(),
            ISSUE_ORDERING_FIELDS,
            ISSUE_DEFAULT_ORDERING,
        );

        let mut conditions = Vec::new();
        let mut bind_idx = 1u32;

        if filter.project.is_some() {
            conditions.push(format!("project_id = ${bind_idx}"));
            bind_idx += 1;
        }
        if filter.severity.is_some() {
            conditions.push(format!("severity = ${bind_idx}"));
            bind_idx += 1;
        }
        if filter.status.is_some() {
            conditions.push(format!("status = ${bind_idx}"));
            bind_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {COLUMNS} FROM issues {where_clause} \
             ORDER BY {ordering} \
             LIMIT ${bind_idx} OFFSET ${next_idx}",
            next_idx = bind_idx + 1,
        );

        let mut q = sqlx::query_as::<_, Issue>(&query);
        if let Some(project_id) = filter.project {
            q = q.bind(project_id);
        }
        if let Some(severity) = filter.severity {
            q = q.bind(severity.as_str());
        }
        if let Some(status) = filter.status {
            q = q.bind(status.as_str());
        }
        q = q.bind(limit).bind(offset);
        q.fetch_all(pool).await
    }

    /// Total issues and those still in `open` status for one project.
    pub async fn counts_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<IssueCounts, sqlx::Error> {
        sqlx::query_as::<_, IssueCounts>(
            "SELECT COUNT(*) AS total, \
                    COUNT(*) FILTER (WHERE status = 'open') AS open \
             FROM issues WHERE project_id = $1",
        )
        .bind(project_id)
        .fetch_one(pool)
        .await
    }

    /// Update an issue. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateIssue,
    ) -> Result<Option<Issue>, sqlx::Error> {
        let query = format!(
            "UPDATE issues SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                category = COALESCE($4, category),
                severity = COALESCE($5, severity),
                status = COALESCE($6, status),
                reported_by = COALESCE($7, reported_by),
                assigned_to = COALESCE($8, assigned_to),
                reported_date = COALESCE($9, reported_date),
                resolved_date = COALESCE($10, resolved_date),
                resolution = COALESCE($11, resolution)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Issue>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.category.map(|c| c.as_str()))
            .bind(input.severity.map(|s| s.as_str()))
            .bind(input.status.map(|s| s.as_str()))
            .bind(&input.reported_by)
            .bind(&input.assigned_to)
            .bind(input.reported_date)
            .bind(input.resolved_date)
            .bind(&input.resolution)
            .fetch_optional(pool)
            .await
    }

    /// Delete an issue by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM issues WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
