//! Repository for the `milestones` table.

use pmo_core::search::{
    clamp_limit, clamp_offset, resolve_ordering, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT,
    MILESTONE_DEFAULT_ORDERING, MILESTONE_ORDERING_FIELDS,
};
use pmo_core::types::DbId;
use sqlx::PgPool;

use crate::models::milestone::{CreateMilestone, Milestone, MilestoneFilter, UpdateMilestone};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, name, description, planned_date, actual_date, status, \
                        deliverables, created_at, updated_at";

/// Provides CRUD operations for milestones.
pub struct MilestoneRepo;

impl MilestoneRepo {
    /// Insert a new milestone, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateMilestone) -> Result<Milestone, sqlx::Error> {
        let query = format!(
            "INSERT INTO milestones (
                project_id, name, description, planned_date, actual_date, status, deliverables
             ) VALUES (
                $1, $2, COALESCE($3, ''), $4, $5, COALESCE($6, 'pending'), COALESCE($7, '')
             )
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Milestone>(&query)
            .bind(input.project_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.planned_date)
            .bind(input.actual_date)
            .bind(input.status.map(|s| s.as_str()))
            .bind(&input.deliverables)
            .fetch_one(pool)
            .await
    }

    /// Find a milestone by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Milestone>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM milestones WHERE id = $1");
        sqlx::query_as::<_, Milestone>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List milestones matching `filter`, earliest planned first unless ordered otherwise.
    pub async fn list(
        pool: &PgPool,
        filter: &MilestoneFilter,
    ) -> Result<Vec<Milestone>, sqlx::Error> {
        let limit = clamp_limit(filter.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
        let offset = clamp_offset(filter.offset);
        let ordering = resolve_ordering(
            filter.ordering.as_deref(),
            MILESTONE_ORDERING_FIELDS,
            MILESTONE_DEFAULT_ORDERING,
        );

        let mut conditions = Vec::new();
        let mut bind_idx = 1u32;

        if filter.project.is_some() {
            conditions.push(format!("project_id = ${bind_idx}"));
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
            "SELECT {COLUMNS} FROM milestones {where_clause} \
             ORDER BY {ordering} \
             LIMIT ${bind_idx} OFFSET ${next_idx}",
            next_idx = bind_idx + 1,
        );

        let mut q = sqlx::query_as::<_, Milestone>(&query);
        if let Some(project_id) = filter.project {
            q = q.bind(project_id);
        }
        if let Some(status) = filter.status {
            q = q.bind(status.as_str());
        }
        q = q.bind(limit).bind(offset);
        q.fetch_all(pool).await
    }

    /// Update a milestone. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateMilestone,
    ) -> Result<Option<Milestone>, sqlx::Error> {
        let query = format!(
            "UPDATE milestones SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                planned_date = COALESCE($4, planned_date),
                actual_date = COALESCE($5, actual_date),
                status = COALESCE($6, status),
                deliverables = COALESCE($7, deliverables)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Milestone>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.planned_date)
            .bind(input.actual_date)
            .bind(input.status.map(|s| s.as_str()))
            .bind(&input.deliverables)
            .fetch_optional(pool)
            .await
    }

    /// Delete a milestone by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM milestones WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
