//! Repository for the `resources` table.

use pmo_core::search::{
    clamp_limit, clamp_offset, resolve_ordering, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT,
    RESOURCE_DEFAULT_ORDERING, RESOURCE_ORDERING_FIELDS,
};
use pmo_core::types::DbId;
use sqlx::PgPool;

use crate::models::resource::{CreateResource, Resource, ResourceFilter, UpdateResource};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, name, role, email, allocation_percentage, hourly_rate, \
                        start_date, end_date, is_active, created_at, updated_at";

/// Provides CRUD operations for resources.
pub struct ResourceRepo;

impl ResourceRepo {
    /// Insert a new resource, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateResource) -> Result<Resource, sqlx::Error> {
        let query = format!(
            "INSERT INTO resources (
                project_id, name, role, email, allocation_percentage, hourly_rate,
                start_date, end_date, is_active
             ) VALUES (
                $1, $2, $3, $4, COALESCE($5, 100), COALESCE($6, 0), $7, $8, COALESCE($9, true)
             )
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Resource>(&query)
            .bind(input.project_id)
            .bind(&input.name)
            .bind(input.role.as_str())
            .bind(&input.email)
            .bind(input.allocation_percentage)
            .bind(input.hourly_rate)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    /// Find a resource by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Resource>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM resources WHERE id = $1");
        sqlx::query_as::<_, Resource>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List resources matching `filter`, by name unless ordered otherwise.
    pub async fn list(
        pool: &PgPool,
        filter: &ResourceFilter,
    ) -> Result<Vec<Resource>, sqlx::Error> {
        let limit = clamp_limit(filter.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
        let offset = clamp_offset(filter.offset);
        let ordering = resolve_ordering(
            filter.ordering.as_deref(),
            RESOURCE_ORDERING_FIELDS,
            RESOURCE_DEFAULT_ORDERING,
        );

        let mut conditions = Vec::new();
        let mut bind_idx = 1u32;

        if filter.project.is_some() {
            conditions.push(format!("project_id = ${bind_idx}"));
            bind_idx += 1;
        }
        if filter.role.is_some() {
            conditions.push(format!("role = ${bind_idx}"));
            bind_idx += 1;
        }
        if filter.is_active.is_some() {
            conditions.push(format!("is_active = ${bind_idx}"));
            bind_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {COLUMNS} FROM resources {where_clause} \
             ORDER BY {ordering} \
             LIMIT ${bind_idx} OFFSET ${next_idx}",
            next_idx = bind_idx + 1,
        );

        let mut q = sqlx::query_as::<_, Resource>(&query);
        if let Some(project_id) = filter.project {
            q = q.bind(project_id);
        }
        if let Some(role) = filter.role {
            q = q.bind(role.as_str());
        }
        if let Some(is_active) = filter.is_active {
            q = q.bind(is_active);
        }
        q = q.bind(limit).bind(offset);
        q.fetch_all(pool).await
    }

    /// Active resources of one project.
    pub async fn list_active_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<Resource>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM resources \
             WHERE project_id = $1 AND is_active = true ORDER BY name, id"
        );
        sqlx::query_as::<_, Resource>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Every active resource across the portfolio, in id order.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Resource>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM resources WHERE is_active = true ORDER BY id");
        sqlx::query_as::<_, Resource>(&query).fetch_all(pool).await
    }

    /// Update a resource. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateResource,
    ) -> Result<Option<Resource>, sqlx::Error> {
        let query = format!(
            "UPDATE resources SET
                name = COALESCE($2, name),
                role = COALESCE($3, role),
                email = COALESCE($4, email),
                allocation_percentage = COALESCE($5, allocation_percentage),
                hourly_rate = COALESCE($6, hourly_rate),
                start_date = COALESCE($7, start_date),
                end_date = COALESCE($8, end_date),
                is_active = COALESCE($9, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Resource>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.role.map(|r| r.as_str()))
            .bind(&input.email)
            .bind(input.allocation_percentage)
            .bind(input.hourly_rate)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Delete a resource by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM resources WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
