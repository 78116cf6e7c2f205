//! Repository for the `risks` table.

use pmo_core::search::{
    clamp_limit, clamp_offset, resolve_ordering, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT,
    RISK_DEFAULT_ORDERING, RISK_ORDERING_FIELDS,
};
use pmo_core::types::DbId;
use sqlx::PgPool;

use crate::models::risk::{CreateRisk, Risk, RiskFilter, RiskWithProject, UpdateRisk};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, title, description, category, severity, status, \
                        probability, impact, mitigation_plan, owner, identified_date, \
                        target_closure_date, actual_closure_date, created_at, updated_at";

/// Same columns qualified with the `r` alias, for joins.
const JOINED_COLUMNS: &str = "r.id, r.project_id, r.title, r.description, r.category, \
                               r.severity, r.status, r.probability, r.impact, \
                               r.mitigation_plan, r.owner, r.identified_date, \
                               r.target_closure_date, r.actual_closure_date, \
                               r.created_at, r.updated_at, \
                               p.code AS project_code, p.name AS project_name";

/// Provides CRUD operations for risks.
pub struct RiskRepo;

impl RiskRepo {
    /// Insert a new risk, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateRisk) -> Result<Risk, sqlx::Error> {
        let query = format!(
            "INSERT INTO risks (
                project_id, title, description, category, severity, status, probability,
                impact, mitigation_plan, owner, identified_date, target_closure_date,
                actual_closure_date
             ) VALUES (
                $1, $2, COALESCE($3, ''), $4, $5, COALESCE($6, 'open'), $7, $8,
                COALESCE($9, ''), $10, COALESCE($11, CURRENT_DATE), $12, $13
             )
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Risk>(&query)
            .bind(input.project_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.category.as_str())
            .bind(input.severity.as_str())
            .bind(input.status.map(|s| s.as_str()))
            .bind(input.probability)
            .bind(input.impact)
            .bind(&input.mitigation_plan)
            .bind(&input.owner)
            .bind(input.identified_date)
            .bind(input.target_closure_date)
            .bind(input.actual_closure_date)
            .fetch_one(pool)
            .await
    }

    /// Find a risk by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Risk>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM risks WHERE id = $1");
        sqlx::query_as::<_, Risk>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a risk together with its project's code and name.
    pub async fn find_with_project(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<RiskWithProject>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} FROM risks r \
             JOIN projects p ON p.id = r.project_id \
             WHERE r.id = $1"
        );
        sqlx::query_as::<_, RiskWithProject>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List risks matching `filter`, most severe first unless ordered otherwise.
    pub async fn list(pool: &PgPool, filter: &RiskFilter) -> Result<Vec<Risk>, sqlx::Error> {
        let limit = clamp_limit(filter.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
        let offset = clamp_offset(filter.offset);
        let ordering = resolve_ordering(
            filter.ordering.as_deref(),
            RISK_ORDERING_FIELDS,
            RISK_DEFAULT_ORDERING,
        );

        let mut conditions = Vec::new();
        let mut bind_idx = 1u32;

        if filter.project.is_some() {
            conditions.push(format!("project_id = ${bind_idx}"));
            bind_idx += 1;
        }
        if filter.category.is_some() {
            conditions.push(format!("category = ${bind_idx}"));
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
            "SELECT {COLUMNS} FROM risks {where_clause} \
             ORDER BY {ordering} \
             LIMIT ${bind_idx} OFFSET ${next_idx}",
            next_idx = bind_idx + 1,
        );

        let mut q = sqlx::query_as::<_, Risk>(&query);
        if let Some(project_id) = filter.project {
            q = q.bind(project_id);
        }
        if let Some(category) = filter.category {
            q = q.bind(category.as_str());
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

    /// Open or mitigating risks rated high or critical.
    pub async fn list_high_priority(pool: &PgPool) -> Result<Vec<Risk>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM risks \
             WHERE severity IN ('high', 'critical') AND status <> 'closed' \
             ORDER BY {RISK_DEFAULT_ORDERING}, id ASC"
        );
        sqlx::query_as::<_, Risk>(&query).fetch_all(pool).await
    }

    /// All risks of one project.
    pub async fn list_by_project(pool: &PgPool, project_id: DbId) -> Result<Vec<Risk>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM risks WHERE project_id = $1 \
             ORDER BY {RISK_DEFAULT_ORDERING}, id ASC"
        );
        sqlx::query_as::<_, Risk>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// All risks belonging to any of `project_ids`.
    pub async fn list_by_projects(
        pool: &PgPool,
        project_ids: &[DbId],
    ) -> Result<Vec<Risk>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM risks WHERE project_id = ANY($1) ORDER BY project_id, id"
        );
        sqlx::query_as::<_, Risk>(&query)
            .bind(project_ids)
            .fetch_all(pool)
            .await
    }

    /// Every risk with its project code, for portfolio aggregation.
    pub async fn list_all_with_project(pool: &PgPool) -> Result<Vec<RiskWithProject>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} FROM risks r \
             JOIN projects p ON p.id = r.project_id \
             ORDER BY r.id"
        );
        sqlx::query_as::<_, RiskWithProject>(&query)
            .fetch_all(pool)
            .await
    }

    /// Update a risk. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateRisk,
    ) -> Result<Option<Risk>, sqlx::Error> {
        let query = format!(
            "UPDATE risks SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                category = COALESCE($4, category),
                severity = COALESCE($5, severity),
                status = COALESCE($6, status),
                probability = COALESCE($7, probability),
                impact = COALESCE($8, impact),
                mitigation_plan = COALESCE($9, mitigation_plan),
                owner = COALESCE($10, owner),
                identified_date = COALESCE($11, identified_date),
                target_closure_date = COALESCE($12, target_closure_date),
                actual_closure_date = COALESCE($13, actual_closure_date)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Risk>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.category.map(|c| c.as_str()))
            .bind(input.severity.map(|s| s.as_str()))
            .bind(input.status.map(|s| s.as_str()))
            .bind(input.probability)
            .bind(input.impact)
            .bind(&input.mitigation_plan)
            .bind(&input.owner)
            .bind(input.identified_date)
            .bind(input.target_closure_date)
            .bind(input.actual_closure_date)
            .fetch_optional(pool)
            .await
    }

    /// Delete a risk by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM risks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
