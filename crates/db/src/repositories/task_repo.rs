//! Repository for the `tasks` table.

use pmo_core::search::{
    clamp_limit, clamp_offset, like_pattern, resolve_ordering, DEFAULT_LIST_LIMIT,
    MAX_LIST_LIMIT, TASK_DEFAULT_ORDERING, TASK_ORDERING_FIELDS,
};
use pmo_core::types::{Date, DbId};
use sqlx::PgPool;

use crate::models::task::{CreateTask, Task, TaskFilter, UpdateTask};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, name, description, status, assigned_to, start_date, \
                        due_date, completion_date, planned_hours, actual_hours, \
                        completion_percentage, is_milestone, is_critical_path, \
                        created_at, updated_at";

/// Provides CRUD operations for tasks.
pub struct TaskRepo;

impl TaskRepo {
    /// Insert a new task, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateTask) -> Result<Task, sqlx::Error> {
        let query = format!(
            "INSERT INTO tasks (
                project_id, name, description, status, assigned_to, start_date, due_date,
                completion_date, planned_hours, actual_hours, completion_percentage,
                is_milestone, is_critical_path
             ) VALUES (
                $1, $2, COALESCE($3, ''), COALESCE($4, 'not_started'), $5, $6, $7, $8,
                COALESCE($9, 0), COALESCE($10, 0), COALESCE($11, 0),
                COALESCE($12, false), COALESCE($13, false)
             )
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(input.project_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.status.map(|s| s.as_str()))
            .bind(&input.assigned_to)
            .bind(input.start_date)
            .bind(input.due_date)
            .bind(input.completion_date)
            .bind(input.planned_hours)
            .bind(input.actual_hours)
            .bind(input.completion_percentage)
            .bind(input.is_milestone)
            .bind(input.is_critical_path)
            .fetch_one(pool)
            .await
    }

    /// Find a task by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List tasks matching `filter`, soonest due first unless ordered otherwise.
    pub async fn list(pool: &PgPool, filter: &TaskFilter) -> Result<Vec<Task>, sqlx::Error> {
        let limit = clamp_limit(filter.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
        let offset = clamp_offset(filter.offset);
        let ordering = resolve_ordering(
            filter.ordering.as_deref(),
            TASK_ORDERING_FIELDS,
            TASK_DEFAULT_ORDERING,
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
        if filter.assigned_to.is_some() {
            conditions.push(format!("assigned_to ILIKE ${bind_idx}"));
            bind_idx += 1;
        }
        if filter.is_milestone.is_some() {
            conditions.push(format!("is_milestone = ${bind_idx}"));
            bind_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {COLUMNS} FROM tasks {where_clause} \
             ORDER BY {ordering} \
             LIMIT ${bind_idx} OFFSET ${next_idx}",
            next_idx = bind_idx + 1,
        );

        let mut q = sqlx::query_as::<_, Task>(&query);
        if let Some(project_id) = filter.project {
            q = q.bind(project_id);
        }
        if let Some(status) = filter.status {
            q = q.bind(status.as_str());
        }
        if let Some(ref assignee) = filter.assigned_to {
            q = q.bind(like_pattern(assignee));
        }
        if let Some(is_milestone) = filter.is_milestone {
            q = q.bind(is_milestone);
        }
        q = q.bind(limit).bind(offset);
        q.fetch_all(pool).await
    }

    /// Pending tasks whose due date is before `today`.
    pub async fn list_overdue(pool: &PgPool, today: Date) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tasks \
             WHERE status IN ('not_started', 'in_progress') AND due_date < $1 \
             ORDER BY due_date ASC, id ASC"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(today)
            .fetch_all(pool)
            .await
    }

    /// All tasks of one project.
    pub async fn list_by_project(pool: &PgPool, project_id: DbId) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tasks WHERE project_id = $1 ORDER BY due_date ASC, id ASC"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// All tasks belonging to any of `project_ids`.
    pub async fn list_by_projects(
        pool: &PgPool,
        project_ids: &[DbId],
    ) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tasks WHERE project_id = ANY($1) ORDER BY project_id, id"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(project_ids)
            .fetch_all(pool)
            .await
    }

    /// Every task, in id order. Used by exports and analytics.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks ORDER BY id");
        sqlx::query_as::<_, Task>(&query).fetch_all(pool).await
    }

    /// Update a task. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTask,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                status = COALESCE($4, status),
                assigned_to = COALESCE($5, assigned_to),
                start_date = COALESCE($6, start_date),
                due_date = COALESCE($7, due_date),
                completion_date = COALESCE($8, completion_date),
                planned_hours = COALESCE($9, planned_hours),
                actual_hours = COALESCE($10, actual_hours),
                completion_percentage = COALESCE($11, completion_percentage),
                is_milestone = COALESCE($12, is_milestone),
                is_critical_path = COALESCE($13, is_critical_path)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.status.map(|s| s.as_str()))
            .bind(&input.assigned_to)
            .bind(input.start_date)
            .bind(input.due_date)
            .bind(input.completion_date)
            .bind(input.planned_hours)
            .bind(input.actual_hours)
            .bind(input.completion_percentage)
            .bind(input.is_milestone)
            .bind(input.is_critical_path)
            .fetch_optional(pool)
            .await
    }

    /// Delete a task by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
