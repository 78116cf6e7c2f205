//! Repository for the `project_snapshots` table.

use pmo_core::types::DbId;
use sqlx::PgPool;

use crate::models::snapshot::{NewSnapshot, ProjectSnapshot, UpsertedSnapshot};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, snapshot_date, status, completion_percentage, budget, \
                        spent, spi, cpi, health_score, total_tasks, completed_tasks, \
                        total_risks, high_risks, total_issues, open_issues, \
                        created_at, updated_at";

pub struct SnapshotRepo;

impl SnapshotRepo {
    /// Insert the snapshot, or overwrite the existing one for the same
    /// project and date.
    pub async fn upsert(
        pool: &PgPool,
        input: &NewSnapshot,
    ) -> Result<UpsertedSnapshot, sqlx::Error> {
        // xmax is zero only for a freshly inserted tuple.
        let query = format!(
            "INSERT INTO project_snapshots (
                project_id, snapshot_date, status, completion_percentage, budget, spent,
                spi, cpi, health_score, total_tasks, completed_tasks, total_risks,
                high_risks, total_issues, open_issues
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
             ON CONFLICT ON CONSTRAINT uq_project_snapshots_project_date DO UPDATE SET
                status = EXCLUDED.status,
                completion_percentage = EXCLUDED.completion_percentage,
                budget = EXCLUDED.budget,
                spent = EXCLUDED.spent,
                spi = EXCLUDED.spi,
                cpi = EXCLUDED.cpi,
                health_score = EXCLUDED.health_score,
                total_tasks = EXCLUDED.total_tasks,
                completed_tasks = EXCLUDED.completed_tasks,
                total_risks = EXCLUDED.total_risks,
                high_risks = EXCLUDED.high_risks,
                total_issues = EXCLUDED.total_issues,
                open_issues = EXCLUDED.open_issues
             RETURNING {COLUMNS}, (xmax = 0) AS inserted"
        );
        sqlx::query_as::<_, UpsertedSnapshot>(&query)
            .bind(input.project_id)
            .bind(input.snapshot_date)
            .bind(input.status.as_str())
            .bind(input.completion_percentage)
            .bind(input.budget)
            .bind(input.spent)
            .bind(input.spi)
            .bind(input.cpi)
            .bind(input.health_score)
            .bind(input.total_tasks)
            .bind(input.completed_tasks)
            .bind(input.total_risks)
            .bind(input.high_risks)
            .bind(input.total_issues)
            .bind(input.open_issues)
            .fetch_one(pool)
            .await
    }

    /// Snapshots of one project, most recent first.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<ProjectSnapshot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM project_snapshots \
             WHERE project_id = $1 ORDER BY snapshot_date DESC"
        );
        sqlx::query_as::<_, ProjectSnapshot>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }
}
