//! Daily project snapshots.
//!
//! One row per project per date. Capturing twice on the same date
//! overwrites the earlier row.

use chrono::NaiveDate;
use pmo_core::domain::{Severity, TaskStatus};
use pmo_core::metrics::{self, HighRiskPolicy};
use pmo_db::models::issue::IssueCounts;
use pmo_db::models::project::Project;
use pmo_db::models::risk::Risk;
use pmo_db::models::snapshot::NewSnapshot;
use pmo_db::models::task::Task;
use pmo_db::repositories::{IssueRepo, ProjectRepo, RiskRepo, SnapshotRepo, TaskRepo};
use serde::Serialize;
use sqlx::PgPool;

/// Outcome of [`capture_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CaptureSummary {
    pub created: u32,
    pub updated: u32,
}

/// Capture today's snapshot for every project.
pub async fn capture_all(
    pool: &PgPool,
    today: NaiveDate,
    policy: HighRiskPolicy,
) -> Result<CaptureSummary, sqlx::Error> {
    let projects = ProjectRepo::list_all(pool).await?;
    let mut summary = CaptureSummary::default();

    for project in &projects {
        let risks = RiskRepo::list_by_project(pool, project.id).await?;
        let tasks = TaskRepo::list_by_project(pool, project.id).await?;
        let issues = IssueRepo::counts_for_project(pool, project.id).await?;

        let snapshot = build_snapshot(project, &risks, &tasks, &issues, today, policy);
        let stored = SnapshotRepo::upsert(pool, &snapshot).await?;

        if stored.inserted {
            summary.created += 1;
            tracing::debug!(project_id = project.id, code = %project.code, "Created snapshot");
        } else {
            summary.updated += 1;
            tracing::debug!(project_id = project.id, code = %project.code, "Updated snapshot");
        }
    }

    tracing::info!(
        %today,
        created = summary.created,
        updated = summary.updated,
        "Project snapshots captured",
    );
    Ok(summary)
}

/// Snapshot values for one project.
///
/// `high_risks` counts `high` and `critical` risks; the health score
/// applies `policy`.
pub fn build_snapshot(
    project: &Project,
    risks: &[Risk],
    tasks: &[Task],
    issues: &IssueCounts,
    today: NaiveDate,
    policy: HighRiskPolicy,
) -> NewSnapshot {
    let risk_figures: Vec<_> = risks.iter().map(Risk::figures).collect();
    let task_figures: Vec<_> = tasks.iter().map(Task::figures).collect();
    let health_score =
        metrics::health_score(&project.figures(), &risk_figures, &task_figures, today, policy);

    let completed_tasks = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Completed)
        .count();
    let high_risks = risks
        .iter()
        .filter(|r| matches!(r.severity, Severity::High | Severity::Critical))
        .count();

    NewSnapshot {
        project_id: project.id,
        snapshot_date: today,
        status: project.status,
        completion_percentage: project.completion_percentage,
        budget: project.budget,
        spent: project.spent,
        spi: project.spi,
        cpi: project.cpi,
        health_score,
        total_tasks: count(tasks.len()),
        completed_tasks: count(completed_tasks),
        total_risks: count(risks.len()),
        high_risks: count(high_risks),
        total_issues: count_i64(issues.total),
        open_issues: count_i64(issues.open),
    }
}

fn count(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

fn count_i64(n: i64) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use pmo_core::domain::{Priority, ProjectStatus, RiskCategory, RiskStatus};
    use rust_decimal_macros::dec;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn project() -> Project {
        Project {
            id: 7,
            name: "ERP Rollout".into(),
            code: "ERP-1".into(),
            description: String::new(),
            status: ProjectStatus::AtRisk,
            priority: Priority::High,
            start_date: date(2024, 1, 1),
            planned_end_date: date(2024, 12, 31),
            actual_end_date: None,
            budget: dec!(500000),
            spent: dec!(320000),
            completion_percentage: 45,
            spi: dec!(0.86),
            cpi: dec!(0.86),
            project_manager: "Dana".into(),
            sponsor: String::new(),
            team_size: 8,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn risk(severity: Severity) -> Risk {
        Risk {
            id: 1,
            project_id: 7,
            title: "r".into(),
            description: String::new(),
            category: RiskCategory::Schedule,
            severity,
            status: RiskStatus::Open,
            probability: 50,
            impact: 5,
            mitigation_plan: String::new(),
            owner: "Lee".into(),
            identified_date: date(2024, 2, 1),
            target_closure_date: None,
            actual_closure_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn task(status: TaskStatus, due: NaiveDate) -> Task {
        Task {
            id: 1,
            project_id: 7,
            name: "t".into(),
            description: String::new(),
            status,
            assigned_to: "Sam".into(),
            start_date: date(2024, 1, 1),
            due_date: due,
            completion_date: None,
            planned_hours: dec!(0),
            actual_hours: dec!(0),
            completion_percentage: 0,
            is_milestone: false,
            is_critical_path: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn snapshot_counts_and_health_score() {
        let today = date(2024, 6, 1);
        let risks = [risk(Severity::High), risk(Severity::Critical), risk(Severity::Low)];
        let tasks = [
            task(TaskStatus::InProgress, date(2024, 5, 1)),
            task(TaskStatus::NotStarted, date(2024, 5, 2)),
            task(TaskStatus::Completed, date(2024, 5, 3)),
        ];
        let issues = IssueCounts { total: 4, open: 1 };

        let snapshot = build_snapshot(
            &project(),
            &risks,
            &tasks,
            &issues,
            today,
            HighRiskPolicy::HighOnly,
        );

        assert_eq!(snapshot.project_id, 7);
        assert_eq!(snapshot.snapshot_date, today);
        assert_eq!(snapshot.status, ProjectStatus::AtRisk);
        // 100 - 15 (SPI) - 10 (CPI) - 10 (one high) - 10 (two overdue)
        assert_eq!(snapshot.health_score, 55);
        assert_eq!(snapshot.total_tasks, 3);
        assert_eq!(snapshot.completed_tasks, 1);
        assert_eq!(snapshot.total_risks, 3);
        assert_eq!(snapshot.high_risks, 2);
        assert_eq!(snapshot.total_issues, 4);
        assert_eq!(snapshot.open_issues, 1);
    }

    #[test]
    fn policy_changes_only_the_health_score() {
        let today = date(2024, 6, 1);
        let risks = [risk(Severity::High), risk(Severity::Critical)];
        let issues = IssueCounts { total: 0, open: 0 };

        let high_only =
            build_snapshot(&project(), &risks, &[], &issues, today, HighRiskPolicy::HighOnly);
        let both = build_snapshot(
            &project(),
            &risks,
            &[],
            &issues,
            today,
            HighRiskPolicy::HighOrCritical,
        );

        assert_eq!(high_only.health_score - both.health_score, 10);
        assert_eq!(high_only.high_risks, both.high_risks);
    }
}
