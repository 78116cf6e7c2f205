//! Integration tests for the snapshot job.

use chrono::NaiveDate;
use pmo_core::domain::{IssueCategory, IssueStatus, Priority, RiskCategory};
use pmo_core::metrics::HighRiskPolicy;
use pmo_db::models::issue::CreateIssue;
use pmo_db::models::project::CreateProject;
use pmo_db::models::risk::CreateRisk;
use pmo_db::repositories::{IssueRepo, ProjectRepo, RiskRepo, SnapshotRepo};
use pmo_worker::snapshots::{capture_all, CaptureSummary};
use rust_decimal_macros::dec;
use sqlx::PgPool;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn new_project(name: &str, code: &str) -> CreateProject {
    CreateProject {
        name: name.to_string(),
        code: code.to_string(),
        description: None,
        status: None,
        priority: None,
        start_date: date(2024, 1, 1),
        planned_end_date: date(2024, 12, 31),
        actual_end_date: None,
        budget: Some(dec!(100000)),
        spent: Some(dec!(40000)),
        completion_percentage: Some(40),
        spi: None,
        cpi: None,
        project_manager: "Dana Reyes".to_string(),
        sponsor: None,
        team_size: None,
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_capture_creates_then_updates(pool: PgPool) {
    let erp = ProjectRepo::create(&pool, &new_project("ERP", "ERP-1"))
        .await
        .unwrap();
    ProjectRepo::create(&pool, &new_project("CRM", "CRM-1"))
        .await
        .unwrap();

    RiskRepo::create(
        &pool,
        &CreateRisk {
            project_id: erp.id,
            title: "Vendor delay".to_string(),
            description: None,
            category: RiskCategory::External,
            severity: Priority::Critical,
            status: None,
            probability: 70,
            impact: 8,
            mitigation_plan: None,
            owner: "Lee".to_string(),
            identified_date: None,
            target_closure_date: None,
            actual_closure_date: None,
        },
    )
    .await
    .unwrap();
    IssueRepo::create(
        &pool,
        &CreateIssue {
            project_id: erp.id,
            title: "Build broken".to_string(),
            description: None,
            category: IssueCategory::Technical,
            severity: Priority::High,
            status: None,
            reported_by: "Kim".to_string(),
            assigned_to: None,
            reported_date: None,
            resolved_date: None,
            resolution: None,
        },
    )
    .await
    .unwrap();

    let today = date(2024, 6, 1);
    let first = capture_all(&pool, today, HighRiskPolicy::HighOnly)
        .await
        .unwrap();
    assert_eq!(first, CaptureSummary { created: 2, updated: 0 });

    let second = capture_all(&pool, today, HighRiskPolicy::HighOrCritical)
        .await
        .unwrap();
    assert_eq!(second, CaptureSummary { created: 0, updated: 2 });

    let snapshots = SnapshotRepo::list_by_project(&pool, erp.id).await.unwrap();
    assert_eq!(snapshots.len(), 1);
    let snapshot = &snapshots[0];
    assert_eq!(snapshot.high_risks, 1);
    assert_eq!(snapshot.total_issues, 1);
    assert_eq!(snapshot.open_issues, 1);
    // The second capture counted the critical risk against the health score.
    assert_eq!(snapshot.health_score, 90);
}

fn new_issue(project_id: i64, title: &str, status: Option<IssueStatus>) -> CreateIssue {
    CreateIssue {
        project_id,
        title: title.to_string(),
        description: None,
        category: IssueCategory::Technical,
        severity: Priority::Medium,
        status,
        reported_by: "Kim".to_string(),
        assigned_to: None,
        reported_date: None,
        resolved_date: None,
        resolution: None,
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_open_issues_excludes_in_progress(pool: PgPool) {
    let project = ProjectRepo::create(&pool, &new_project("ERP", "ERP-1"))
        .await
        .unwrap();
    IssueRepo::create(
        &pool,
        &new_issue(project.id, "Data migration", Some(IssueStatus::InProgress)),
    )
    .await
    .unwrap();

    capture_all(&pool, date(2024, 6, 1), HighRiskPolicy::default())
        .await
        .unwrap();

    let snapshots = SnapshotRepo::list_by_project(&pool, project.id)
        .await
        .unwrap();
    assert_eq!(snapshots[0].total_issues, 1);
    assert_eq!(snapshots[0].open_issues, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_new_date_adds_a_row(pool: PgPool) {
    let project = ProjectRepo::create(&pool, &new_project("ERP", "ERP-1"))
        .await
        .unwrap();

    capture_all(&pool, date(2024, 6, 1), HighRiskPolicy::default())
        .await
        .unwrap();
    let next_day = capture_all(&pool, date(2024, 6, 2), HighRiskPolicy::default())
        .await
        .unwrap();
    assert_eq!(next_day.created, 1);

    let snapshots = SnapshotRepo::list_by_project(&pool, project.id)
        .await
        .unwrap();
    assert_eq!(snapshots.len(), 2);
    assert_eq!(snapshots[0].snapshot_date, date(2024, 6, 2));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_empty_portfolio_is_a_no_op(pool: PgPool) {
    let summary = capture_all(&pool, date(2024, 6, 1), HighRiskPolicy::default())
        .await
        .unwrap();
    assert_eq!(summary, CaptureSummary::default());
}
