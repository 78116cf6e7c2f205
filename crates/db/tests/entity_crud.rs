//! Integration tests for the portfolio entity repositories.
//!
//! Exercises the repository layer against a real database:
//! - Column defaults on create
//! - Cascade delete from a project to its children
//! - Unique and CHECK constraint violations
//! - Filtered, ordered list queries
//! - Snapshot upsert and CSV import updates

use chrono::NaiveDate;
use pmo_core::csv::ProjectImportRow;
use pmo_core::domain::{
    IssueCategory, IssueStatus, Priority, ProjectStatus, ResourceRole, RiskCategory, RiskStatus,
    TaskStatus,
};
use pmo_db::models::issue::{CreateIssue, UpdateIssue};
use pmo_db::models::milestone::CreateMilestone;
use pmo_db::models::project::{CreateProject, ProjectFilter, UpdateProject};
use pmo_db::models::resource::{CreateResource, ResourceFilter};
use pmo_db::models::risk::{CreateRisk, RiskFilter};
use pmo_db::models::snapshot::NewSnapshot;
use pmo_db::models::task::{CreateTask, TaskFilter};
use pmo_db::repositories::{
    IssueRepo, MilestoneRepo, ProjectRepo, ResourceRepo, RiskRepo, SnapshotRepo, TaskRepo,
};
use rust_decimal_macros::dec;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

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
        budget: Some(dec!(500000)),
        spent: Some(dec!(320000)),
        completion_percentage: None,
        spi: None,
        cpi: None,
        project_manager: "Dana Reyes".to_string(),
        sponsor: None,
        team_size: None,
    }
}

fn new_risk(project_id: i64, title: &str, severity: Priority) -> CreateRisk {
    CreateRisk {
        project_id,
        title: title.to_string(),
        description: None,
        category: RiskCategory::Technical,
        severity,
        status: None,
        probability: 60,
        impact: 7,
        mitigation_plan: None,
        owner: "Lee".to_string(),
        identified_date: None,
        target_closure_date: None,
        actual_closure_date: None,
    }
}

fn new_task(project_id: i64, name: &str, due: NaiveDate) -> CreateTask {
    CreateTask {
        project_id,
        name: name.to_string(),
        description: None,
        status: None,
        assigned_to: "Sam".to_string(),
        start_date: date(2024, 1, 1),
        due_date: due,
        completion_date: None,
        planned_hours: None,
        actual_hours: None,
        completion_percentage: None,
        is_milestone: None,
        is_critical_path: None,
    }
}

fn new_issue(project_id: i64, title: &str) -> CreateIssue {
    CreateIssue {
        project_id,
        title: title.to_string(),
        description: None,
        category: IssueCategory::Technical,
        severity: Priority::Medium,
        status: None,
        reported_by: "Kim".to_string(),
        assigned_to: None,
        reported_date: None,
        resolved_date: None,
        resolution: None,
    }
}

fn snapshot_for(project_id: i64, on: NaiveDate, health_score: i32) -> NewSnapshot {
    NewSnapshot {
        project_id,
        snapshot_date: on,
        status: ProjectStatus::OnTrack,
        completion_percentage: 40,
        budget: dec!(500000),
        spent: dec!(320000),
        spi: dec!(1.00),
        cpi: dec!(1.00),
        health_score,
        total_tasks: 3,
        completed_tasks: 1,
        total_risks: 2,
        high_risks: 1,
        total_issues: 0,
        open_issues: 0,
    }
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_project_applies_defaults(pool: PgPool) {
    let project = ProjectRepo::create(&pool, &new_project("ERP Rollout", "ERP-1"))
        .await
        .unwrap();

    assert_eq!(project.status, ProjectStatus::OnTrack);
    assert_eq!(project.priority, Priority::Medium);
    assert_eq!(project.spi, dec!(1.00));
    assert_eq!(project.cpi, dec!(1.00));
    assert_eq!(project.completion_percentage, 0);
    assert_eq!(project.description, "");
    assert_eq!(project.budget, dec!(500000));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_project_code_rejected(pool: PgPool) {
    ProjectRepo::create(&pool, &new_project("First", "DUP-1"))
        .await
        .unwrap();
    let err = ProjectRepo::create(&pool, &new_project("Second", "DUP-1"))
        .await
        .unwrap_err();

    let db_err = err.as_database_error().expect("database error");
    assert_eq!(db_err.code().as_deref(), Some("23505"));
    assert_eq!(db_err.constraint(), Some("uq_projects_code"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_completion_over_100_rejected_by_check(pool: PgPool) {
    let mut input = new_project("Overdone", "OVR-1");
    input.completion_percentage = Some(101);
    assert!(ProjectRepo::create(&pool, &input).await.is_err());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_project_applies_only_given_fields(pool: PgPool) {
    let project = ProjectRepo::create(&pool, &new_project("Before", "UPD-1"))
        .await
        .unwrap();

    let update = UpdateProject {
        name: Some("After".to_string()),
        status: Some(ProjectStatus::AtRisk),
        spi: Some(dec!(0.85)),
        ..Default::default()
    };
    let updated = ProjectRepo::update(&pool, project.id, &update)
        .await
        .unwrap()
        .expect("project exists");

    assert_eq!(updated.name, "After");
    assert_eq!(updated.status, ProjectStatus::AtRisk);
    assert_eq!(updated.spi, dec!(0.85));
    assert_eq!(updated.code, "UPD-1");
    assert_eq!(updated.budget, dec!(500000));
    assert!(updated.updated_at >= project.updated_at);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_nonexistent_returns_none(pool: PgPool) {
    let result = ProjectRepo::update(&pool, 999_999, &UpdateProject::default())
        .await
        .unwrap();
    assert!(result.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_nonexistent_returns_false(pool: PgPool) {
    assert!(!ProjectRepo::delete(&pool, 999_999).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_projects_filters_and_searches(pool: PgPool) {
    let a = ProjectRepo::create(&pool, &new_project("Data Platform", "DP-1"))
        .await
        .unwrap();
    ProjectRepo::create(&pool, &new_project("Mobile App", "MOB-1"))
        .await
        .unwrap();
    ProjectRepo::update(
        &pool,
        a.id,
        &UpdateProject {
            status: Some(ProjectStatus::Delayed),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let delayed = ProjectRepo::list(
        &pool,
        &ProjectFilter {
            status: Some(ProjectStatus::Delayed),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(delayed.len(), 1);
    assert_eq!(delayed[0].id, a.id);

    let searched = ProjectRepo::list(
        &pool,
        &ProjectFilter {
            search: Some("mob".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(searched.len(), 1);
    assert_eq!(searched[0].code, "MOB-1");

    let by_name = ProjectRepo::list(
        &pool,
        &ProjectFilter {
            ordering: Some("name".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let names: Vec<_> = by_name.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Data Platform", "Mobile App"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_from_import_leaves_missing_cells_untouched(pool: PgPool) {
    let project = ProjectRepo::create(&pool, &new_project("Imported", "IMP-1"))
        .await
        .unwrap();

    let row = ProjectImportRow {
        line: 2,
        project_id: project.id,
        name: None,
        start_date: None,
        budget: Some(dec!(750000)),
        status: Some(ProjectStatus::Completed),
    };
    let updated = ProjectRepo::update_from_import(&pool, &row)
        .await
        .unwrap()
        .expect("project exists");
    assert_eq!(updated.name, "Imported");
    assert_eq!(updated.budget, dec!(750000));
    assert_eq!(updated.status, ProjectStatus::Completed);

    let unknown = ProjectImportRow {
        project_id: 424_242,
        ..row
    };
    assert!(ProjectRepo::update_from_import(&pool, &unknown)
        .await
        .unwrap()
        .is_none());
}

// ---------------------------------------------------------------------------
// Children
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_cascade_delete_project(pool: PgPool) {
    let project = ProjectRepo::create(&pool, &new_project("Cascade", "CAS-1"))
        .await
        .unwrap();
    let risk = RiskRepo::create(&pool, &new_risk(project.id, "Vendor", Priority::High))
        .await
        .unwrap();
    let task = TaskRepo::create(&pool, &new_task(project.id, "Design", date(2024, 3, 1)))
        .await
        .unwrap();
    let issue = IssueRepo::create(&pool, &new_issue(project.id, "Build broken"))
        .await
        .unwrap();
    let milestone = MilestoneRepo::create(
        &pool,
        &CreateMilestone {
            project_id: project.id,
            name: "Go-live".to_string(),
            description: None,
            planned_date: date(2024, 12, 1),
            actual_date: None,
            status: None,
            deliverables: None,
        },
    )
    .await
    .unwrap();

    assert!(ProjectRepo::delete(&pool, project.id).await.unwrap());

    assert!(RiskRepo::find_by_id(&pool, risk.id).await.unwrap().is_none());
    assert!(TaskRepo::find_by_id(&pool, task.id).await.unwrap().is_none());
    assert!(IssueRepo::find_by_id(&pool, issue.id).await.unwrap().is_none());
    assert!(MilestoneRepo::find_by_id(&pool, milestone.id)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_fk_violation_risk_bad_project(pool: PgPool) {
    assert!(
        RiskRepo::create(&pool, &new_risk(999_999, "Orphan", Priority::Low))
            .await
            .is_err(),
        "Creating a risk for a missing project should fail"
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_risk_defaults_and_probability_check(pool: PgPool) {
    let project = ProjectRepo::create(&pool, &new_project("Risky", "RSK-1"))
        .await
        .unwrap();
    let risk = RiskRepo::create(&pool, &new_risk(project.id, "Churn", Priority::Medium))
        .await
        .unwrap();
    assert_eq!(risk.status, RiskStatus::Open);
    assert_eq!(risk.mitigation_plan, "");

    let mut bad = new_risk(project.id, "Impossible", Priority::Low);
    bad.probability = 0;
    assert!(RiskRepo::create(&pool, &bad).await.is_err());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_high_priority_risks_exclude_closed_and_low(pool: PgPool) {
    let project = ProjectRepo::create(&pool, &new_project("Priorities", "PRI-1"))
        .await
        .unwrap();
    let critical = RiskRepo::create(&pool, &new_risk(project.id, "Outage", Priority::Critical))
        .await
        .unwrap();
    RiskRepo::create(&pool, &new_risk(project.id, "Typo", Priority::Low))
        .await
        .unwrap();
    let mut closed = new_risk(project.id, "Old", Priority::High);
    closed.status = Some(RiskStatus::Closed);
    RiskRepo::create(&pool, &closed).await.unwrap();

    let high = RiskRepo::list_high_priority(&pool).await.unwrap();
    assert_eq!(high.len(), 1);
    assert_eq!(high[0].id, critical.id);

    let filtered = RiskRepo::list(
        &pool,
        &RiskFilter {
            project: Some(project.id),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(filtered.len(), 3);
    assert_eq!(filtered[0].severity, Priority::Critical);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_risks_with_project_carry_code(pool: PgPool) {
    let project = ProjectRepo::create(&pool, &new_project("Joined", "JN-1"))
        .await
        .unwrap();
    let risk = RiskRepo::create(&pool, &new_risk(project.id, "Scope creep", Priority::High))
        .await
        .unwrap();

    let joined = RiskRepo::find_with_project(&pool, risk.id)
        .await
        .unwrap()
        .expect("risk exists");
    assert_eq!(joined.project_code, "JN-1");
    assert_eq!(joined.to_portfolio().risk_score(), dec!(4.2));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_overdue_tasks_only_include_pending(pool: PgPool) {
    let project = ProjectRepo::create(&pool, &new_project("Tasks", "TSK-1"))
        .await
        .unwrap();
    let late = TaskRepo::create(&pool, &new_task(project.id, "Late", date(2024, 2, 1)))
        .await
        .unwrap();
    let mut done = new_task(project.id, "Done", date(2024, 2, 1));
    done.status = Some(TaskStatus::Completed);
    TaskRepo::create(&pool, &done).await.unwrap();
    TaskRepo::create(&pool, &new_task(project.id, "Future", date(2024, 9, 1)))
        .await
        .unwrap();

    let overdue = TaskRepo::list_overdue(&pool, date(2024, 6, 1)).await.unwrap();
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].id, late.id);

    let pending = TaskRepo::list(
        &pool,
        &TaskFilter {
            status: Some(TaskStatus::NotStarted),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(pending.len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_resource_filters_by_role_and_activity(pool: PgPool) {
    let project = ProjectRepo::create(&pool, &new_project("People", "PPL-1"))
        .await
        .unwrap();
    for (name, role, active) in [
        ("Ana", ResourceRole::Developer, true),
        ("Ben", ResourceRole::Qa, true),
        ("Cy", ResourceRole::Developer, false),
    ] {
        ResourceRepo::create(
            &pool,
            &CreateResource {
                project_id: project.id,
                name: name.to_string(),
                role,
                email: format!("{}@example.com", name.to_lowercase()),
                allocation_percentage: None,
                hourly_rate: Some(dec!(95)),
                start_date: date(2024, 1, 1),
                end_date: None,
                is_active: Some(active),
            },
        )
        .await
        .unwrap();
    }

    let devs = ResourceRepo::list(
        &pool,
        &ResourceFilter {
            role: Some(ResourceRole::Developer),
            is_active: Some(true),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(devs.len(), 1);
    assert_eq!(devs[0].name, "Ana");
    assert_eq!(devs[0].allocation_percentage, 100);

    assert_eq!(ResourceRepo::list_active(&pool).await.unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_issue_counts_track_resolution(pool: PgPool) {
    let project = ProjectRepo::create(&pool, &new_project("Issues", "ISS-1"))
        .await
        .unwrap();
    let first = IssueRepo::create(&pool, &new_issue(project.id, "Flaky CI"))
        .await
        .unwrap();
    IssueRepo::create(&pool, &new_issue(project.id, "Slow build"))
        .await
        .unwrap();

    IssueRepo::update(
        &pool,
        first.id,
        &UpdateIssue {
            status: Some(IssueStatus::Resolved),
            resolved_date: Some(date(2024, 5, 2)),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let counts = IssueRepo::counts_for_project(&pool, project.id).await.unwrap();
    assert_eq!(counts.total, 2);
    assert_eq!(counts.open, 1);
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_snapshot_upsert_overwrites_same_day(pool: PgPool) {
    let project = ProjectRepo::create(&pool, &new_project("Snap", "SNP-1"))
        .await
        .unwrap();
    let day = date(2024, 6, 1);

    let first = SnapshotRepo::upsert(&pool, &snapshot_for(project.id, day, 80))
        .await
        .unwrap();
    assert!(first.inserted);

    let second = SnapshotRepo::upsert(&pool, &snapshot_for(project.id, day, 65))
        .await
        .unwrap();
    assert!(!second.inserted);
    assert_eq!(second.snapshot.id, first.snapshot.id);
    assert_eq!(second.snapshot.health_score, 65);

    SnapshotRepo::upsert(&pool, &snapshot_for(project.id, date(2024, 6, 2), 70))
        .await
        .unwrap();

    let history = SnapshotRepo::list_by_project(&pool, project.id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].snapshot_date, date(2024, 6, 2));
}
