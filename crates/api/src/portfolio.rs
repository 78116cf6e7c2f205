//! Load projects together with their risks and tasks.
//!
//! Health scores and the other derived indicators need a project's children,
//! so list and report endpoints fetch children for a whole page of projects
//! in two concurrent queries and group them here.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use futures::try_join;
use pmo_core::domain::Severity;
use pmo_core::metrics::{self, HighRiskPolicy, ProjectIndicators};
use pmo_core::portfolio::{PortfolioProject, PortfolioRisk};
use pmo_core::types::DbId;
use pmo_db::models::project::Project;
use pmo_db::models::risk::Risk;
use pmo_db::models::task::Task;
use pmo_db::repositories::{ProjectRepo, RiskRepo, TaskRepo};
use sqlx::PgPool;

/// Today's date in UTC. Handlers pass it explicitly into the metrics module.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// A project with all of its risks and tasks.
#[derive(Debug, Clone)]
pub struct ProjectBundle {
    pub project: Project,
    pub risks: Vec<Risk>,
    pub tasks: Vec<Task>,
}

impl ProjectBundle {
    pub fn indicators(&self, today: NaiveDate, policy: HighRiskPolicy) -> ProjectIndicators {
        let risks: Vec<_> = self.risks.iter().map(Risk::figures).collect();
        let tasks: Vec<_> = self.tasks.iter().map(Task::figures).collect();
        metrics::project_indicators(&self.project.figures(), &risks, &tasks, today, policy)
    }

    pub fn health_score(&self, today: NaiveDate, policy: HighRiskPolicy) -> i32 {
        let risks: Vec<_> = self.risks.iter().map(Risk::figures).collect();
        let tasks: Vec<_> = self.tasks.iter().map(Task::figures).collect();
        metrics::health_score(&self.project.figures(), &risks, &tasks, today, policy)
    }

    /// Risks of severity `high` or `critical`. This is the displayed count and
    /// does not depend on the health-score policy.
    pub fn high_risks(&self) -> usize {
        self.risks
            .iter()
            .filter(|r| matches!(r.severity, Severity::High | Severity::Critical))
            .count()
    }

    pub fn overdue_tasks(&self, today: NaiveDate) -> usize {
        self.tasks
            .iter()
            .filter(|t| t.status.is_pending() && t.due_date < today)
            .count()
    }

    /// Tasks that are neither completed nor cancelled.
    pub fn open_tasks(&self) -> usize {
        self.tasks.iter().filter(|t| !t.status.is_terminal()).count()
    }

    pub fn to_portfolio(&self, today: NaiveDate, policy: HighRiskPolicy) -> PortfolioProject {
        self.project.to_portfolio(self.health_score(today, policy))
    }
}

/// Attach risks and tasks to each project, keeping the input order.
pub async fn load_bundles(
    pool: &PgPool,
    projects: Vec<Project>,
) -> Result<Vec<ProjectBundle>, sqlx::Error> {
    if projects.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<DbId> = projects.iter().map(|p| p.id).collect();
    let (risks, tasks) = try_join!(
        RiskRepo::list_by_projects(pool, &ids),
        TaskRepo::list_by_projects(pool, &ids),
    )?;
    let mut risks = group_by_project(risks, |r| r.project_id);
    let mut tasks = group_by_project(tasks, |t| t.project_id);

    Ok(projects
        .into_iter()
        .map(|project| ProjectBundle {
            risks: risks.remove(&project.id).unwrap_or_default(),
            tasks: tasks.remove(&project.id).unwrap_or_default(),
            project,
        })
        .collect())
}

/// Load one project's children.
pub async fn load_bundle(pool: &PgPool, project: Project) -> Result<ProjectBundle, sqlx::Error> {
    let (risks, tasks) = try_join!(
        RiskRepo::list_by_project(pool, project.id),
        TaskRepo::list_by_project(pool, project.id),
    )?;
    Ok(ProjectBundle {
        project,
        risks,
        tasks,
    })
}

/// Portfolio views of every project (newest first) and every risk.
pub async fn load_portfolio(
    pool: &PgPool,
    today: NaiveDate,
    policy: HighRiskPolicy,
) -> Result<(Vec<PortfolioProject>, Vec<PortfolioRisk>), sqlx::Error> {
    let projects = ProjectRepo::list_all(pool).await?;
    let bundles = load_bundles(pool, projects).await?;
    let projects = bundles
        .iter()
        .map(|b| b.to_portfolio(today, policy))
        .collect();
    let risks = RiskRepo::list_all_with_project(pool)
        .await?
        .iter()
        .map(|r| r.to_portfolio())
        .collect();
    Ok((projects, risks))
}

fn group_by_project<T>(rows: Vec<T>, key: impl Fn(&T) -> DbId) -> HashMap<DbId, Vec<T>> {
    let mut grouped: HashMap<DbId, Vec<T>> = HashMap::new();
    for row in rows {
        grouped.entry(key(&row)).or_default().push(row);
    }
    grouped
}
