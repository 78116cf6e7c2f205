//! Portfolio-wide aggregation for dashboards and analytics.
//!
//! The inputs are lightweight views over the stored rows with each project's
//! health score already computed, so these functions stay pure and cheap to
//! test. Averages are rounded for display; counts are exact.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::domain::{Priority, ProjectStatus, RiskCategory, RiskStatus, Severity, TaskStatus};
use crate::metrics::{self, INDEX_WARNING_THRESHOLD};
use crate::types::{DbId, Money};

/// SPI at or above this value counts as "ahead of schedule".
pub const SPI_AHEAD_THRESHOLD: Decimal = Decimal::from_parts(11, 0, 0, false, 1);

/// How many projects appear in the top / bottom health rankings.
pub const HEALTH_RANKING_SIZE: usize = 5;

/// How many projects appear in the worst-variance budget list.
pub const BUDGET_VARIANCE_LIST_SIZE: usize = 10;

/// How many risks appear in the top-risk list.
pub const TOP_RISK_LIST_SIZE: usize = 15;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioProject {
    pub id: DbId,
    pub name: String,
    pub code: String,
    pub status: ProjectStatus,
    pub priority: Priority,
    pub budget: Money,
    pub spent: Money,
    pub completion_percentage: i32,
    pub spi: Money,
    pub cpi: Money,
    pub health_score: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioRisk {
    pub id: DbId,
    pub project_id: DbId,
    pub project_code: String,
    pub title: String,
    pub category: RiskCategory,
    pub severity: Severity,
    pub status: RiskStatus,
    pub probability: i32,
    pub impact: i32,
}

impl PortfolioRisk {
    pub fn risk_score(&self) -> Money {
        metrics::risk_score(self.probability, self.impact)
    }

    /// High or critical, regardless of the health-score policy.
    pub fn is_high_or_critical(&self) -> bool {
        matches!(self.severity, Severity::High | Severity::Critical)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortfolioTask {
    pub status: TaskStatus,
    pub due_date: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn average<I>(values: I, dp: u32) -> Money
where
    I: IntoIterator<Item = Money>,
{
    let mut sum = Decimal::ZERO;
    let mut n: i64 = 0;
    for v in values {
        sum += v;
        n += 1;
    }
    if n == 0 {
        return Decimal::ZERO;
    }
    (sum / Decimal::from(n)).round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Count items per code, with every known code present (zero when absent).
fn count_by<T>(
    items: &[T],
    all_codes: impl IntoIterator<Item = &'static str>,
    code: impl Fn(&T) -> &'static str,
) -> BTreeMap<&'static str, usize> {
    let mut counts: BTreeMap<&'static str, usize> = all_codes.into_iter().map(|c| (c, 0)).collect();
    for item in items {
        *counts.entry(code(item)).or_default() += 1;
    }
    counts
}

// ---------------------------------------------------------------------------
// Dashboard stats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceStats {
    pub projects_behind_schedule: usize,
    pub projects_overbudget: usize,
    pub avg_completion: Money,
    pub avg_spi: Money,
    pub avg_cpi: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskStats {
    pub total_risks: usize,
    /// High and critical together.
    pub high_risks: usize,
    pub open_risks: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_projects: usize,
    pub by_status: BTreeMap<&'static str, usize>,
    pub by_priority: BTreeMap<&'static str, usize>,
    pub performance: PerformanceStats,
    pub risks: RiskStats,
}

pub fn dashboard_stats(projects: &[PortfolioProject], risks: &[PortfolioRisk]) -> DashboardStats {
    DashboardStats {
        total_projects: projects.len(),
        by_status: count_by(
            projects,
            ProjectStatus::ALL.iter().map(|s| s.as_str()),
            |p| p.status.as_str(),
        ),
        by_priority: count_by(
            projects,
            Priority::ALL.iter().map(|p| p.as_str()),
            |p| p.priority.as_str(),
        ),
        performance: PerformanceStats {
            projects_behind_schedule: projects
                .iter()
                .filter(|p| metrics::is_behind_schedule(p.spi))
                .count(),
            projects_overbudget: projects
                .iter()
                .filter(|p| metrics::is_overbudget(Some(p.budget), Some(p.spent)))
                .count(),
            avg_completion: average(projects.iter().map(|p| p.completion_percentage.into()), 2),
            avg_spi: average(projects.iter().map(|p| p.spi), 2),
            avg_cpi: average(projects.iter().map(|p| p.cpi), 2),
        },
        risks: RiskStats {
            total_risks: risks.len(),
            high_risks: risks.iter().filter(|r| r.is_high_or_critical()).count(),
            open_risks: risks.iter().filter(|r| r.status == RiskStatus::Open).count(),
        },
    }
}

// ---------------------------------------------------------------------------
// At-risk filter
// ---------------------------------------------------------------------------

/// At risk by status, or by either performance index below 0.9.
pub fn is_at_risk(project: &PortfolioProject) -> bool {
    matches!(project.status, ProjectStatus::AtRisk | ProjectStatus::Delayed)
        || project.spi < INDEX_WARNING_THRESHOLD
        || project.cpi < INDEX_WARNING_THRESHOLD
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetOverview {
    pub total_budget: Money,
    pub total_spent: Money,
    pub budget_variance: Money,
    /// Spent as a percentage of budget, one decimal place.
    pub budget_utilization: Money,
}

pub fn budget_overview(projects: &[PortfolioProject]) -> BudgetOverview {
    let total_budget: Money = projects.iter().map(|p| p.budget).sum();
    let total_spent: Money = projects.iter().map(|p| p.spent).sum();
    let budget_utilization = if total_budget > Decimal::ZERO {
        (total_spent * Decimal::ONE_HUNDRED / total_budget)
            .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
    } else {
        Decimal::ZERO
    };
    BudgetOverview {
        total_budget,
        total_spent,
        budget_variance: total_budget - total_spent,
        budget_utilization,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TaskTotals {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub overdue: usize,
}

pub fn task_totals(tasks: &[PortfolioTask], today: NaiveDate) -> TaskTotals {
    TaskTotals {
        total: tasks.len(),
        completed: tasks.iter().filter(|t| t.status == TaskStatus::Completed).count(),
        in_progress: tasks.iter().filter(|t| t.status == TaskStatus::InProgress).count(),
        overdue: tasks
            .iter()
            .filter(|t| t.status.is_pending() && t.due_date.is_some_and(|d| d < today))
            .count(),
    }
}

/// Risk counts keyed by severity code.
pub fn risks_by_severity(severities: &[Severity]) -> BTreeMap<&'static str, usize> {
    count_by(
        severities,
        Priority::ALL.iter().map(|s| s.as_str()),
        |s| s.as_str(),
    )
}

/// Top and bottom projects by health score among non-completed projects.
///
/// Ties keep the input order. The bottom list is ordered worst-last, matching
/// the tail of the ranked list.
pub fn health_rankings(
    projects: &[PortfolioProject],
    size: usize,
) -> (Vec<&PortfolioProject>, Vec<&PortfolioProject>) {
    let mut active: Vec<&PortfolioProject> =
        projects.iter().filter(|p| p.status.is_active()).collect();
    active.sort_by(|a, b| b.health_score.cmp(&a.health_score));

    let top = active.iter().take(size).copied().collect();
    let bottom_start = active.len().saturating_sub(size);
    let bottom = active[bottom_start..].to_vec();
    (top, bottom)
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SpiDistribution {
    pub ahead: usize,
    pub on_track: usize,
    pub behind: usize,
}

/// Bucket projects into ahead (>= 1.1), on track (0.9 to 1.1), behind (< 0.9).
pub fn spi_distribution(projects: &[PortfolioProject]) -> SpiDistribution {
    let mut dist = SpiDistribution::default();
    for p in projects {
        if p.spi >= SPI_AHEAD_THRESHOLD {
            dist.ahead += 1;
        } else if p.spi >= INDEX_WARNING_THRESHOLD {
            dist.on_track += 1;
        } else {
            dist.behind += 1;
        }
    }
    dist
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetVarianceEntry {
    pub project_id: DbId,
    pub project_name: String,
    pub budget: Money,
    pub spent: Money,
    pub variance: Money,
}

/// Projects with the most negative `budget - spent` first.
///
/// Projects with no budget or no spend are left out.
pub fn worst_budget_variances(
    projects: &[PortfolioProject],
    limit: usize,
) -> Vec<BudgetVarianceEntry> {
    let mut entries: Vec<BudgetVarianceEntry> = projects
        .iter()
        .filter(|p| !p.budget.is_zero() && !p.spent.is_zero())
        .map(|p| BudgetVarianceEntry {
            project_id: p.id,
            project_name: p.name.clone(),
            budget: p.budget,
            spent: p.spent,
            variance: p.budget - p.spent,
        })
        .collect();
    entries.sort_by(|a, b| a.variance.cmp(&b.variance));
    entries.truncate(limit);
    entries
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub category: RiskCategory,
    pub count: usize,
}

/// Risk counts per category, largest first. Empty categories are omitted.
pub fn risk_category_counts(risks: &[PortfolioRisk]) -> Vec<CategoryCount> {
    let by_code = count_by(
        risks,
        RiskCategory::ALL.iter().map(|c| c.as_str()),
        |r| r.category.as_str(),
    );
    let mut counts: Vec<CategoryCount> = RiskCategory::ALL
        .iter()
        .map(|c| CategoryCount {
            category: *c,
            count: by_code.get(c.as_str()).copied().unwrap_or(0),
        })
        .filter(|c| c.count > 0)
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// Highest risk scores first.
pub fn top_risks_by_score(risks: &[PortfolioRisk], limit: usize) -> Vec<&PortfolioRisk> {
    let mut sorted: Vec<&PortfolioRisk> = risks.iter().collect();
    sorted.sort_by(|a, b| b.risk_score().cmp(&a.risk_score()));
    sorted.truncate(limit);
    sorted
}

/// Live risks ordered most severe first, then by probability.
pub fn top_live_risks(risks: &[PortfolioRisk], limit: usize) -> Vec<&PortfolioRisk> {
    let mut live: Vec<&PortfolioRisk> = risks.iter().filter(|r| r.status.is_live()).collect();
    live.sort_by(|a, b| {
        severity_rank(b.severity)
            .cmp(&severity_rank(a.severity))
            .then(b.probability.cmp(&a.probability))
    });
    live.truncate(limit);
    live
}

pub fn severity_rank(severity: Severity) -> u8 {
    match severity {
        Severity::Low => 1,
        Severity::Medium => 2,
        Severity::High => 3,
        Severity::Critical => 4,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
