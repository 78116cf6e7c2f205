//! Project performance metrics (SPI/CPI indicators, earned value, health score).
//!
//! Every function here is a pure closed-form formula over a project's current
//! figures. Anything that depends on the calendar takes `today` explicitly so
//! results are reproducible and testable. Degenerate inputs (missing dates,
//! zero budget, zero indices) return documented defaults instead of failing.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{IssueStatus, RiskStatus, Severity, TaskStatus};
use crate::types::Money;

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Score every project starts from before penalties.
pub const HEALTH_SCORE_MAX: i32 = 100;

/// An index below this value is "severely" off plan.
pub const INDEX_SEVERE_THRESHOLD: Decimal = Decimal::from_parts(7, 0, 0, false, 1);

/// An index below this value is "moderately" off plan.
pub const INDEX_WARNING_THRESHOLD: Decimal = Decimal::from_parts(9, 0, 0, false, 1);

/// SPI penalty when below [`INDEX_SEVERE_THRESHOLD`].
pub const SPI_SEVERE_PENALTY: i32 = 30;
/// SPI penalty when below [`INDEX_WARNING_THRESHOLD`].
pub const SPI_WARNING_PENALTY: i32 = 15;
/// CPI penalty when below [`INDEX_SEVERE_THRESHOLD`].
pub const CPI_SEVERE_PENALTY: i32 = 20;
/// CPI penalty when below [`INDEX_WARNING_THRESHOLD`].
pub const CPI_WARNING_PENALTY: i32 = 10;

/// Points lost per high-severity risk.
pub const HIGH_RISK_PENALTY: i32 = 10;
/// Cap on the total high-risk penalty.
pub const HIGH_RISK_PENALTY_CAP: i32 = 30;

/// Points lost per overdue task.
pub const OVERDUE_TASK_PENALTY: i32 = 5;
/// Cap on the total overdue-task penalty.
pub const OVERDUE_TASK_PENALTY_CAP: i32 = 20;

// ---------------------------------------------------------------------------
// High-risk policy
// ---------------------------------------------------------------------------

/// Which risk severities count as "high" for the health-score penalty.
///
/// The live health score has historically counted only `high`, while the
/// snapshot job and dashboards count `high` and `critical` together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighRiskPolicy {
    /// Only `severity == high` is penalised.
    HighOnly,
    /// Both `high` and `critical` are penalised.
    HighOrCritical,
}

/// Policy used when nothing else is configured.
pub const DEFAULT_HIGH_RISK_POLICY: HighRiskPolicy = HighRiskPolicy::HighOnly;

impl HighRiskPolicy {
    pub fn counts(self, severity: Severity) -> bool {
        match self {
            HighRiskPolicy::HighOnly => severity == Severity::High,
            HighRiskPolicy::HighOrCritical => {
                matches!(severity, Severity::High | Severity::Critical)
            }
        }
    }

    /// The configuration value naming this policy.
    pub fn as_str(self) -> &'static str {
        match self {
            HighRiskPolicy::HighOnly => "high",
            HighRiskPolicy::HighOrCritical => "high_or_critical",
        }
    }

    /// Parse the `HIGH_RISK_POLICY` configuration value.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "high" | "high_only" => Some(HighRiskPolicy::HighOnly),
            "high_or_critical" => Some(HighRiskPolicy::HighOrCritical),
            _ => None,
        }
    }
}

impl Default for HighRiskPolicy {
    fn default() -> Self {
        DEFAULT_HIGH_RISK_POLICY
    }
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// The project figures the metrics are computed from.
///
/// `budget` and `spent` are optional so that callers with partial data get
/// the documented defaults. A zero budget is treated the same as a missing one
/// by the earned-value formulas.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectFigures {
    pub start_date: Option<NaiveDate>,
    pub planned_end_date: Option<NaiveDate>,
    pub actual_end_date: Option<NaiveDate>,
    pub budget: Option<Money>,
    pub spent: Option<Money>,
    pub completion_percentage: i32,
    pub spi: Money,
    pub cpi: Money,
}

impl Default for ProjectFigures {
    fn default() -> Self {
        Self {
            start_date: None,
            planned_end_date: None,
            actual_end_date: None,
            budget: None,
            spent: None,
            completion_percentage: 0,
            spi: Decimal::ONE,
            cpi: Decimal::ONE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskFigures {
    pub severity: Severity,
    pub status: RiskStatus,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaskFigures {
    pub status: TaskStatus,
    pub due_date: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Project indicators
// ---------------------------------------------------------------------------

/// Health score in `[0, 100]`.
///
/// Starts at 100 and subtracts penalties for SPI, CPI, high-severity risks
/// (per `policy`) and tasks that are still pending past their due date.
pub fn health_score(
    project: &ProjectFigures,
    risks: &[RiskFigures],
    tasks: &[TaskFigures],
    today: NaiveDate,
    policy: HighRiskPolicy,
) -> i32 {
    let high_risks = count_high_risks(risks, policy);
    let overdue = tasks
        .iter()
        .filter(|t| t.status.is_pending() && t.due_date.is_some_and(|d| d < today))
        .count();
    health_score_from_counts(project.spi, project.cpi, high_risks, overdue)
}

/// Health score from pre-aggregated counts.
///
/// Used when the caller already has the counts (e.g. from SQL aggregates).
pub fn health_score_from_counts(
    spi: Money,
    cpi: Money,
    high_risk_count: usize,
    overdue_task_count: usize,
) -> i32 {
    let mut score = HEALTH_SCORE_MAX;

    if spi < INDEX_SEVERE_THRESHOLD {
        score -= SPI_SEVERE_PENALTY;
    } else if spi < INDEX_WARNING_THRESHOLD {
        score -= SPI_WARNING_PENALTY;
    }

    if cpi < INDEX_SEVERE_THRESHOLD {
        score -= CPI_SEVERE_PENALTY;
    } else if cpi < INDEX_WARNING_THRESHOLD {
        score -= CPI_WARNING_PENALTY;
    }

    score -= capped_penalty(high_risk_count, HIGH_RISK_PENALTY, HIGH_RISK_PENALTY_CAP);
    score -= capped_penalty(
        overdue_task_count,
        OVERDUE_TASK_PENALTY,
        OVERDUE_TASK_PENALTY_CAP,
    );

    score.max(0)
}

/// Count risks that the policy treats as high severity.
pub fn count_high_risks(risks: &[RiskFigures], policy: HighRiskPolicy) -> usize {
    risks.iter().filter(|r| policy.counts(r.severity)).count()
}

/// `min(count * per_item, cap)` without overflowing on huge counts.
fn capped_penalty(count: usize, per_item: i32, cap: i32) -> i32 {
    let max_items = (cap / per_item) as usize + 1;
    (count.min(max_items) as i32 * per_item).min(cap)
}

/// `true` when spending strictly exceeds the budget.
pub fn is_overbudget(budget: Option<Money>, spent: Option<Money>) -> bool {
    match (budget, spent) {
        (Some(budget), Some(spent)) => spent > budget,
        _ => false,
    }
}

/// `true` when the schedule performance index is below 0.9.
pub fn is_behind_schedule(spi: Money) -> bool {
    spi < INDEX_WARNING_THRESHOLD
}

/// `budget - spent`, or zero when either is missing.
pub fn budget_variance(budget: Option<Money>, spent: Option<Money>) -> Money {
    match (budget, spent) {
        (Some(budget), Some(spent)) => budget - spent,
        _ => Decimal::ZERO,
    }
}

/// Calendar days until the planned end date (negative once passed).
///
/// Zero when the project has already finished or has no planned end.
pub fn days_remaining(project: &ProjectFigures, today: NaiveDate) -> i64 {
    if project.actual_end_date.is_some() {
        return 0;
    }
    project
        .planned_end_date
        .map(|end| (end - today).num_days())
        .unwrap_or(0)
}

/// Earned value: budget times fractional completion.
fn earned_value(budget: Money, completion_percentage: i32) -> Money {
    budget * Decimal::from(completion_percentage) / Decimal::ONE_HUNDRED
}

/// Budget when present and non-zero.
fn effective_budget(project: &ProjectFigures) -> Option<Money> {
    project.budget.filter(|b| !b.is_zero())
}

/// Schedule variance `EV - PV`.
///
/// Planned value assumes linear progress between start and planned end,
/// capped at 100%. Zero when the budget or either date is missing, or when
/// the planned duration is not positive.
pub fn schedule_variance(project: &ProjectFigures, today: NaiveDate) -> Money {
    let Some(budget) = effective_budget(project) else {
        return Decimal::ZERO;
    };
    let (Some(start), Some(end)) = (project.start_date, project.planned_end_date) else {
        return Decimal::ZERO;
    };
    let total_days = (end - start).num_days();
    if total_days <= 0 {
        return Decimal::ZERO;
    }
    let elapsed_days = (today - start).num_days();

    let planned_pct = (Decimal::from(elapsed_days) * Decimal::ONE_HUNDRED
        / Decimal::from(total_days))
    .min(Decimal::ONE_HUNDRED);
    let planned_value = budget * planned_pct / Decimal::ONE_HUNDRED;

    earned_value(budget, project.completion_percentage) - planned_value
}

/// Cost variance `EV - spent`, zero without a budget.
pub fn cost_variance(project: &ProjectFigures) -> Money {
    let Some(budget) = effective_budget(project) else {
        return Decimal::ZERO;
    };
    earned_value(budget, project.completion_percentage) - project.spent.unwrap_or_default()
}

/// Average spend per elapsed calendar day since start.
///
/// Zero before the project starts, without a start date, or with no spend.
pub fn budget_burn_rate(project: &ProjectFigures, today: NaiveDate) -> Money {
    let Some(start) = project.start_date else {
        return Decimal::ZERO;
    };
    let spent = match project.spent {
        Some(s) if !s.is_zero() => s,
        _ => return Decimal::ZERO,
    };
    let elapsed_days = (today - start).num_days();
    if elapsed_days <= 0 {
        return Decimal::ZERO;
    }
    spent / Decimal::from(elapsed_days)
}

/// Projected finish date when the project keeps its current SPI.
///
/// Returns the planned end unchanged when SPI is at least 1, SPI is zero, or
/// the start date is missing. Otherwise stretches the planned duration by
/// `1 / SPI` from the start date (whole days, rounded down).
pub fn projected_completion_date(project: &ProjectFigures) -> Option<NaiveDate> {
    let planned_end = project.planned_end_date?;
    if project.spi.is_zero() || project.spi >= Decimal::ONE {
        return Some(planned_end);
    }
    let Some(start) = project.start_date else {
        return Some(planned_end);
    };

    let total_days = (planned_end - start).num_days();
    let projected_days = Decimal::from(total_days)
        .checked_div(project.spi)
        .and_then(|d| d.floor().to_i64());

    match projected_days {
        Some(days) => start
            .checked_add_signed(chrono::Duration::days(days))
            .or(Some(planned_end)),
        None => Some(planned_end),
    }
}

/// Estimate at completion: `budget / CPI`.
///
/// The budget is returned unchanged when there is no budget or CPI is zero.
pub fn projected_final_cost(budget: Option<Money>, cpi: Money) -> Option<Money> {
    let budget = budget?;
    if budget.is_zero() || cpi.is_zero() {
        return Some(budget);
    }
    Some(budget.checked_div(cpi).unwrap_or(budget))
}

/// Flat view of every derived project indicator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectIndicators {
    pub health_score: i32,
    pub is_overbudget: bool,
    pub is_behind_schedule: bool,
    pub budget_variance: Money,
    pub days_remaining: i64,
    pub schedule_variance: Money,
    pub cost_variance: Money,
    pub budget_burn_rate: Money,
    pub projected_completion_date: Option<NaiveDate>,
    pub projected_final_cost: Option<Money>,
}

/// Compute every indicator for one project in a single pass.
pub fn project_indicators(
    project: &ProjectFigures,
    risks: &[RiskFigures],
    tasks: &[TaskFigures],
    today: NaiveDate,
    policy: HighRiskPolicy,
) -> ProjectIndicators {
    ProjectIndicators {
        health_score: health_score(project, risks, tasks, today, policy),
        is_overbudget: is_overbudget(project.budget, project.spent),
        is_behind_schedule: is_behind_schedule(project.spi),
        budget_variance: budget_variance(project.budget, project.spent),
        days_remaining: days_remaining(project, today),
        schedule_variance: schedule_variance(project, today),
        cost_variance: cost_variance(project),
        budget_burn_rate: budget_burn_rate(project, today),
        projected_completion_date: projected_completion_date(project),
        projected_final_cost: projected_final_cost(project.budget, project.cpi),
    }
}

// ---------------------------------------------------------------------------
// Child entity indicators
// ---------------------------------------------------------------------------

/// `probability / 100 * impact`, in `[0.01, 10]` for valid inputs.
pub fn risk_score(probability: i32, impact: i32) -> Money {
    Decimal::from(probability) * Decimal::from(impact) / Decimal::ONE_HUNDRED
}

/// A task is overdue when it is not terminal and its due date has passed.
pub fn task_is_overdue(status: TaskStatus, due_date: Option<NaiveDate>, today: NaiveDate) -> bool {
    if status.is_terminal() {
        return false;
    }
    due_date.is_some_and(|due| due < today)
}

/// Days until the due date (negative when overdue), zero for terminal tasks.
pub fn task_days_until_due(
    status: TaskStatus,
    due_date: Option<NaiveDate>,
    today: NaiveDate,
) -> i64 {
    if status.is_terminal() {
        return 0;
    }
    due_date.map(|due| (due - today).num_days()).unwrap_or(0)
}

pub fn issue_is_resolved(status: IssueStatus) -> bool {
    status.is_resolved()
}

/// Days between reporting and resolution, or until `today` while unresolved.
pub fn issue_days_open(
    reported_date: NaiveDate,
    resolved_date: Option<NaiveDate>,
    today: NaiveDate,
) -> i64 {
    let end = resolved_date.unwrap_or(today);
    (end - reported_date).num_days()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
