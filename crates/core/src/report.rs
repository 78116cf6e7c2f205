//! Executive portfolio report.
//!
//! Assembles the content of the periodic portfolio briefing (summary,
//! health metrics, project status lines, top risks, budget lines and
//! rule-based recommendations) as a serializable structure.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::domain::{ProjectStatus, RiskStatus, Severity};
use crate::metrics::INDEX_WARNING_THRESHOLD;
use crate::portfolio::{self, PortfolioProject, PortfolioRisk};
use crate::types::{DbId, Money};

/// Number of project status lines in the report.
pub const STATUS_LINES: usize = 5;

/// Number of risks listed in the report.
pub const RISK_LINES: usize = 10;

/// Recommendation emitted when no rule fires.
pub const HEALTHY_RECOMMENDATION: &str = "Portfolio is healthy - maintain current monitoring";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutiveSummary {
    pub total_projects: usize,
    pub on_track: usize,
    pub at_risk: usize,
    pub delayed: usize,
    pub on_track_pct: Money,
    pub at_risk_pct: Money,
    pub delayed_pct: Money,
    pub total_budget: Money,
    pub total_spent: Money,
    pub spent_pct: Money,
    pub average_health_score: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthMetrics {
    pub projects: usize,
    pub avg_completion: Money,
    pub avg_spi: Money,
    pub avg_cpi: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectStatusLine {
    pub project_id: DbId,
    pub name: String,
    pub status: ProjectStatus,
    pub completion_percentage: i32,
    pub health_score: i32,
    pub spi: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskLine {
    pub risk_id: DbId,
    pub project_code: String,
    pub title: String,
    pub severity: Severity,
    pub status: RiskStatus,
    pub probability: i32,
    pub impact: i32,
    pub risk_score: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetLine {
    pub project_id: DbId,
    pub name: String,
    pub budget: Money,
    pub spent: Money,
    pub spent_pct: Money,
    pub within_budget: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioReport {
    pub generated_on: NaiveDate,
    pub executive_summary: ExecutiveSummary,
    pub health_metrics: HealthMetrics,
    pub project_status: Vec<ProjectStatusLine>,
    pub top_risks: Vec<RiskLine>,
    pub budget_status: Vec<BudgetLine>,
    pub recommendations: Vec<String>,
}

fn pct(part: Money, whole: Money, dp: u32) -> Money {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    (part * Decimal::ONE_HUNDRED / whole).round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

fn count_pct(part: usize, whole: usize) -> Money {
    pct(Decimal::from(part), Decimal::from(whole), 0)
}

fn mean(values: impl Iterator<Item = Money>, count: usize, dp: u32) -> Money {
    if count == 0 {
        return Decimal::ZERO;
    }
    let sum: Money = values.sum();
    (sum / Decimal::from(count)).round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Build the full report. `projects` should be in the listing order
/// (newest first); the status section shows the first [`STATUS_LINES`].
pub fn build_portfolio_report(
    projects: &[PortfolioProject],
    risks: &[PortfolioRisk],
    generated_on: NaiveDate,
) -> PortfolioReport {
    let n = projects.len();
    let count_status = |s: ProjectStatus| projects.iter().filter(|p| p.status == s).count();
    let on_track = count_status(ProjectStatus::OnTrack);
    let at_risk = count_status(ProjectStatus::AtRisk);
    let delayed = count_status(ProjectStatus::Delayed);
    let budget = portfolio::budget_overview(projects);

    let executive_summary = ExecutiveSummary {
        total_projects: n,
        on_track,
        at_risk,
        delayed,
        on_track_pct: count_pct(on_track, n),
        at_risk_pct: count_pct(at_risk, n),
        delayed_pct: count_pct(delayed, n),
        total_budget: budget.total_budget,
        total_spent: budget.total_spent,
        spent_pct: pct(budget.total_spent, budget.total_budget, 0),
        average_health_score: mean(projects.iter().map(|p| p.health_score.into()), n, 0),
    };

    let health_metrics = HealthMetrics {
        projects: n,
        avg_completion: mean(projects.iter().map(|p| p.completion_percentage.into()), n, 1),
        avg_spi: mean(projects.iter().map(|p| p.spi), n, 2),
        avg_cpi: mean(projects.iter().map(|p| p.cpi), n, 2),
    };

    let project_status = projects
        .iter()
        .take(STATUS_LINES)
        .map(|p| ProjectStatusLine {
            project_id: p.id,
            name: p.name.clone(),
            status: p.status,
            completion_percentage: p.completion_percentage,
            health_score: p.health_score,
            spi: p.spi,
        })
        .collect();

    let top_risks = portfolio::top_live_risks(risks, RISK_LINES)
        .into_iter()
        .map(|r| RiskLine {
            risk_id: r.id,
            project_code: r.project_code.clone(),
            title: r.title.clone(),
            severity: r.severity,
            status: r.status,
            probability: r.probability,
            impact: r.impact,
            risk_score: r.risk_score(),
        })
        .collect();

    let budget_status = projects
        .iter()
        .map(|p| {
            let spent_pct = pct(p.spent, p.budget, 1);
            BudgetLine {
                project_id: p.id,
                name: p.name.clone(),
                budget: p.budget,
                spent: p.spent,
                spent_pct,
                within_budget: spent_pct < Decimal::ONE_HUNDRED,
            }
        })
        .collect();

    PortfolioReport {
        generated_on,
        executive_summary,
        health_metrics,
        project_status,
        top_risks,
        budget_status,
        recommendations: recommendations(projects, risks),
    }
}

/// Rule-based recommendations, in priority order.
pub fn recommendations(projects: &[PortfolioProject], risks: &[PortfolioRisk]) -> Vec<String> {
    let mut out = Vec::new();

    let needs_attention = projects
        .iter()
        .filter(|p| matches!(p.status, ProjectStatus::AtRisk | ProjectStatus::Delayed))
        .count();
    if needs_attention > 0 {
        out.push(format!("{needs_attention} projects require immediate attention"));
    }

    let behind = projects
        .iter()
        .filter(|p| p.spi < INDEX_WARNING_THRESHOLD)
        .count();
    if behind > 0 {
        out.push(format!(
            "{behind} projects are behind schedule - consider resource reallocation"
        ));
    }

    let over_budget = projects.iter().filter(|p| p.spent > p.budget).count();
    if over_budget > 0 {
        out.push(format!("{over_budget} projects over budget - conduct cost reviews"));
    }

    let open_high = risks
        .iter()
        .filter(|r| r.is_high_or_critical() && r.status == RiskStatus::Open)
        .count();
    if open_high > 0 {
        out.push(format!("{open_high} high/critical risks need mitigation plans"));
    }

    if out.is_empty() {
        out.push(HEALTHY_RECOMMENDATION.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::domain::{Priority, RiskCategory};

    fn project(id: DbId, status: ProjectStatus, spi: Money, spent: Money) -> PortfolioProject {
        PortfolioProject {
            id,
            name: format!("Project {id}"),
            code: format!("P{id}"),
            status,
            priority: Priority::High,
            budget: dec!(1000),
            spent,
            completion_percentage: 50,
            spi,
            cpi: dec!(1),
            health_score: 80,
        }
    }

    fn open_critical() -> PortfolioRisk {
        PortfolioRisk {
            id: 1,
            project_id: 1,
            project_code: "P1".into(),
            title: "Vendor slip".into(),
            category: RiskCategory::External,
            severity: Severity::Critical,
            status: RiskStatus::Open,
            probability: 70,
            impact: 8,
        }
    }

    #[test]
    fn healthy_portfolio_gets_single_recommendation() {
        let projects = [project(1, ProjectStatus::OnTrack, dec!(1), dec!(100))];
        assert_eq!(recommendations(&projects, &[]), vec![HEALTHY_RECOMMENDATION.to_string()]);
    }

    #[test]
    fn each_rule_fires_independently() {
        let projects = [
            project(1, ProjectStatus::Delayed, dec!(0.8), dec!(1200)),
            project(2, ProjectStatus::OnTrack, dec!(1), dec!(100)),
        ];
        let recs = recommendations(&projects, &[open_critical()]);
        assert_eq!(recs.len(), 4);
        assert!(recs[0].starts_with("1 projects require"));
        assert!(recs[1].contains("behind schedule"));
        assert!(recs[2].contains("over budget"));
        assert!(recs[3].contains("high/critical risks"));
    }

    #[test]
    fn report_sections_are_populated() {
        let projects: Vec<_> = (1..=7)
            .map(|i| project(i, ProjectStatus::OnTrack, dec!(1), dec!(500)))
            .collect();
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let report = build_portfolio_report(&projects, &[open_critical()], today);

        assert_eq!(report.executive_summary.total_projects, 7);
        assert_eq!(report.executive_summary.on_track_pct, dec!(100));
        assert_eq!(report.executive_summary.spent_pct, dec!(50));
        assert_eq!(report.executive_summary.average_health_score, dec!(80));
        assert_eq!(report.project_status.len(), STATUS_LINES);
        assert_eq!(report.top_risks.len(), 1);
        assert_eq!(report.top_risks[0].risk_score, dec!(5.6));
        assert_eq!(report.budget_status.len(), 7);
        assert!(report.budget_status.iter().all(|b| b.within_budget));
    }

    #[test]
    fn empty_report_does_not_divide_by_zero() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let report = build_portfolio_report(&[], &[], today);
        assert_eq!(report.executive_summary.on_track_pct, Decimal::ZERO);
        assert_eq!(report.health_metrics.avg_spi, Decimal::ZERO);
    }
}
