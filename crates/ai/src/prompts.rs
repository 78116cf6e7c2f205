//! System instruction and prompt templates.
//!
//! Every template asks for a JSON reply. Monetary and ratio values are
//! converted to `f64` before they are written into a prompt.

use pmo_core::domain::{ProjectStatus, RiskCategory, Severity};
use pmo_core::types::Money;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

/// Fixed system instruction sent with every request.
pub const SYSTEM_PROMPT: &str = "You are an enterprise-grade AI Project Management Office (PMO) Assistant.
Your mission is to help PMO teams, Project Managers, and Executives
understand project and portfolio health, risks, performance, and actions
based ONLY on the data provided to you.

GENERAL RULES:
- Use clear, business-friendly language
- Be concise, executive-ready, and decision-oriented
- Avoid technical jargon unless explicitly requested
- Never hallucinate or assume missing data
- If data is insufficient, state it clearly
- Always explain WHY, not just WHAT
- Prioritize impact and recommended actions

OUTPUT FORMATTING:
- Use simple bullet points (\u{2022}) for lists
- Use numbered lists (1. 2. 3.) for sequential actions
- Use clear section headers (no emojis, no markdown bold)
- Keep paragraphs short (2-3 sentences max)
- Use proper spacing between sections
- Start with most important information first

RESPONSE STRUCTURE:
For any analysis, organize as:
1. Summary statement (1-2 lines)
2. Key findings (bullet points)
3. Details by category (if needed)
4. Recommendations (numbered list)

YOU CAN:
- Summarize project status
- Explain risks and root causes
- Generate executive summaries
- Answer PMO questions
- Compare projects
- Provide recommendations
- Identify trends and patterns

YOU CANNOT:
- Invent metrics
- Change KPI definitions
- Access external systems
- Make decisions for users
- Guarantee outcomes";

/// Which template produced a prompt. Used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    ProjectSummary,
    PortfolioSummary,
    RiskAnalysis,
    Question,
    ProjectComparison,
    ExecutiveReport,
}

impl PromptKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PromptKind::ProjectSummary => "project_summary",
            PromptKind::PortfolioSummary => "portfolio_summary",
            PromptKind::RiskAnalysis => "risk_analysis",
            PromptKind::Question => "question",
            PromptKind::ProjectComparison => "project_comparison",
            PromptKind::ExecutiveReport => "executive_report",
        }
    }
}

impl std::fmt::Display for PromptKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lossy conversion used for every decimal that reaches a prompt.
pub fn to_f64(value: Money) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

fn pretty<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ProjectSummaryInput {
    pub name: String,
    pub status: ProjectStatus,
    pub completion_percentage: i32,
    pub spi: Money,
    pub cpi: Money,
    pub total_risks: usize,
    pub high_risks: usize,
    pub budget: Money,
    pub spent: Money,
    pub days_remaining: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PortfolioSummaryInput {
    pub total_projects: usize,
    pub on_track: usize,
    pub at_risk: usize,
    pub delayed: usize,
    pub completed: usize,
    pub projects_behind_schedule: usize,
    pub avg_completion: f64,
    pub avg_spi: f64,
    pub total_risks: usize,
    pub high_risks: usize,
}

#[derive(Debug, Clone)]
pub struct RiskAnalysisInput {
    pub title: String,
    pub category: RiskCategory,
    pub severity: Severity,
    pub probability: i32,
    pub impact: i32,
    pub description: String,
    pub mitigation_plan: String,
}

/// Status counts given as context to free-form questions.
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioCounts {
    pub total_projects: usize,
    pub on_track: usize,
    pub at_risk: usize,
    pub delayed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentProject {
    pub name: String,
    pub code: String,
    pub status: ProjectStatus,
    pub spi: f64,
    pub completion_percentage: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionContext {
    pub portfolio: PortfolioCounts,
    pub recent_projects: Vec<RecentProject>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparedProject {
    pub name: String,
    pub code: String,
    pub status: ProjectStatus,
    pub completion_percentage: i32,
    pub spi: f64,
    pub cpi: f64,
    pub health_score: i32,
    pub total_risks: usize,
    pub high_risks: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExecutivePortfolio {
    pub total_projects: usize,
    pub on_track: usize,
    pub at_risk: usize,
    pub delayed: usize,
    pub avg_completion: f64,
    pub projects_behind_schedule: usize,
    pub total_risks: usize,
    pub high_risks: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExecutiveProject {
    pub name: String,
    pub status: ProjectStatus,
    pub spi: f64,
    pub completion_percentage: i32,
    pub health_score: i32,
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

pub fn project_summary(input: &ProjectSummaryInput) -> String {
    format!(
        "Generate a project status summary using the following data:

Project Name: {name}
Status: {status}
Completion Percentage: {completion}
SPI: {spi}
CPI: {cpi}
Total Risks: {total_risks}
High Risks: {high_risks}
Budget: {budget}
Spent: {spent}
Days Remaining: {days_remaining}

Return a JSON response with: context, health_summary, key_metrics, risk_analysis, insights, recommendations, data_gaps",
        name = input.name,
        status = input.status,
        completion = input.completion_percentage,
        spi = to_f64(input.spi),
        cpi = to_f64(input.cpi),
        total_risks = input.total_risks,
        high_risks = input.high_risks,
        budget = to_f64(input.budget),
        spent = to_f64(input.spent),
        days_remaining = input.days_remaining,
    )
}

pub fn portfolio_summary(input: &PortfolioSummaryInput) -> String {
    format!(
        "Generate a portfolio-level executive summary.

Total Projects: {total}
On Track: {on_track}
At Risk: {at_risk}
Delayed: {delayed}
Projects with SPI < 0.9: {behind}
Average Completion: {avg_completion}%
Total Risks: {total_risks}
High Priority Risks: {high_risks}

Return a JSON response with: context, health_summary, key_metrics, insights, recommendations, data_gaps",
        total = input.total_projects,
        on_track = input.on_track,
        at_risk = input.at_risk,
        delayed = input.delayed,
        behind = input.projects_behind_schedule,
        avg_completion = input.avg_completion,
        total_risks = input.total_risks,
        high_risks = input.high_risks,
    )
}

pub fn risk_analysis(input: &RiskAnalysisInput) -> String {
    format!(
        "Analyze this project risk:

Risk Title: {title}
Category: {category}
Severity: {severity}
Probability: {probability}%
Impact: {impact}/10
Description: {description}
Current Mitigation: {mitigation}

Provide detailed risk analysis including:
- Root cause analysis
- Business impact assessment
- Recommended mitigation strategies
- Monitoring approach

Return a JSON response.",
        title = input.title,
        category = input.category,
        severity = input.severity,
        probability = input.probability,
        impact = input.impact,
        description = input.description,
        mitigation = input.mitigation_plan,
    )
}

pub fn question(question: &str, context: &QuestionContext) -> String {
    format!(
        "Answer the PMO question below using the provided data.

User Question: \"{question}\"

Context Data:
{context}

Provide a clear, actionable answer. Return a JSON response.",
        context = pretty(context),
    )
}

pub fn compare_projects(projects: &[ComparedProject]) -> String {
    format!(
        "Compare the following projects and identify patterns, risks, and recommendations:

{projects}

Analyze:
- Performance trends
- Common risk patterns
- Resource allocation efficiency
- Recommendations for improvement

Return a JSON response.",
        projects = pretty(projects),
    )
}

pub fn executive_report(portfolio: &ExecutivePortfolio, projects: &[ExecutiveProject]) -> String {
    format!(
        "Generate an executive-level PMO report.

Portfolio Overview:
{portfolio}

Key Projects:
{projects}

Provide:
- Executive summary
- Key performance indicators
- Critical issues and risks
- Strategic recommendations
- Action items

Return a JSON response suitable for C-level presentation.",
        portfolio = pretty(portfolio),
        projects = pretty(projects),
    )
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn summary_input() -> ProjectSummaryInput {
        ProjectSummaryInput {
            name: "ERP Rollout".into(),
            status: ProjectStatus::AtRisk,
            completion_percentage: 45,
            spi: dec!(0.86),
            cpi: dec!(0.92),
            total_risks: 4,
            high_risks: 1,
            budget: dec!(500000.00),
            spent: dec!(320000.50),
            days_remaining: 30,
        }
    }

    #[test]
    fn project_summary_interpolates_figures_as_floats() {
        let prompt = project_summary(&summary_input());
        assert!(prompt.starts_with("Generate a project status summary"));
        assert!(prompt.contains("Project Name: ERP Rollout"));
        assert!(prompt.contains("Status: at_risk"));
        assert!(prompt.contains("SPI: 0.86"));
        assert!(prompt.contains("Spent: 320000.5"));
        assert!(prompt.contains("Days Remaining: 30"));
    }

    #[test]
    fn portfolio_prompt_mentions_portfolio() {
        let prompt = portfolio_summary(&PortfolioSummaryInput {
            total_projects: 10,
            on_track: 6,
            at_risk: 2,
            delayed: 1,
            completed: 1,
            projects_behind_schedule: 3,
            avg_completion: 52.5,
            avg_spi: 0.95,
            total_risks: 12,
            high_risks: 4,
        });
        assert!(prompt.to_lowercase().contains("portfolio"));
        assert!(prompt.contains("Average Completion: 52.5%"));
        assert!(prompt.contains("Projects with SPI < 0.9: 3"));
    }

    #[test]
    fn risk_prompt_includes_scales() {
        let prompt = risk_analysis(&RiskAnalysisInput {
            title: "Vendor delay".into(),
            category: RiskCategory::External,
            severity: Severity::High,
            probability: 70,
            impact: 8,
            description: "Supplier capacity".into(),
            mitigation_plan: "Second source".into(),
        });
        assert!(prompt.contains("Probability: 70%"));
        assert!(prompt.contains("Impact: 8/10"));
        assert!(prompt.contains("Category: external"));
    }

    #[test]
    fn question_prompt_embeds_context_json() {
        let context = QuestionContext {
            portfolio: PortfolioCounts {
                total_projects: 2,
                on_track: 1,
                at_risk: 1,
                delayed: 0,
            },
            recent_projects: vec![RecentProject {
                name: "Data Lake".into(),
                code: "DL-1".into(),
                status: ProjectStatus::OnTrack,
                spi: to_f64(dec!(1.05)),
                completion_percentage: 60,
            }],
        };
        let prompt = question("Which project is late?", &context);
        assert!(prompt.contains("User Question: \"Which project is late?\""));
        assert!(prompt.contains("\"code\": \"DL-1\""));
        assert!(prompt.contains("\"spi\": 1.05"));
    }

    #[test]
    fn executive_prompt_lists_both_sections() {
        let portfolio = ExecutivePortfolio {
            total_projects: 1,
            on_track: 0,
            at_risk: 1,
            delayed: 0,
            avg_completion: 40.0,
            projects_behind_schedule: 1,
            total_risks: 2,
            high_risks: 1,
        };
        let projects = [ExecutiveProject {
            name: "CRM".into(),
            status: ProjectStatus::AtRisk,
            spi: 0.8,
            completion_percentage: 40,
            health_score: 55,
        }];
        let prompt = executive_report(&portfolio, &projects);
        assert!(prompt.contains("Portfolio Overview:"));
        assert!(prompt.contains("\"name\": \"CRM\""));
        assert!(prompt.ends_with("C-level presentation."));
    }

    #[test]
    fn to_f64_converts_exactly_representable_values() {
        assert_eq!(to_f64(dec!(0.5)), 0.5);
        assert_eq!(to_f64(dec!(625000)), 625000.0);
    }
}
