//! Risk entity model and DTOs.

use pmo_core::domain::{RiskCategory, RiskStatus, Severity};
use pmo_core::metrics::RiskFigures;
use pmo_core::portfolio::PortfolioRisk;
use pmo_core::types::{Date, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A risk row from the `risks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Risk {
    pub id: DbId,
    pub project_id: DbId,
    pub title: String,
    pub description: String,
    #[sqlx(try_from = "String")]
    pub category: RiskCategory,
    #[sqlx(try_from = "String")]
    pub severity: Severity,
    #[sqlx(try_from = "String")]
    pub status: RiskStatus,
    pub probability: i32,
    pub impact: i32,
    pub mitigation_plan: String,
    pub owner: String,
    pub identified_date: Date,
    pub target_closure_date: Option<Date>,
    pub actual_closure_date: Option<Date>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Risk {
    pub fn figures(&self) -> RiskFigures {
        RiskFigures {
            severity: self.severity,
            status: self.status,
        }
    }
}

/// A risk joined with the code of its project, for portfolio views.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RiskWithProject {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub risk: Risk,
    pub project_code: String,
    pub project_name: String,
}

impl RiskWithProject {
    pub fn to_portfolio(&self) -> PortfolioRisk {
        PortfolioRisk {
            id: self.risk.id,
            project_id: self.risk.project_id,
            project_code: self.project_code.clone(),
            title: self.risk.title.clone(),
            category: self.risk.category,
            severity: self.risk.severity,
            status: self.risk.status,
            probability: self.risk.probability,
            impact: self.risk.impact,
        }
    }
}

/// DTO for creating a new risk.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRisk {
    pub project_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub category: RiskCategory,
    pub severity: Severity,
    /// Defaults to `open` if omitted.
    pub status: Option<RiskStatus>,
    pub probability: i32,
    pub impact: i32,
    pub mitigation_plan: Option<String>,
    pub owner: String,
    /// Defaults to the current date if omitted.
    pub identified_date: Option<Date>,
    pub target_closure_date: Option<Date>,
    pub actual_closure_date: Option<Date>,
}

/// DTO for updating an existing risk. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRisk {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<RiskCategory>,
    pub severity: Option<Severity>,
    pub status: Option<RiskStatus>,
    pub probability: Option<i32>,
    pub impact: Option<i32>,
    pub mitigation_plan: Option<String>,
    pub owner: Option<String>,
    pub identified_date: Option<Date>,
    pub target_closure_date: Option<Date>,
    pub actual_closure_date: Option<Date>,
}

/// Query parameters for the risk list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RiskFilter {
    pub project: Option<DbId>,
    pub category: Option<RiskCategory>,
    pub severity: Option<Severity>,
    pub status: Option<RiskStatus>,
    pub ordering: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
