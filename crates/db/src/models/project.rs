//! Project entity model and DTOs.

use pmo_core::domain::{Priority, ProjectStatus};
use pmo_core::metrics::ProjectFigures;
use pmo_core::portfolio::PortfolioProject;
use pmo_core::types::{Date, DbId, Money, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A project row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub name: String,
    pub code: String,
    pub description: String,
    #[sqlx(try_from = "String")]
    pub status: ProjectStatus,
    #[sqlx(try_from = "String")]
    pub priority: Priority,
    pub start_date: Date,
    pub planned_end_date: Date,
    pub actual_end_date: Option<Date>,
    pub budget: Money,
    pub spent: Money,
    pub completion_percentage: i32,
    pub spi: Money,
    pub cpi: Money,
    pub project_manager: String,
    pub sponsor: String,
    pub team_size: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Project {
    /// The figures the metrics module works on.
    pub fn figures(&self) -> ProjectFigures {
        ProjectFigures {
            start_date: Some(self.start_date),
            planned_end_date: Some(self.planned_end_date),
            actual_end_date: self.actual_end_date,
            budget: Some(self.budget),
            spent: Some(self.spent),
            completion_percentage: self.completion_percentage,
            spi: self.spi,
            cpi: self.cpi,
        }
    }

    /// Portfolio view of this project with a precomputed health score.
    pub fn to_portfolio(&self, health_score: i32) -> PortfolioProject {
        PortfolioProject {
            id: self.id,
            name: self.name.clone(),
            code: self.code.clone(),
            status: self.status,
            priority: self.priority,
            budget: self.budget,
            spent: self.spent,
            completion_percentage: self.completion_percentage,
            spi: self.spi,
            cpi: self.cpi,
            health_score,
        }
    }
}

/// DTO for creating a new project.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProject {
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    /// Defaults to `on_track` if omitted.
    pub status: Option<ProjectStatus>,
    /// Defaults to `medium` if omitted.
    pub priority: Option<Priority>,
    pub start_date: Date,
    pub planned_end_date: Date,
    pub actual_end_date: Option<Date>,
    pub budget: Option<Money>,
    pub spent: Option<Money>,
    pub completion_percentage: Option<i32>,
    pub spi: Option<Money>,
    pub cpi: Option<Money>,
    pub project_manager: String,
    pub sponsor: Option<String>,
    pub team_size: Option<i32>,
}

/// DTO for updating an existing project. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub code: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub priority: Option<Priority>,
    pub start_date: Option<Date>,
    pub planned_end_date: Option<Date>,
    pub actual_end_date: Option<Date>,
    pub budget: Option<Money>,
    pub spent: Option<Money>,
    pub completion_percentage: Option<i32>,
    pub spi: Option<Money>,
    pub cpi: Option<Money>,
    pub project_manager: Option<String>,
    pub sponsor: Option<String>,
    pub team_size: Option<i32>,
}

/// Query parameters for the project list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectFilter {
    pub status: Option<ProjectStatus>,
    pub priority: Option<Priority>,
    pub project_manager: Option<String>,
    /// Matched against name, code and description.
    pub search: Option<String>,
    /// Column name, `-` prefix for descending.
    pub ordering: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
