//! Request handlers for the portfolio API.
//!
//! Entity modules (projects, risks, tasks, resources, milestones, issues)
//! provide create, list, get_by_id, update and delete handlers backed by the
//! matching repository in `pmo_db`. The remaining modules serve derived
//! views: analytics, reports, exports and AI summaries.

pub mod admin;
pub mod ai;
pub mod analytics;
pub mod auth;
pub mod export;
pub mod issues;
pub mod milestones;
pub mod projects;
pub mod reports;
pub mod resources;
pub mod risks;
pub mod tasks;
