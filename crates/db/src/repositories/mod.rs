//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod activity_log_repo;
pub mod issue_repo;
pub mod milestone_repo;
pub mod project_repo;
pub mod resource_repo;
pub mod risk_repo;
pub mod session_repo;
pub mod snapshot_repo;
pub mod task_repo;
pub mod user_repo;

pub use activity_log_repo::ActivityLogRepo;
pub use issue_repo::IssueRepo;
pub use milestone_repo::MilestoneRepo;
pub use project_repo::ProjectRepo;
pub use resource_repo::ResourceRepo;
pub use risk_repo::RiskRepo;
pub use session_repo::SessionRepo;
pub use snapshot_repo::SnapshotRepo;
pub use task_repo::TaskRepo;
pub use user_repo::UserRepo;
