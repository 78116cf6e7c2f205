//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches
//! - A `Deserialize` filter struct for list endpoints where applicable

pub mod activity_log;
pub mod issue;
pub mod milestone;
pub mod project;
pub mod resource;
pub mod risk;
pub mod session;
pub mod snapshot;
pub mod task;
pub mod user;
