//! In-process activity event bus.
//!
//! - [`EventBus`]: publish/subscribe hub backed by `tokio::sync::broadcast`.
//! - [`ActivityEvent`]: one user action (login, create, export, ...).
//! - [`ActivityPersistence`]: background service that writes every event
//!   to the `activity_logs` table.

pub mod bus;
pub mod persistence;

pub use bus::{ActivityEvent, EventBus};
pub use persistence::ActivityPersistence;
