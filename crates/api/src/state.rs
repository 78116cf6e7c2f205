use std::sync::Arc;

use pmo_ai::AiEngine;
use pmo_events::{ActivityEvent, EventBus};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: pmo_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Activity events published by handlers.
    pub event_bus: Arc<EventBus>,
    /// Narrative summaries (remote model or demo payloads).
    pub ai: Arc<AiEngine>,
}

impl AppState {
    /// Publish an activity event. Dropped silently when nobody listens.
    pub fn record(&self, event: ActivityEvent) {
        self.event_bus.publish(event);
    }
}
