//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is shared via `Arc<EventBus>` across the application.
//! Handlers publish an [`ActivityEvent`] after each audited action.

use chrono::{DateTime, Utc};
use pmo_core::domain::ActivityAction;
use pmo_core::types::DbId;
use serde::Serialize;
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// ActivityEvent
// ---------------------------------------------------------------------------

/// A user action worth recording in the activity log.
///
/// Constructed via [`ActivityEvent::new`] and enriched with
/// [`with_object`](ActivityEvent::with_object),
/// [`with_description`](ActivityEvent::with_description) and
/// [`with_ip`](ActivityEvent::with_ip).
#[derive(Debug, Clone, Serialize)]
pub struct ActivityEvent {
    pub action: ActivityAction,

    /// The user that performed the action.
    pub user_id: DbId,

    /// Entity kind the action applied to (e.g. `"project"`, `"risk"`).
    pub model_name: Option<String>,

    pub object_id: Option<DbId>,

    /// Short human-readable summary.
    pub description: String,

    pub ip_address: Option<String>,

    pub timestamp: DateTime<Utc>,
}

impl ActivityEvent {
    pub fn new(action: ActivityAction, user_id: DbId) -> Self {
        Self {
            action,
            user_id,
            model_name: None,
            object_id: None,
            description: String::new(),
            ip_address: None,
            timestamp: Utc::now(),
        }
    }

    /// Attach the entity the action applied to.
    pub fn with_object(mut self, model_name: impl Into<String>, object_id: DbId) -> Self {
        self.model_name = Some(model_name.into());
        self.object_id = Some(object_id);
        self
    }

    /// Attach an entity kind without a specific row (e.g. a bulk export).
    pub fn with_model(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = Some(model_name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_ip(mut self, ip_address: Option<String>) -> Self {
        self.ip_address = ip_address;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// # Usage
///
/// ```rust
/// use pmo_core::domain::ActivityAction;
/// use pmo_events::bus::{ActivityEvent, EventBus};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(ActivityEvent::new(ActivityAction::Login, 1));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<ActivityEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    pub fn publish(&self, event: ActivityEvent) {
        // A SendError only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ActivityEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
