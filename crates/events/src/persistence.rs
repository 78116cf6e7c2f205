//! Activity log persistence service.
//!
//! [`ActivityPersistence`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! and writes every received [`ActivityEvent`] to the `activity_logs` table.
//! It runs as a long-lived background task and stops when the bus is dropped.

use pmo_db::models::activity_log::{ActivityLog, CreateActivityLog};
use pmo_db::repositories::ActivityLogRepo;
use pmo_db::DbPool;
use tokio::sync::broadcast;

use crate::bus::ActivityEvent;

pub struct ActivityPersistence;

impl ActivityPersistence {
    /// Run the persistence loop until the channel is closed.
    pub async fn run(pool: DbPool, mut receiver: broadcast::Receiver<ActivityEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = Self::persist(&pool, &event).await {
                        tracing::error!(
                            error = %e,
                            action = %event.action,
                            user_id = event.user_id,
                            "Failed to persist activity"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        "Activity persistence lagged, some entries were not recorded"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, activity persistence shutting down");
                    break;
                }
            }
        }
    }

    async fn persist(pool: &DbPool, event: &ActivityEvent) -> Result<ActivityLog, sqlx::Error> {
        let input = CreateActivityLog {
            user_id: event.user_id,
            action: event.action,
            model_name: event.model_name.clone().unwrap_or_default(),
            object_id: event.object_id,
            description: event.description.clone(),
            ip_address: event.ip_address.clone(),
        };
        ActivityLogRepo::create(pool, &input).await
    }
}
