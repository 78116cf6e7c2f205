//! Periodic capture of project snapshots.
//!
//! Runs [`pmo_worker::snapshots::capture_all`] on a fixed interval. The
//! first tick fires immediately, so a freshly started server records the
//! current day without waiting a full interval.

use std::time::Duration;

use chrono::Utc;
use pmo_core::metrics::HighRiskPolicy;
use pmo_worker::snapshots;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

/// Run the snapshot loop until `cancel` is triggered.
pub async fn run(
    pool: PgPool,
    every: Duration,
    policy: HighRiskPolicy,
    cancel: CancellationToken,
) {
    tracing::info!(interval_secs = every.as_secs(), "Snapshot scheduler started");

    let mut interval = tokio::time::interval(every);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Snapshot scheduler stopping");
                break;
            }
            _ = interval.tick() => {
                let today = Utc::now().date_naive();
                match snapshots::capture_all(&pool, today, policy).await {
                    Ok(summary) => {
                        tracing::debug!(
                            created = summary.created,
                            updated = summary.updated,
                            "Snapshot scheduler: run complete",
                        );
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Snapshot scheduler: capture failed");
                    }
                }
            }
        }
    }
}
