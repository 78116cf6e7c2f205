//! One-shot snapshot capture: records today's snapshot for every project
//! and exits.

use pmo_core::metrics::HighRiskPolicy;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pmo_worker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;
    let policy = match std::env::var("HIGH_RISK_POLICY") {
        Ok(value) => HighRiskPolicy::parse(&value)
            .ok_or_else(|| anyhow::anyhow!("Invalid HIGH_RISK_POLICY: '{value}'"))?,
        Err(_) => HighRiskPolicy::default(),
    };

    let pool = pmo_db::create_pool(&database_url).await?;
    pmo_db::run_migrations(&pool).await?;

    let today = chrono::Utc::now().date_naive();
    let summary = pmo_worker::snapshots::capture_all(&pool, today, policy).await?;

    tracing::info!(
        %today,
        created = summary.created,
        updated = summary.updated,
        "Snapshot complete",
    );
    Ok(())
}
