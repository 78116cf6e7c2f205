use pmo_ai::AiConfig;
use pmo_core::metrics::HighRiskPolicy;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long background tasks get to stop after the server does (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Interval between snapshot captures (default: one day).
    pub snapshot_interval_secs: u64,
    /// Which risk severities the health score penalises.
    pub high_risk_policy: HighRiskPolicy,
    pub jwt: JwtConfig,
    pub ai: AiConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                    |
    /// |--------------------------|----------------------------|
    /// | `HOST`                   | `0.0.0.0`                  |
    /// | `PORT`                   | `8000`                     |
    /// | `CORS_ORIGINS`           | `http://localhost:3000`    |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`  | `30`                       |
    /// | `SNAPSHOT_INTERVAL_SECS` | `86400`                    |
    /// | `HIGH_RISK_POLICY`       | `high`                     |
    ///
    /// See [`JwtConfig::from_env`] and [`AiConfig::from_env`] for the rest.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let snapshot_interval_secs: u64 = std::env::var("SNAPSHOT_INTERVAL_SECS")
            .unwrap_or_else(|_| "86400".into())
            .parse()
            .expect("SNAPSHOT_INTERVAL_SECS must be a valid u64");
        assert!(
            snapshot_interval_secs > 0,
            "SNAPSHOT_INTERVAL_SECS must be positive"
        );

        let high_risk_policy = match std::env::var("HIGH_RISK_POLICY") {
            Ok(value) => HighRiskPolicy::parse(&value)
                .expect("HIGH_RISK_POLICY must be `high` or `high_or_critical`"),
            Err(_) => HighRiskPolicy::default(),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            snapshot_interval_secs,
            high_risk_policy,
            jwt: JwtConfig::from_env(),
            ai: AiConfig::from_env(),
        }
    }
}
