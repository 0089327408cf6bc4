//! Configuration management

use anyhow::{self, Context, Result};

use crate::import::ProspectPolicy;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// NATS server URL
    pub nats_url: String,

    /// PostgreSQL connection string
    pub database_url: String,

    /// Maximum in-flight upserts per import batch
    pub import_concurrency: usize,

    /// Timeout for a single upsert call, in seconds
    pub upsert_timeout_secs: u64,

    /// What to do with a PROSPECT status before persistence
    pub prospect_policy: ProspectPolicy,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let nats_url = std::env::var("NATS_URL")
            .unwrap_or_else(|_| "nats://localhost:4222".to_string());

        let database_url = std::env::var("DATABASE_URL")
            .context("DATABASE_URL must be set")?;

        let import_concurrency = match std::env::var("IMPORT_UPSERT_CONCURRENCY") {
            Ok(v) => v
                .parse::<usize>()
                .with_context(|| format!("IMPORT_UPSERT_CONCURRENCY is not a number: {}", v))?,
            Err(_) => 3,
        };
        if import_concurrency == 0 {
            anyhow::bail!("IMPORT_UPSERT_CONCURRENCY must be at least 1");
        }

        let upsert_timeout_secs = match std::env::var("IMPORT_UPSERT_TIMEOUT_SECS") {
            Ok(v) => v
                .parse::<u64>()
                .with_context(|| format!("IMPORT_UPSERT_TIMEOUT_SECS is not a number: {}", v))?,
            Err(_) => 10,
        };

        let prospect_policy = match std::env::var("IMPORT_PROSPECT_POLICY") {
            Ok(v) => ProspectPolicy::parse(&v).with_context(|| {
                format!(
                    "IMPORT_PROSPECT_POLICY must be 'null-on-prospect' or 'default-to-prospect', got: {}",
                    v
                )
            })?,
            Err(_) => ProspectPolicy::default(),
        };

        Ok(Self {
            nats_url,
            database_url,
            import_concurrency,
            upsert_timeout_secs,
            prospect_policy,
        })
    }
}
