//! NATS message handlers

pub mod import;
pub mod ping;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_nats::Client;
use sqlx::PgPool;
use tokio::select;
use tracing::{error, info};

use crate::config::Config;
use crate::import::{ClientImporter, ClientStore, PgClientStore};

/// Start all message handlers
pub async fn start_handlers(client: Client, pool: PgPool, config: &Config) -> Result<()> {
    info!("Starting message handlers...");

    // Shared import pipeline
    let store: Arc<dyn ClientStore> = Arc::new(PgClientStore::new(pool));
    let importer = Arc::new(ClientImporter::new(
        store,
        config.prospect_policy,
        config.import_concurrency,
        Duration::from_secs(config.upsert_timeout_secs),
    ));
    info!(
        "Client importer initialized: concurrency={}, timeout={}s, policy={:?}",
        config.import_concurrency, config.upsert_timeout_secs, config.prospect_policy
    );

    // Subscribe to all subjects
    let ping_sub = client.subscribe("leadline.ping").await?;
    let import_sub = client.subscribe("leadline.client.import").await?;

    info!("Subscribed to NATS subjects");

    // Clone for each handler
    let client_ping = client.clone();
    let client_import = client.clone();

    // Spawn handlers
    let ping_handle = tokio::spawn(async move {
        ping::handle_ping(client_ping, ping_sub).await
    });

    let import_handle = tokio::spawn(async move {
        import::handle_import_clients(client_import, import_sub, importer).await
    });

    info!("All handlers started");

    // Handlers run forever; if one finishes, something went wrong
    select! {
        result = ping_handle => {
            error!("Ping handler finished: {:?}", result);
        }
        result = import_handle => {
            error!("Import handler finished: {:?}", result);
        }
    }

    Ok(())
}
