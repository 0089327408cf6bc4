//! Persistence seam for the import dispatcher.
//!
//! The dispatcher only needs three single-record operations keyed by phone,
//! so they live behind a trait object and the Postgres implementation stays
//! out of the pipeline's way (and out of its tests).

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::queries;
use crate::types::{CleanedClient, ImportActor};

/// Single-record client operations used by the upsert dispatcher.
#[async_trait]
pub trait ClientStore: Send + Sync {
    /// Look up an existing client by its cleaned phone number.
    async fn find_by_phone(&self, phone: &str) -> Result<Option<Uuid>>;

    /// Create a new client from a cleaned row, stamped with the actor.
    async fn create(&self, record: &CleanedClient, actor: &ImportActor) -> Result<Uuid>;

    /// Overwrite an existing client's imported fields. Ownership columns are
    /// always restamped; `name` is only replaced when the row provided one.
    async fn update(&self, id: Uuid, record: &CleanedClient, actor: &ImportActor) -> Result<()>;
}

/// Postgres-backed client store.
pub struct PgClientStore {
    pool: PgPool,
}

impl PgClientStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClientStore for PgClientStore {
    async fn find_by_phone(&self, phone: &str) -> Result<Option<Uuid>> {
        queries::client::find_client_id_by_phone(&self.pool, phone).await
    }

    async fn create(&self, record: &CleanedClient, actor: &ImportActor) -> Result<Uuid> {
        queries::client::create_client_from_import(&self.pool, record, actor).await
    }

    async fn update(&self, id: Uuid, record: &CleanedClient, actor: &ImportActor) -> Result<()> {
        queries::client::update_client_from_import(&self.pool, id, record, actor).await
    }
}
