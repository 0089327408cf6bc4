//! Bounded-concurrency upsert dispatch.
//!
//! Cleaned rows are de-duplicated by phone, then upserted against the client
//! store with a fixed number of in-flight calls. Every call runs to
//! completion: a failed or timed-out upsert becomes a row error in the
//! summary instead of aborting the batch, so a partial import is reported as
//! exactly that.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use futures::{stream, StreamExt};

use crate::import::store::ClientStore;
use crate::types::{CleanedClient, ImportActor, RowError};

/// Outcome of dispatching one import batch.
#[derive(Debug, Default)]
pub struct DispatchSummary {
    pub created: u32,
    pub updated: u32,
    pub errors: Vec<RowError>,
}

enum RowOutcome {
    Created,
    Updated,
    Failed(RowError),
}

pub struct UpsertDispatcher {
    store: Arc<dyn ClientStore>,
    concurrency: usize,
    upsert_timeout: Duration,
}

impl UpsertDispatcher {
    pub fn new(store: Arc<dyn ClientStore>, concurrency: usize, upsert_timeout: Duration) -> Self {
        Self {
            store,
            concurrency: concurrency.max(1),
            upsert_timeout,
        }
    }

    /// Upsert every row, keyed by phone, under bounded concurrency.
    pub async fn dispatch(&self, rows: Vec<CleanedClient>, actor: &ImportActor) -> DispatchSummary {
        let rows = dedupe_by_phone(rows);

        let outcomes: Vec<RowOutcome> = stream::iter(rows.into_iter().map(|record| {
            let store = Arc::clone(&self.store);
            let actor = *actor;
            let timeout = self.upsert_timeout;
            async move {
                let row = record.row;
                match tokio::time::timeout(timeout, upsert_one(store.as_ref(), &record, &actor))
                    .await
                {
                    Ok(Ok(outcome)) => outcome,
                    Ok(Err(e)) => {
                        RowOutcome::Failed(RowError::new(row, format!("Upsert failed: {}", e)))
                    }
                    Err(_) => RowOutcome::Failed(RowError::new(
                        row,
                        format!("Upsert timed out after {}s", timeout.as_secs()),
                    )),
                }
            }
        }))
        .buffer_unordered(self.concurrency)
        .collect()
        .await;

        let mut summary = DispatchSummary::default();
        for outcome in outcomes {
            match outcome {
                RowOutcome::Created => summary.created += 1,
                RowOutcome::Updated => summary.updated += 1,
                RowOutcome::Failed(err) => summary.errors.push(err),
            }
        }
        summary
    }
}

async fn upsert_one(
    store: &dyn ClientStore,
    record: &CleanedClient,
    actor: &ImportActor,
) -> Result<RowOutcome> {
    match store.find_by_phone(&record.phone).await? {
        Some(id) => {
            store.update(id, record, actor).await?;
            Ok(RowOutcome::Updated)
        }
        None => {
            store.create(record, actor).await?;
            Ok(RowOutcome::Created)
        }
    }
}

/// Collapse rows sharing a phone number: the last occurrence in the sheet
/// wins, at the position of the first. Concurrent upserts on the same key
/// would otherwise race.
pub fn dedupe_by_phone(rows: Vec<CleanedClient>) -> Vec<CleanedClient> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<CleanedClient> = Vec::with_capacity(rows.len());

    for row in rows {
        match seen.get(&row.phone) {
            Some(&slot) => out[slot] = row,
            None => {
                seen.insert(row.phone.clone(), out.len());
                out.push(row);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use uuid::Uuid;

    #[derive(Default)]
    struct MemoryClientStore {
        records: Mutex<HashMap<String, (Uuid, CleanedClient, ImportActor)>>,
        fail_phones: HashSet<String>,
        delay: Option<Duration>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl MemoryClientStore {
        fn failing_on(phones: &[&str]) -> Self {
            Self {
                fail_phones: phones.iter().map(|p| p.to_string()).collect(),
                ..Self::default()
            }
        }

        fn with_delay(delay: Duration) -> Self {
            Self {
                delay: Some(delay),
                ..Self::default()
            }
        }

        async fn track(&self) {
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(current, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl ClientStore for MemoryClientStore {
        async fn find_by_phone(&self, phone: &str) -> Result<Option<Uuid>> {
            Ok(self.records.lock().unwrap().get(phone).map(|(id, _, _)| *id))
        }

        async fn create(&self, record: &CleanedClient, actor: &ImportActor) -> Result<Uuid> {
            self.track().await;
            if self.fail_phones.contains(&record.phone) {
                anyhow::bail!("connection reset");
            }
            let id = Uuid::new_v4();
            self.records
                .lock()
                .unwrap()
                .insert(record.phone.clone(), (id, record.clone(), *actor));
            Ok(id)
        }

        async fn update(&self, id: Uuid, record: &CleanedClient, actor: &ImportActor) -> Result<()> {
            self.track().await;
            if self.fail_phones.contains(&record.phone) {
                anyhow::bail!("connection reset");
            }
            self.records
                .lock()
                .unwrap()
                .insert(record.phone.clone(), (id, record.clone(), *actor));
            Ok(())
        }
    }

    fn record(row: i32, phone: &str) -> CleanedClient {
        CleanedClient::new(row, phone.to_string())
    }

    fn actor() -> ImportActor {
        ImportActor {
            user_id: Uuid::new_v4(),
            assigned_employee_id: Uuid::new_v4(),
        }
    }

    fn dispatcher(store: Arc<MemoryClientStore>) -> UpsertDispatcher {
        UpsertDispatcher::new(store, 3, Duration::from_secs(10))
    }

    #[test]
    fn test_dedupe_last_occurrence_wins() {
        let mut first = record(2, "111");
        first.name = Some("Old".to_string());
        let mut last = record(5, "111");
        last.name = Some("New".to_string());

        let rows = vec![first, record(3, "222"), last];
        let deduped = dedupe_by_phone(rows);

        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].phone, "111");
        assert_eq!(deduped[0].name.as_deref(), Some("New"));
        assert_eq!(deduped[1].phone, "222");
    }

    #[tokio::test]
    async fn test_dispatch_creates_then_updates() {
        let store = Arc::new(MemoryClientStore::default());
        let dispatcher = dispatcher(Arc::clone(&store));
        let rows = vec![record(2, "111"), record(3, "222")];

        let first = dispatcher.dispatch(rows.clone(), &actor()).await;
        assert_eq!(first.created, 2);
        assert_eq!(first.updated, 0);
        assert!(first.errors.is_empty());

        // Re-running the same batch updates instead of duplicating
        let second = dispatcher.dispatch(rows, &actor()).await;
        assert_eq!(second.created, 0);
        assert_eq!(second.updated, 2);
        assert_eq!(store.records.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_upsert_does_not_abort_batch() {
        let store = Arc::new(MemoryClientStore::failing_on(&["222"]));
        let dispatcher = dispatcher(Arc::clone(&store));
        let rows = vec![record(2, "111"), record(3, "222"), record(4, "333")];

        let summary = dispatcher.dispatch(rows, &actor()).await;

        assert_eq!(summary.created, 2);
        assert_eq!(summary.errors.len(), 1);
        assert_eq!(summary.errors[0].row, 3);
        assert!(summary.errors[0].message.contains("Upsert failed"));
        assert_eq!(store.records.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_upsert_timeout_becomes_row_error() {
        let store = Arc::new(MemoryClientStore::with_delay(Duration::from_millis(100)));
        let dispatcher =
            UpsertDispatcher::new(Arc::clone(&store) as Arc<dyn ClientStore>, 3, Duration::from_millis(10));

        let summary = dispatcher.dispatch(vec![record(2, "111")], &actor()).await;

        assert_eq!(summary.created, 0);
        assert_eq!(summary.errors.len(), 1);
        assert!(summary.errors[0].message.contains("timed out"));
    }

    #[tokio::test]
    async fn test_concurrency_limit_respected() {
        let store = Arc::new(MemoryClientStore::with_delay(Duration::from_millis(20)));
        let dispatcher =
            UpsertDispatcher::new(Arc::clone(&store) as Arc<dyn ClientStore>, 3, Duration::from_secs(10));

        let rows: Vec<CleanedClient> = (0..10)
            .map(|i| record(i + 2, &format!("{}", 1000 + i)))
            .collect();
        let summary = dispatcher.dispatch(rows, &actor()).await;

        assert_eq!(summary.created, 10);
        assert!(store.max_in_flight.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn test_ownership_restamped_on_update() {
        let store = Arc::new(MemoryClientStore::default());
        let dispatcher = dispatcher(Arc::clone(&store));

        let first_actor = actor();
        dispatcher
            .dispatch(vec![record(2, "111")], &first_actor)
            .await;

        let second_actor = actor();
        dispatcher
            .dispatch(vec![record(2, "111")], &second_actor)
            .await;

        let records = store.records.lock().unwrap();
        let (_, _, stamped) = records.get("111").unwrap();
        assert_eq!(*stamped, second_actor);
    }
}
