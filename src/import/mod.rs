//! Bulk client import pipeline.
//!
//! Reader → cleaner → dispatcher: an uploaded spreadsheet becomes a set of
//! upserts keyed by phone number, plus a list of per-row problems for the
//! uploader to fix and retry. The pipeline is stateless per invocation; the
//! only state it touches is the client store.

pub mod cleaner;
pub mod columns;
pub mod dispatcher;
pub mod error;
pub mod sheet_reader;
pub mod store;

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

pub use cleaner::{CleanedBatch, ProspectPolicy, RowCleaner};
pub use dispatcher::{DispatchSummary, UpsertDispatcher};
pub use error::SheetError;
pub use sheet_reader::{decode_first_sheet, RawRow};
pub use store::{ClientStore, PgClientStore};

use crate::types::{ImportActor, RowError};

/// Result of one full import run.
#[derive(Debug)]
pub struct ImportOutcome {
    /// Rows successfully persisted (created + updated).
    pub processed: u32,
    pub created: u32,
    pub updated: u32,
    /// Row problems in sheet order: soft cleaning errors, rejected rows and
    /// persistence failures.
    pub errors: Vec<RowError>,
}

/// The assembled pipeline, configured once at startup.
pub struct ClientImporter {
    cleaner: RowCleaner,
    dispatcher: UpsertDispatcher,
}

impl ClientImporter {
    pub fn new(
        store: Arc<dyn ClientStore>,
        policy: ProspectPolicy,
        concurrency: usize,
        upsert_timeout: Duration,
    ) -> Self {
        Self {
            cleaner: RowCleaner::new(policy),
            dispatcher: UpsertDispatcher::new(store, concurrency, upsert_timeout),
        }
    }

    /// Run the pipeline over a spreadsheet byte buffer.
    ///
    /// Returns `Err` only for batch-level problems (unreadable workbook);
    /// row-level problems are reported inside the outcome.
    pub async fn import(
        &self,
        bytes: &[u8],
        actor: &ImportActor,
    ) -> Result<ImportOutcome, SheetError> {
        let rows = decode_first_sheet(bytes)?;
        info!("Decoded {} data rows from spreadsheet", rows.len());

        let batch = self.cleaner.clean_rows(&rows);
        info!(
            "Cleaned {} rows, {} row errors",
            batch.cleaned.len(),
            batch.errors.len()
        );

        let summary = self.dispatcher.dispatch(batch.cleaned, actor).await;
        info!(
            "Dispatch complete: {} created, {} updated, {} failed",
            summary.created,
            summary.updated,
            summary.errors.len()
        );

        Ok(assemble_outcome(batch.errors, summary))
    }
}

/// Merge cleaning errors with dispatch results into one sheet-ordered report.
fn assemble_outcome(mut errors: Vec<RowError>, summary: DispatchSummary) -> ImportOutcome {
    errors.extend(summary.errors);
    errors.sort_by_key(|e| e.row);

    ImportOutcome {
        processed: summary.created + summary.updated,
        created: summary.created,
        updated: summary.updated,
        errors,
    }
}
