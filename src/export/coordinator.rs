//! Export coordinator for orchestrating a full graph dump
//!
//! Runs the node pass, then the relationship pass, then finalizes the sink.
//! Each step starts only after the previous one completed; the first fault
//! is reported once and aborts everything after it.

use std::time::Instant;

use tracing::{debug, info};

use super::backlog::Backlog;
use super::drainer::{BatchDrainer, PassSummary};
use super::fetcher::RecordFetcher;
use super::progress::{ProgressMode, ProgressTracker};
use super::record::CollectionKind;
use super::writers::RecordWriter;
use crate::connection::GraphStore;
use crate::error::{ErrorWrapper, ExportError, Result};

/// Default number of identifiers fetched per batch
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Title of the diagnostic report emitted for an aborted export
const REPORT_TITLE: &str = "Error";

/// Result of an export operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResult {
    /// Node pass statistics
    pub nodes: PassSummary,
    /// Relationship pass statistics
    pub relationships: PassSummary,
    /// Time taken for export
    pub elapsed_ms: u64,
}

impl ExportResult {
    /// Total number of lines written across both passes
    pub fn records(&self) -> usize {
        self.nodes.records + self.relationships.records
    }
}

/// Coordinator for export operations
///
/// Owns the store and the sink for the duration of one export. Faults are
/// routed through the [`ErrorWrapper`], so every error returned from
/// [`ExportCoordinator::execute`] has already been reported.
pub struct ExportCoordinator {
    /// Graph store to read from
    store: Box<dyn GraphStore>,
    /// Sink for serialized records
    writer: Box<dyn RecordWriter>,
    /// Reports faults on the diagnostic stream
    wrapper: ErrorWrapper,
    batch_size: usize,
    progress_mode: ProgressMode,
}

impl ExportCoordinator {
    /// Create a new export coordinator
    pub fn new(
        store: Box<dyn GraphStore>,
        writer: Box<dyn RecordWriter>,
        wrapper: ErrorWrapper,
    ) -> Self {
        Self {
            store,
            writer,
            wrapper,
            batch_size: DEFAULT_BATCH_SIZE,
            progress_mode: ProgressMode::Hidden,
        }
    }

    /// Set the number of identifiers fetched per batch
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set how pass progress is rendered
    pub fn with_progress(mut self, mode: ProgressMode) -> Self {
        self.progress_mode = mode;
        self
    }

    /// Execute the export operation
    ///
    /// 1. List node identifiers and drain them
    /// 2. List relationship identifiers and drain them
    /// 3. Finalize the sink
    ///
    /// # Returns
    /// * `Result<ExportResult>` - Export statistics or the reported fault
    pub async fn execute(&mut self) -> Result<ExportResult> {
        if self.batch_size < 1 {
            let fault = ExportError::InvalidBatchSize(self.batch_size).into();
            return Err(self.wrapper.observe(REPORT_TITLE, fault));
        }

        let start_time = Instant::now();
        info!("Starting export in batches of {}", self.batch_size);

        let nodes = self.run_pass(CollectionKind::Nodes).await?;
        let relationships = self.run_pass(CollectionKind::Relationships).await?;

        debug!("Finalizing output");
        self.wrapper
            .guard(REPORT_TITLE, self.writer.finalize())
            .await?;

        let result = ExportResult {
            nodes,
            relationships,
            elapsed_ms: start_time.elapsed().as_millis() as u64,
        };
        info!(
            "Export completed: {} nodes, {} relations, {} lines, {} ms",
            result.nodes.records,
            result.relationships.records,
            self.writer.lines_written(),
            result.elapsed_ms
        );
        Ok(result)
    }

    /// List and drain one collection kind
    async fn run_pass(&mut self, kind: CollectionKind) -> Result<PassSummary> {
        let wrapper = &self.wrapper;

        let ids = wrapper
            .guard(REPORT_TITLE, self.store.list_ids(kind))
            .await?;
        debug!("Listed {} {}", ids.len(), kind.noun());

        let mut backlog = Backlog::new(ids);
        let fetcher = RecordFetcher::new(self.store.as_ref(), wrapper.clone());
        let mut drainer = BatchDrainer::new(&fetcher, self.writer.as_mut(), self.batch_size);
        let mut tracker = ProgressTracker::new(
            kind.label(),
            self.progress_mode,
            wrapper.diagnostics().clone(),
        );

        if !backlog.is_empty() {
            tracker.start();
        }
        let outcome = drainer
            .drain(kind, &mut backlog, |progress| tracker.update(progress))
            .await;

        match outcome {
            Ok(summary) => {
                tracker.finish();
                Ok(summary)
            }
            Err(fault) => {
                tracker.abandon();
                debug!("{} {} left undumped", backlog.len(), kind.noun());
                Err(wrapper.observe(REPORT_TITLE, fault))
            }
        }
    }
}
