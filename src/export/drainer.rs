//! Batch drainer
//!
//! Drains one backlog in fixed-size batches. Exactly one batch is in flight
//! at a time: the next fetch is issued only after the previous batch has
//! been written and its progress reported.

use tracing::{debug, info, warn};

use super::backlog::Backlog;
use super::fetcher::RecordFetcher;
use super::record::CollectionKind;
use super::writers::RecordWriter;
use crate::error::{ExportError, Result};

/// Outcome of one completed pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassSummary {
    /// Collection kind that was drained
    pub kind: CollectionKind,
    /// Number of fetch+emit cycles
    pub batches: usize,
    /// Number of records written
    pub records: usize,
}

impl PassSummary {
    pub fn empty(kind: CollectionKind) -> Self {
        Self {
            kind,
            batches: 0,
            records: 0,
        }
    }
}

/// Drains a backlog through a fetcher into a writer
pub struct BatchDrainer<'a> {
    fetcher: &'a RecordFetcher<'a>,
    writer: &'a mut dyn RecordWriter,
    batch_size: usize,
}

impl<'a> BatchDrainer<'a> {
    /// Create a new drainer
    ///
    /// # Arguments
    /// * `fetcher` - Fetcher used once per batch
    /// * `writer` - Sink for the serialized records
    /// * `batch_size` - Maximum identifiers per batch; must be at least 1
    pub fn new(
        fetcher: &'a RecordFetcher<'a>,
        writer: &'a mut dyn RecordWriter,
        batch_size: usize,
    ) -> Self {
        Self {
            fetcher,
            writer,
            batch_size,
        }
    }

    /// Drain `backlog` to completion
    ///
    /// After every batch the records are written in fetch order, then
    /// `progress` receives the fraction of the listing taken so far.
    /// A failed batch aborts the pass with the underlying error; the
    /// remaining identifiers are left in the backlog and not retried.
    ///
    /// # Returns
    /// * `Result<PassSummary>` - Batch and record counts, or the first fault
    pub async fn drain<P>(
        &mut self,
        kind: CollectionKind,
        backlog: &mut Backlog,
        mut progress: P,
    ) -> Result<PassSummary>
    where
        P: FnMut(f64),
    {
        if self.batch_size < 1 {
            return Err(ExportError::InvalidBatchSize(self.batch_size).into());
        }

        let mut summary = PassSummary::empty(kind);
        if backlog.is_empty() {
            let note = format!("Warning! No {} in the database? Really?", kind.noun());
            warn!("{}", note);
            self.fetcher.diagnostics().write_line(&note);
            return Ok(summary);
        }

        info!(
            "Dumping {} {} in batches of {}",
            backlog.total(),
            kind.noun(),
            self.batch_size
        );

        while !backlog.is_empty() {
            let batch = backlog.take_batch(self.batch_size);
            debug!("Fetching batch #{} ({} ids)", summary.batches + 1, batch.len());

            let records = self.fetcher.fetch(kind, batch).await?;
            let written = self.writer.write_batch(&records).await?;

            summary.batches += 1;
            summary.records += written;

            if let Some(fraction) = backlog.progress() {
                progress(fraction);
            }
            debug!(
                "{} {} left of {}",
                backlog.len(),
                kind.noun(),
                backlog.total()
            );
        }

        info!(
            "Dumped {} {} in {} batches",
            summary.records,
            kind.noun(),
            summary.batches
        );
        Ok(summary)
    }
}
