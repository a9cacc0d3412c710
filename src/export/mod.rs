//! Paginated bulk export of a graph
//!
//! The export runs as two sequential passes, nodes first and relationships
//! second. Each pass lists every identifier of its collection kind, then
//! drains that listing in fixed-size batches:
//!
//! 1. **Backlog**: immutable snapshot of the listing plus a cursor
//! 2. **RecordFetcher**: one store query per batch, rows mapped into records
//! 3. **RecordWriter**: one `;`-terminated line per record on the output sink
//! 4. **ProgressTracker**: percent and spinner on the diagnostic stream
//!
//! These components are orchestrated by the **ExportCoordinator**. Only one
//! batch is ever in flight, so memory stays bounded by the batch size.
//!
//! # Example
//!
//! ```no_run
//! use neo4jdump::connection::{ConnectionManager, HttpGraphStore};
//! use neo4jdump::config::ConnectionConfig;
//! use neo4jdump::error::ErrorWrapper;
//! use neo4jdump::export::{DumpWriter, ExportCoordinator};
//! use neo4jdump::utils::DiagnosticStream;
//!
//! # async fn run() -> neo4jdump::Result<()> {
//! let mut manager = ConnectionManager::new(ConnectionConfig::default());
//! manager.connect().await?;
//!
//! let wrapper = ErrorWrapper::new(DiagnosticStream::stderr());
//! let mut coordinator = ExportCoordinator::new(
//!     Box::new(HttpGraphStore::new(manager)),
//!     Box::new(DumpWriter::stdout()),
//!     wrapper,
//! )
//! .with_batch_size(500);
//!
//! let result = coordinator.execute().await?;
//! println!("{} records", result.records());
//! # Ok(())
//! # }
//! ```

pub mod backlog;
pub mod coordinator;
pub mod drainer;
pub mod fetcher;
pub mod progress;
pub mod record;
pub mod writers;

#[cfg(test)]
pub(crate) mod testing;

pub use backlog::Backlog;
pub use coordinator::{ExportCoordinator, ExportResult, DEFAULT_BATCH_SIZE};
pub use drainer::{BatchDrainer, PassSummary};
pub use fetcher::RecordFetcher;
pub use progress::{ProgressMode, ProgressTracker};
pub use record::{CollectionKind, EntityId, NodeRecord, Record, RelationshipRecord};
pub use writers::{DumpWriter, RecordWriter};
