//! Output sinks for dump records
//!
//! This module provides a unified interface for writing serialized records
//! to stdout or to a file.

use async_trait::async_trait;
use std::path::Path;
use tokio::fs::File;
use tokio::io::BufWriter;

use super::record::Record;
use crate::error::{ExportError, Result};

pub mod dump;

pub use dump::DumpWriter;

/// Trait for writing records to the primary output
#[async_trait]
pub trait RecordWriter: Send {
    /// Write a batch of records, one line each, in the given order
    ///
    /// # Arguments
    /// * `records` - Slice of records to write
    ///
    /// # Returns
    /// * `Result<usize>` - Number of records written
    async fn write_batch(&mut self, records: &[Record]) -> Result<usize>;

    /// Finalize the output (flush buffers)
    ///
    /// # Returns
    /// * `Result<()>` - Success or error
    async fn finalize(&mut self) -> Result<()>;

    /// Total number of lines written so far
    fn lines_written(&self) -> u64;
}

/// Helper function to create a buffered file writer
///
/// # Arguments
/// * `path` - File path to create
///
/// # Returns
/// * `Result<BufWriter<File>>` - Buffered writer or error
pub(crate) async fn create_writer(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).await.map_err(|e| {
        ExportError::Output(format!("Failed to create {}: {}", path.display(), e))
    })?;
    Ok(BufWriter::with_capacity(1024 * 1024, file))
}

/// Helper function to validate file path and directory
///
/// # Arguments
/// * `path` - File path to validate
///
/// # Returns
/// * `Result<()>` - Success or error
pub(crate) fn validate_path(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            return Err(ExportError::Output(format!(
                "Directory does not exist: {}",
                parent.display()
            ))
            .into());
        }
    }

    Ok(())
}
