//! Line-oriented dump writer
//!
//! Each record is serialized by a [`LineFormatter`] and written as one
//! newline-terminated line. The sink is flushed after every batch, so a dump
//! interrupted by a later failure is still a valid prefix.

use async_trait::async_trait;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter, Stdout};
use tracing::debug;

use super::{create_writer, validate_path, RecordWriter};
use crate::error::{ExportError, Result};
use crate::export::record::Record;
use crate::formatter::LineFormatter;

/// Writer for the dump line format
pub struct DumpWriter<W> {
    /// Underlying byte sink
    writer: W,
    /// Where the lines go, for log messages
    target: String,
    /// Number of lines written
    written: u64,
    /// Record serializer
    formatter: LineFormatter,
}

impl DumpWriter<BufWriter<File>> {
    /// Create a writer for a new file at `path`
    ///
    /// # Arguments
    /// * `path` - Output file path; its directory must exist
    ///
    /// # Returns
    /// * `Result<Self>` - New writer instance or error
    pub async fn create(path: &Path) -> Result<Self> {
        validate_path(path)?;
        let writer = create_writer(path).await?;
        debug!("Created dump writer for: {}", path.display());
        Ok(Self::new(writer, path.display().to_string()))
    }
}

impl DumpWriter<BufWriter<Stdout>> {
    /// Create a writer for the process's stdout
    pub fn stdout() -> Self {
        Self::new(BufWriter::new(tokio::io::stdout()), "<stdout>")
    }
}

impl<W> DumpWriter<W> {
    pub fn new(writer: W, target: impl Into<String>) -> Self {
        Self {
            writer,
            target: target.into(),
            written: 0,
            formatter: LineFormatter::new(),
        }
    }

    pub fn formatter(&self) -> &LineFormatter {
        &self.formatter
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W> RecordWriter for DumpWriter<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn write_batch(&mut self, records: &[Record]) -> Result<usize> {
        for record in records {
            let mut line = self.formatter.format_record(record)?;
            line.push('\n');
            self.writer.write_all(line.as_bytes()).await.map_err(|e| {
                ExportError::Output(format!("Failed to write to {}: {}", self.target, e))
            })?;
            self.written += 1;
        }
        self.writer.flush().await.map_err(|e| {
            ExportError::Output(format!("Failed to flush {}: {}", self.target, e))
        })?;

        debug!(
            "Wrote {} lines to {} (total: {})",
            records.len(),
            self.target,
            self.written
        );
        Ok(records.len())
    }

    async fn finalize(&mut self) -> Result<()> {
        self.writer.flush().await.map_err(|e| {
            ExportError::Output(format!("Failed to flush {}: {}", self.target, e))
        })?;
        debug!("Finalized {} ({} lines)", self.target, self.written);
        Ok(())
    }

    fn lines_written(&self) -> u64 {
        self.written
    }
}
