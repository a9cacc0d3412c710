//! In-memory graph store and record sink shared by the export tests

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use super::record::{CollectionKind, EntityId, Record};
use super::writers::RecordWriter;
use crate::connection::{GraphStore, Row};
use crate::error::{Result, StoreError};
use crate::formatter::LineFormatter;

fn to_row(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        _ => Row::new(),
    }
}

fn query_failed(detail: &str) -> crate::error::DumpError {
    StoreError::QueryFailed {
        code: "Neo.TransientError.General.DatabaseUnavailable".into(),
        message: detail.into(),
        statement: "MATCH (n) RETURN n".into(),
    }
    .into()
}

/// Graph store backed by row vectors, recording every fetch call
///
/// Clones share the call log, so a test can keep a handle after boxing one.
#[derive(Clone, Default)]
pub struct MemoryStore {
    nodes: Vec<Row>,
    relationships: Vec<Row>,
    reversed: bool,
    fail_on_fetch: Option<usize>,
    fail_listing: Option<CollectionKind>,
    calls: Arc<Mutex<Vec<(CollectionKind, Vec<EntityId>)>>>,
    listings: Arc<Mutex<Vec<CollectionKind>>>,
}

impl MemoryStore {
    /// Nodes `{id, data: {"n": id}}` for every id
    pub fn with_nodes(ids: &[EntityId]) -> Self {
        Self::default().nodes(ids)
    }

    pub fn nodes(mut self, ids: &[EntityId]) -> Self {
        self.nodes
            .extend(ids.iter().map(|id| to_row(json!({ "id": id, "data": { "n": id } }))));
        self
    }

    pub fn relationship(
        mut self,
        id: EntityId,
        rel_type: &str,
        start: EntityId,
        end: EntityId,
        data: Value,
    ) -> Self {
        self.relationships.push(to_row(json!({
            "id": id, "type": rel_type, "start": start, "end": end, "data": data
        })));
        self
    }

    /// Add a node row verbatim, even if it cannot be mapped
    pub fn raw_node_row(mut self, row: Value) -> Self {
        self.nodes.push(to_row(row));
        self
    }

    /// Answer fetches in reverse order of the stored rows
    pub fn reversed(mut self) -> Self {
        self.reversed = true;
        self
    }

    /// Fail the `call`-th fetch (1-based, counted across both kinds)
    pub fn failing_on_fetch(mut self, call: usize) -> Self {
        self.fail_on_fetch = Some(call);
        self
    }

    pub fn failing_listing(mut self, kind: CollectionKind) -> Self {
        self.fail_listing = Some(kind);
        self
    }

    /// Identifier batches passed to every fetch so far
    pub fn fetch_calls(&self) -> Vec<Vec<EntityId>> {
        self.calls
            .lock()
            .map(|calls| calls.iter().map(|(_, ids)| ids.clone()).collect())
            .unwrap_or_default()
    }

    pub fn fetch_calls_for(&self, kind: CollectionKind) -> Vec<Vec<EntityId>> {
        self.calls
            .lock()
            .map(|calls| {
                calls
                    .iter()
                    .filter(|(k, _)| *k == kind)
                    .map(|(_, ids)| ids.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn listings(&self) -> Vec<CollectionKind> {
        self.listings.lock().map(|l| l.clone()).unwrap_or_default()
    }

    fn rows(&self, kind: CollectionKind) -> &[Row] {
        match kind {
            CollectionKind::Nodes => &self.nodes,
            CollectionKind::Relationships => &self.relationships,
        }
    }
}

#[async_trait]
impl GraphStore for MemoryStore {
    async fn list_ids(&self, kind: CollectionKind) -> Result<Vec<EntityId>> {
        if let Ok(mut listings) = self.listings.lock() {
            listings.push(kind);
        }
        if self.fail_listing == Some(kind) {
            return Err(query_failed("listing refused"));
        }
        Ok(self
            .rows(kind)
            .iter()
            .filter_map(|row| row.get("id").and_then(Value::as_i64))
            .collect())
    }

    async fn fetch_rows(&self, kind: CollectionKind, ids: &[EntityId]) -> Result<Vec<Row>> {
        let call = {
            let mut calls = self.calls.lock().map_err(|_| query_failed("poisoned"))?;
            calls.push((kind, ids.to_vec()));
            calls.len()
        };
        if self.fail_on_fetch == Some(call) {
            return Err(query_failed("store went away"));
        }
        let mut rows: Vec<Row> = self
            .rows(kind)
            .iter()
            .filter(|row| {
                row.get("id")
                    .and_then(Value::as_i64)
                    .is_none_or(|id| ids.contains(&id))
            })
            .cloned()
            .collect();
        if self.reversed {
            rows.reverse();
        }
        Ok(rows)
    }
}

/// Record sink that keeps every formatted line, split per batch
#[derive(Clone, Default)]
pub struct MemoryWriter {
    batches: Arc<Mutex<Vec<Vec<String>>>>,
    finalized: Arc<Mutex<bool>>,
}

impl MemoryWriter {
    pub fn batches(&self) -> Vec<Vec<String>> {
        self.batches.lock().map(|b| b.clone()).unwrap_or_default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.batches().into_iter().flatten().collect()
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized.lock().map(|f| *f).unwrap_or(false)
    }
}

#[async_trait]
impl RecordWriter for MemoryWriter {
    async fn write_batch(&mut self, records: &[Record]) -> Result<usize> {
        let mut formatter = LineFormatter::new();
        let lines = records
            .iter()
            .map(|record| formatter.format_record(record))
            .collect::<Result<Vec<_>>>()?;
        if let Ok(mut batches) = self.batches.lock() {
            batches.push(lines);
        }
        Ok(records.len())
    }

    async fn finalize(&mut self) -> Result<()> {
        if let Ok(mut finalized) = self.finalized.lock() {
            *finalized = true;
        }
        Ok(())
    }

    fn lines_written(&self) -> u64 {
        self.lines().len() as u64
    }
}
