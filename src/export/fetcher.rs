//! Record fetcher
//!
//! Turns a batch of identifiers into fully populated records by issuing a
//! single store query per batch and mapping the returned rows.

use serde_json::Value;
use tracing::{debug, warn};

use super::record::{CollectionKind, EntityId, NodeRecord, Record, RelationshipRecord};
use crate::connection::store::{column_i64, column_str};
use crate::connection::{GraphStore, Row};
use crate::error::{ErrorWrapper, Result};
use crate::utils::DiagnosticStream;

fn data_column(row: &Row) -> Value {
    row.get("data").cloned().unwrap_or(Value::Null)
}

/// Map a node row (`id`, `data`) into a record
pub fn node_from_row(row: &Row) -> Result<NodeRecord> {
    Ok(NodeRecord {
        id: column_i64(row, "id")?,
        data: data_column(row),
    })
}

/// Map a relationship row (`id`, `type`, `start`, `end`, `data`) into a record
pub fn relationship_from_row(row: &Row) -> Result<RelationshipRecord> {
    Ok(RelationshipRecord {
        id: column_i64(row, "id")?,
        rel_type: column_str(row, "type")?.to_string(),
        start_id: column_i64(row, "start")?,
        end_id: column_i64(row, "end")?,
        data: data_column(row),
    })
}

/// Fetches records for one batch of identifiers at a time
pub struct RecordFetcher<'a> {
    store: &'a dyn GraphStore,
    wrapper: ErrorWrapper,
}

impl<'a> RecordFetcher<'a> {
    /// Create a fetcher reading from `store`
    ///
    /// # Arguments
    /// * `store` - Graph store to query
    /// * `wrapper` - Reports faults raised while mapping rows
    pub fn new(store: &'a dyn GraphStore, wrapper: ErrorWrapper) -> Self {
        Self { store, wrapper }
    }

    /// Diagnostic stream shared with the wrapper
    pub fn diagnostics(&self) -> &DiagnosticStream {
        self.wrapper.diagnostics()
    }

    /// Note an empty request on both the log and the diagnostic stream
    fn skip_empty(&self, kind: CollectionKind) {
        let note = format!("Warning! No {} requested, skipping the query", kind.noun());
        warn!("{}", note);
        self.diagnostics().write_line(&note);
    }

    /// Fetch node records for `ids`
    ///
    /// Records come back in store order. Store errors are returned unchanged;
    /// a row that cannot be mapped is reported and aborts the fetch.
    pub async fn fetch_nodes(&self, ids: &[EntityId]) -> Result<Vec<NodeRecord>> {
        if ids.is_empty() {
            self.skip_empty(CollectionKind::Nodes);
            return Ok(Vec::new());
        }
        let rows = self.store.fetch_rows(CollectionKind::Nodes, ids).await?;
        let mut map = self.wrapper.catch_fail_with(node_from_row, Err);
        let records = rows.iter().map(&mut map).collect::<Result<Vec<_>>>()?;
        debug!("Got {} nodes for {} ids", records.len(), ids.len());
        Ok(records)
    }

    /// Fetch relationship records for `ids`
    pub async fn fetch_relationships(&self, ids: &[EntityId]) -> Result<Vec<RelationshipRecord>> {
        if ids.is_empty() {
            self.skip_empty(CollectionKind::Relationships);
            return Ok(Vec::new());
        }
        let rows = self
            .store
            .fetch_rows(CollectionKind::Relationships, ids)
            .await?;
        let mut map = self.wrapper.catch_fail_with(relationship_from_row, Err);
        let records = rows.iter().map(&mut map).collect::<Result<Vec<_>>>()?;
        debug!("Got {} relations for {} ids", records.len(), ids.len());
        Ok(records)
    }

    /// Fetch records of `kind` for `ids`
    pub async fn fetch(&self, kind: CollectionKind, ids: &[EntityId]) -> Result<Vec<Record>> {
        Ok(match kind {
            CollectionKind::Nodes => self
                .fetch_nodes(ids)
                .await?
                .into_iter()
                .map(Record::from)
                .collect(),
            CollectionKind::Relationships => self
                .fetch_relationships(ids)
                .await?
                .into_iter()
                .map(Record::from)
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::testing::MemoryStore;
    use serde_json::json;

    fn wrapper() -> (ErrorWrapper, crate::utils::CapturedOutput) {
        let (stream, captured) = DiagnosticStream::buffer();
        (ErrorWrapper::new(stream), captured)
    }

    #[tokio::test]
    async fn test_fetch_nodes_in_store_order() {
        let store = MemoryStore::with_nodes(&[1, 2, 3]).reversed();
        let (wrapper, _) = wrapper();
        let fetcher = RecordFetcher::new(&store, wrapper);

        let nodes = fetcher.fetch_nodes(&[1, 3]).await.unwrap();
        let ids: Vec<_> = nodes.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![3, 1]);
        assert_eq!(nodes[0].data, json!({ "n": 3 }));
        assert_eq!(store.fetch_calls(), vec![vec![1, 3]]);
    }

    #[tokio::test]
    async fn test_fetch_relationships_maps_columns() {
        let store = MemoryStore::default().relationship(7, "KNOWS", 1, 2, json!({ "a": 1 }));
        let (wrapper, _) = wrapper();
        let fetcher = RecordFetcher::new(&store, wrapper);

        let rels = fetcher.fetch_relationships(&[7]).await.unwrap();
        assert_eq!(
            rels,
            vec![RelationshipRecord {
                id: 7,
                rel_type: "KNOWS".into(),
                start_id: 1,
                end_id: 2,
                data: json!({ "a": 1 }),
            }]
        );
    }

    #[tokio::test]
    async fn test_empty_request_skips_store() {
        let store = MemoryStore::with_nodes(&[1]);
        let (wrapper, captured) = wrapper();
        let fetcher = RecordFetcher::new(&store, wrapper);

        assert!(fetcher.fetch(CollectionKind::Nodes, &[]).await.unwrap().is_empty());
        assert!(fetcher.fetch_relationships(&[]).await.unwrap().is_empty());
        assert!(store.fetch_calls().is_empty());
        assert_eq!(
            captured.contents(),
            "Warning! No nodes requested, skipping the query\n\
             Warning! No relations requested, skipping the query\n"
        );
    }

    #[tokio::test]
    async fn test_store_error_passes_through_unmodified() {
        let store = MemoryStore::with_nodes(&[1, 2]).failing_on_fetch(1);
        let (wrapper, captured) = wrapper();
        let fetcher = RecordFetcher::new(&store, wrapper);

        let err = fetcher.fetch_nodes(&[1, 2]).await.unwrap_err();
        assert!(matches!(
            err,
            crate::error::DumpError::Store(crate::error::StoreError::QueryFailed { .. })
        ));
        assert!(captured.contents().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_row_is_reported_and_aborts() {
        let store = MemoryStore::default().raw_node_row(json!({ "id": "not-a-number" }));
        let (wrapper, captured) = wrapper();
        let fetcher = RecordFetcher::new(&store, wrapper);

        let err = fetcher.fetch_nodes(&[1]).await.unwrap_err();
        assert!(err.is_reported());
        assert_eq!(err.to_string(), "Error: Exception detected");
        assert!(captured.contents().contains("Malformed row, column 'id'"));
    }

    #[test]
    fn test_data_column_passes_through() {
        let row: Row = serde_json::from_value(json!({ "id": 5, "data": null })).unwrap();
        assert_eq!(node_from_row(&row).unwrap().data, Value::Null);

        let row: Row = serde_json::from_value(json!({ "id": 6 })).unwrap();
        assert_eq!(node_from_row(&row).unwrap().data, Value::Null);

        let row: Row =
            serde_json::from_value(json!({ "id": 7, "data": [1, "two"] })).unwrap();
        assert_eq!(node_from_row(&row).unwrap().data, json!([1, "two"]));
    }
}
