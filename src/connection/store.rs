//! Graph store abstraction
//!
//! The export pipeline only needs two capabilities from a store: listing
//! every identifier of a collection, and fetching rows for a set of
//! identifiers. [`HttpGraphStore`] provides both over Cypher.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::debug;

use super::ConnectionManager;
use crate::error::{Result, StoreError};
use crate::export::{CollectionKind, EntityId};

/// A result row keyed by column name
pub type Row = Map<String, Value>;

const LIST_NODE_IDS: &str = "MATCH (n) RETURN id(n) AS id";

const LIST_RELATIONSHIP_IDS: &str = "MATCH ()-[r]->() RETURN id(r) AS id";

const FETCH_NODES: &str = "MATCH (n) WHERE id(n) IN $ids \
     RETURN id(n) AS id, properties(n) AS data \
     LIMIT size($ids)";

const FETCH_RELATIONSHIPS: &str = "MATCH (a)-[r]->(b) WHERE id(r) IN $ids \
     RETURN id(r) AS id, type(r) AS type, id(a) AS start, id(b) AS end, properties(r) AS data \
     LIMIT size($ids)";

/// Trait for the data store the dump reads from
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// List every identifier of `kind`, in store order
    async fn list_ids(&self, kind: CollectionKind) -> Result<Vec<EntityId>>;

    /// Fetch the rows for exactly `ids`
    ///
    /// Row order is whatever the store yields; it need not echo `ids`.
    async fn fetch_rows(&self, kind: CollectionKind, ids: &[EntityId]) -> Result<Vec<Row>>;
}

/// Read an integer column from a row
pub fn column_i64(row: &Row, column: &str) -> Result<i64> {
    match row.get(column) {
        Some(value) => value.as_i64().ok_or_else(|| {
            StoreError::MalformedRow {
                column: column.to_string(),
                reason: format!("expected an integer, found {value}"),
            }
            .into()
        }),
        None => Err(StoreError::MalformedRow {
            column: column.to_string(),
            reason: "column missing".to_string(),
        }
        .into()),
    }
}

/// Read a string column from a row
pub fn column_str<'a>(row: &'a Row, column: &str) -> Result<&'a str> {
    match row.get(column) {
        Some(value) => value.as_str().ok_or_else(|| {
            StoreError::MalformedRow {
                column: column.to_string(),
                reason: format!("expected a string, found {value}"),
            }
            .into()
        }),
        None => Err(StoreError::MalformedRow {
            column: column.to_string(),
            reason: "column missing".to_string(),
        }
        .into()),
    }
}

/// [`GraphStore`] over the Neo4j HTTP transactional endpoint
pub struct HttpGraphStore {
    manager: ConnectionManager,
}

impl HttpGraphStore {
    /// Wrap a connected manager
    pub fn new(manager: ConnectionManager) -> Self {
        Self { manager }
    }
}

#[async_trait]
impl GraphStore for HttpGraphStore {
    async fn list_ids(&self, kind: CollectionKind) -> Result<Vec<EntityId>> {
        let statement = match kind {
            CollectionKind::Nodes => LIST_NODE_IDS,
            CollectionKind::Relationships => LIST_RELATIONSHIP_IDS,
        };
        let rows = self.manager.run_cypher(statement, json!({})).await?;
        let ids = rows
            .iter()
            .map(|row| column_i64(row, "id"))
            .collect::<Result<Vec<_>>>()?;
        debug!("Listed {} {}", ids.len(), kind.noun());
        Ok(ids)
    }

    async fn fetch_rows(&self, kind: CollectionKind, ids: &[EntityId]) -> Result<Vec<Row>> {
        let statement = match kind {
            CollectionKind::Nodes => FETCH_NODES,
            CollectionKind::Relationships => FETCH_RELATIONSHIPS,
        };
        self.manager
            .run_cypher(statement, json!({ "ids": ids }))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConnectionConfig;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn connected_store(server: &MockServer) -> HttpGraphStore {
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(server)
            .await;
        let mut manager = ConnectionManager::new(ConnectionConfig {
            uri: server.uri(),
            ..ConnectionConfig::default()
        });
        manager.connect().await.unwrap();
        HttpGraphStore::new(manager)
    }

    fn rows_response(columns: &[&str], rows: Vec<Value>) -> ResponseTemplate {
        let data: Vec<Value> = rows.into_iter().map(|row| json!({ "row": row })).collect();
        ResponseTemplate::new(200).set_body_json(json!({
            "results": [{ "columns": columns, "data": data }],
            "errors": []
        }))
    }

    #[test]
    fn test_column_helpers() {
        let row: Row = serde_json::from_value(json!({ "id": 4, "type": "KNOWS" })).unwrap();
        assert_eq!(column_i64(&row, "id").unwrap(), 4);
        assert_eq!(column_str(&row, "type").unwrap(), "KNOWS");
        assert!(column_i64(&row, "type").is_err());
        assert!(column_str(&row, "missing").is_err());
    }

    #[tokio::test]
    async fn test_list_node_ids() {
        let server = MockServer::start().await;
        let store = connected_store(&server).await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "statements": [{ "statement": LIST_NODE_IDS }]
            })))
            .respond_with(rows_response(&["id"], vec![json!([3]), json!([1]), json!([2])]))
            .mount(&server)
            .await;

        let ids = store.list_ids(CollectionKind::Nodes).await.unwrap();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[tokio::test]
    async fn test_fetch_relationship_rows_sends_ids() {
        let server = MockServer::start().await;
        let store = connected_store(&server).await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "statements": [{ "parameters": { "ids": [7, 8] } }]
            })))
            .respond_with(rows_response(
                &["id", "type", "start", "end", "data"],
                vec![json!([8, "LIKES", 3, 4, {}]), json!([7, "KNOWS", 1, 2, { "a": 1 }])],
            ))
            .expect(1)
            .mount(&server)
            .await;

        let rows = store
            .fetch_rows(CollectionKind::Relationships, &[7, 8])
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["type"], json!("KNOWS"));
    }

    #[tokio::test]
    async fn test_list_ids_rejects_non_integer() {
        let server = MockServer::start().await;
        let store = connected_store(&server).await;
        Mock::given(method("POST"))
            .respond_with(rows_response(&["id"], vec![json!(["x"])]))
            .mount(&server)
            .await;

        let err = store.list_ids(CollectionKind::Relationships).await.unwrap_err();
        assert!(err.to_string().contains("Malformed row"));
    }
}
