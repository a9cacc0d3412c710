//! Connection management for the Neo4j HTTP endpoint
//!
//! This module provides:
//! - Connection establishment against the discovery endpoint
//! - Connection state tracking
//! - Cypher statement transport over the transactional HTTP API
//! - The [`GraphStore`] seam used by the export pipeline

pub mod store;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::config::ConnectionConfig;
use crate::error::{ConnectionError, Result, StoreError};

pub use store::{GraphStore, HttpGraphStore, Row};

/// Neo4j HTTP connection manager
///
/// Owns the HTTP client and knows how to reach the transactional Cypher
/// endpoint of one database.
pub struct ConnectionManager {
    /// HTTP client, present once connected
    client: Option<Client>,

    /// Connection configuration
    config: ConnectionConfig,

    /// Current connection state
    state: ConnectionState,

    /// Server version reported by the discovery endpoint
    server_version: Option<String>,
}

/// Connection state information
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected
    Disconnected,

    /// Connected and ready
    Connected,

    /// Connection failed
    Failed(String),
}

#[derive(Debug, Deserialize)]
struct TxResponse {
    #[serde(default)]
    results: Vec<StatementResult>,
    #[serde(default)]
    errors: Vec<TxError>,
}

#[derive(Debug, Deserialize)]
struct StatementResult {
    columns: Vec<String>,
    data: Vec<RowData>,
}

#[derive(Debug, Deserialize)]
struct RowData {
    row: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct TxError {
    code: String,
    message: String,
}

impl ConnectionManager {
    /// Create a new connection manager
    ///
    /// # Arguments
    /// * `config` - Connection configuration (URI, database, credentials)
    ///
    /// # Returns
    /// * `Self` - New connection manager instance
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            client: None,
            config,
            state: ConnectionState::Disconnected,
            server_version: None,
        }
    }

    /// Base URI without a trailing slash
    pub fn base_uri(&self) -> &str {
        self.config.uri.trim_end_matches('/')
    }

    /// Transactional commit endpoint for the configured database
    pub fn commit_endpoint(&self) -> String {
        format!("{}/db/{}/tx/commit", self.base_uri(), self.config.database)
    }

    /// Establish the connection
    ///
    /// Builds the HTTP client and queries the discovery endpoint. No query
    /// timeout is applied; only establishing a TCP connection is bounded.
    ///
    /// # Returns
    /// * `Result<()>` - Success or connection error
    pub async fn connect(&mut self) -> Result<()> {
        let client = Client::builder()
            .connect_timeout(self.config.connect_timeout())
            .build()
            .map_err(|e| ConnectionError::ConnectionFailed(e.to_string()))?;

        match self.discover(&client).await {
            Ok(version) => {
                info!(
                    "Connected to {} (server version: {})",
                    crate::utils::sanitize_uri(self.base_uri()),
                    version.as_deref().unwrap_or("unknown")
                );
                self.server_version = version;
                self.client = Some(client);
                self.state = ConnectionState::Connected;
                Ok(())
            }
            Err(e) => {
                self.client = None;
                self.state = ConnectionState::Failed(e.to_string());
                Err(ConnectionError::ConnectionFailed(e.to_string()).into())
            }
        }
    }

    async fn discover(&self, client: &Client) -> Result<Option<String>> {
        let request = self.authorize(client.get(format!("{}/", self.base_uri())));
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::HttpStatus {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            }
            .into());
        }
        let body: Value = response.json().await.unwrap_or(Value::Null);
        Ok(body
            .get("neo4j_version")
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.username {
            Some(user) => request.basic_auth(user, self.config.password.as_deref()),
            None => request,
        }
    }

    /// Get the HTTP client
    ///
    /// # Returns
    /// * `Result<&Client>` - Reference to client, the failure that ended the
    ///   last connect attempt, or `NotConnected`
    pub fn get_client(&self) -> Result<&Client> {
        match (&self.state, &self.client) {
            (ConnectionState::Connected, Some(client)) => Ok(client),
            (ConnectionState::Failed(reason), _) => {
                Err(ConnectionError::ConnectionFailed(reason.clone()).into())
            }
            _ => Err(ConnectionError::NotConnected.into()),
        }
    }

    /// Server version reported on connect, if any
    pub fn server_version(&self) -> Option<&str> {
        self.server_version.as_deref()
    }

    /// Run one Cypher statement in an auto-commit transaction
    ///
    /// # Arguments
    /// * `statement` - Cypher text
    /// * `parameters` - Statement parameters
    ///
    /// # Returns
    /// * `Result<Vec<Row>>` - Rows keyed by column name, in server order
    pub async fn run_cypher(&self, statement: &str, parameters: Value) -> Result<Vec<Row>> {
        let client = self.get_client()?;
        let body = json!({
            "statements": [{ "statement": statement, "parameters": parameters }]
        });

        debug!("POST {} : {}", self.commit_endpoint(), statement);
        let response = self
            .authorize(client.post(self.commit_endpoint()))
            .header(reqwest::header::ACCEPT, "application/json;charset=UTF-8")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::HttpStatus {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            }
            .into());
        }

        let payload: TxResponse = response.json().await.map_err(|e| {
            StoreError::MalformedResponse(format!("cannot decode transaction response: {e}"))
        })?;
        Self::into_rows(statement, payload)
    }

    fn into_rows(statement: &str, payload: TxResponse) -> Result<Vec<Row>> {
        if let Some(err) = payload.errors.into_iter().next() {
            return Err(StoreError::QueryFailed {
                code: err.code,
                message: err.message,
                statement: statement.to_string(),
            }
            .into());
        }

        let result = payload.results.into_iter().next().ok_or_else(|| {
            StoreError::MalformedResponse("response carries no statement result".to_string())
        })?;

        Ok(result
            .data
            .into_iter()
            .map(|data| {
                result
                    .columns
                    .iter()
                    .cloned()
                    .zip(data.row)
                    .collect::<Map<String, Value>>()
            })
            .collect())
    }
}
