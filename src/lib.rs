//! Neo4j Dump Library
//!
//! This library provides the core functionality of the `neo4jdump` tool: a
//! paginated bulk exporter that streams every node and then every
//! relationship of a graph as one self-delimiting line per record.
//!
//! # Modules
//!
//! - `cli`: Command-line interface and argument parsing
//! - `config`: Configuration management
//! - `connection`: Neo4j HTTP connection and the graph store adapter
//! - `error`: Error types, diagnostic reports and the catch-fail wrapper
//! - `export`: Backlog, fetcher, batch drainer and export coordinator
//! - `formatter`: Record line format and newline escaping
//! - `utils`: Diagnostic stream and small helpers
//!
//! # Example
//!
//! ```no_run
//! use neo4jdump::{config::Config, connection::ConnectionManager};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let mut manager = ConnectionManager::new(config.connection);
//!
//!     manager.connect().await?;
//!     println!("Connected to Neo4j {:?}", manager.server_version());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod connection;
pub mod error;
pub mod export;
pub mod formatter;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use connection::{ConnectionManager, GraphStore, HttpGraphStore};
pub use error::{DumpError, ErrorWrapper, Result};
pub use export::{DumpWriter, ExportCoordinator, ExportResult, Record};
pub use formatter::LineFormatter;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
///
/// # Returns
/// * `&str` - Version string
pub fn version() -> &'static str {
    VERSION
}
