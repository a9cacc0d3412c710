use std::{fmt, io};

/// Crate-wide `Result` type using [`DumpError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, DumpError>;

/// Top-level error type for dump operations.
///
/// This type wraps more specific error kinds and provides a single
/// error type that can be used throughout the crate.
#[derive(Debug)]
pub enum DumpError {
    /// Connection-related errors.
    Connection(ConnectionError),

    /// Errors reported by the graph store or its responses.
    Store(StoreError),

    /// Export pipeline errors.
    Export(ExportError),

    /// Configuration errors.
    Config(ConfigError),

    /// I/O errors.
    Io(io::Error),

    /// HTTP transport errors.
    Http(reqwest::Error),

    /// JSON encoding or decoding errors.
    Json(serde_json::Error),

    /// Fault constructed by the error wrapper after a caught failure.
    Exception(String),

    /// A panic captured by the error wrapper.
    Panic(String),

    /// A fault whose diagnostic report has already been emitted.
    Reported(Box<DumpError>),
}

/// Connection-specific errors.
#[derive(Debug)]
pub enum ConnectionError {
    /// Failed to establish a connection.
    ConnectionFailed(String),

    /// Not currently connected to the store.
    NotConnected,
}

/// Store-query faults.
#[derive(Debug)]
pub enum StoreError {
    /// The server rejected a Cypher statement.
    QueryFailed {
        code: String,
        message: String,
        statement: String,
    },

    /// Non-success HTTP status from the store endpoint.
    HttpStatus { status: u16, body: String },

    /// A result row is missing a column or carries the wrong type.
    MalformedRow { column: String, reason: String },

    /// The response body does not have the expected shape.
    MalformedResponse(String),
}

/// Export pipeline errors.
#[derive(Debug)]
pub enum ExportError {
    /// Batch size below one.
    InvalidBatchSize(usize),

    /// Output target cannot be opened or written.
    Output(String),
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file not found.
    FileNotFound(String),

    /// Invalid config format.
    InvalidFormat(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },
}

/// Attribute set rendered by the diagnostic report.
///
/// `display` is the error's string form; every other attribute is optional
/// and omitted from the report when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaultDetails {
    pub display: String,
    pub stack: Option<String>,
    pub arguments: Option<String>,
    pub kind: Option<String>,
    pub message: Option<String>,
}

impl DumpError {
    /// Whether this fault has already been reported on the diagnostic stream.
    pub fn is_reported(&self) -> bool {
        matches!(self, DumpError::Reported(_))
    }

    /// The fault with any `Reported` marker removed.
    pub fn inner(&self) -> &DumpError {
        match self {
            DumpError::Reported(inner) => inner.inner(),
            other => other,
        }
    }

    /// Short variant path used as the `type` attribute of reports.
    pub fn kind_name(&self) -> String {
        match self.inner() {
            DumpError::Connection(e) => format!("ConnectionError::{}", e.variant()),
            DumpError::Store(e) => format!("StoreError::{}", e.variant()),
            DumpError::Export(e) => format!("ExportError::{}", e.variant()),
            DumpError::Config(e) => format!("ConfigError::{}", e.variant()),
            DumpError::Io(e) => format!("Io::{:?}", e.kind()),
            DumpError::Http(_) => "Http".to_string(),
            DumpError::Json(_) => "Json".to_string(),
            DumpError::Exception(_) => "Exception".to_string(),
            DumpError::Panic(_) => "Panic".to_string(),
            DumpError::Reported(inner) => inner.kind_name(),
        }
    }

    /// Collect the attributes shown by the diagnostic report.
    pub fn details(&self) -> FaultDetails {
        let display = self.to_string();

        let mut causes = Vec::new();
        let mut source = std::error::Error::source(self.inner());
        while let Some(cause) = source {
            causes.push(format!("caused by: {cause}"));
            source = cause.source();
        }
        let stack = if causes.is_empty() {
            None
        } else {
            Some(std::iter::once(display.clone()).chain(causes).collect::<Vec<_>>().join("\n"))
        };

        let (arguments, message) = match self.inner() {
            DumpError::Store(StoreError::QueryFailed {
                message, statement, ..
            }) => (Some(statement.clone()), Some(message.clone())),
            DumpError::Store(StoreError::HttpStatus { body, .. }) => (None, Some(body.clone())),
            DumpError::Store(StoreError::MalformedRow { column, reason }) => {
                (Some(column.clone()), Some(reason.clone()))
            }
            DumpError::Export(ExportError::InvalidBatchSize(size)) => {
                (Some(size.to_string()), None)
            }
            DumpError::Exception(msg) | DumpError::Panic(msg) => (None, Some(msg.clone())),
            DumpError::Connection(ConnectionError::ConnectionFailed(msg)) => {
                (None, Some(msg.clone()))
            }
            _ => (None, None),
        };

        FaultDetails {
            display,
            stack,
            arguments,
            kind: Some(self.kind_name()),
            message: message.filter(|m| !m.is_empty()),
        }
    }
}

impl ConnectionError {
    fn variant(&self) -> &'static str {
        match self {
            ConnectionError::ConnectionFailed(_) => "ConnectionFailed",
            ConnectionError::NotConnected => "NotConnected",
        }
    }
}

impl StoreError {
    fn variant(&self) -> &'static str {
        match self {
            StoreError::QueryFailed { .. } => "QueryFailed",
            StoreError::HttpStatus { .. } => "HttpStatus",
            StoreError::MalformedRow { .. } => "MalformedRow",
            StoreError::MalformedResponse(_) => "MalformedResponse",
        }
    }
}

impl ExportError {
    fn variant(&self) -> &'static str {
        match self {
            ExportError::InvalidBatchSize(_) => "InvalidBatchSize",
            ExportError::Output(_) => "Output",
        }
    }
}

impl ConfigError {
    fn variant(&self) -> &'static str {
        match self {
            ConfigError::FileNotFound(_) => "FileNotFound",
            ConfigError::InvalidFormat(_) => "InvalidFormat",
            ConfigError::InvalidValue { .. } => "InvalidValue",
        }
    }
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for DumpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DumpError::Connection(e) => write!(f, "Connection error: {e}"),
            DumpError::Store(e) => write!(f, "Store error: {e}"),
            DumpError::Export(e) => write!(f, "Export error: {e}"),
            DumpError::Config(e) => write!(f, "Configuration error: {e}"),
            DumpError::Io(e) => write!(f, "I/O error: {e}"),
            DumpError::Http(e) => write!(f, "HTTP error: {e}"),
            DumpError::Json(e) => write!(f, "JSON error: {e}"),
            DumpError::Exception(msg) => write!(f, "Error: {msg}"),
            DumpError::Panic(msg) => write!(f, "Panic: {msg}"),
            DumpError::Reported(inner) => write!(f, "{inner}"),
        }
    }
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionError::ConnectionFailed(msg) => write!(f, "Failed to connect: {msg}"),
            ConnectionError::NotConnected => write!(f, "Not connected to the graph store"),
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::QueryFailed { code, message, .. } => {
                write!(f, "Query failed: {code}: {message}")
            }
            StoreError::HttpStatus { status, .. } => {
                write!(f, "Store endpoint answered with HTTP {status}")
            }
            StoreError::MalformedRow { column, reason } => {
                write!(f, "Malformed row, column '{column}': {reason}")
            }
            StoreError::MalformedResponse(msg) => write!(f, "Malformed response: {msg}"),
        }
    }
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::InvalidBatchSize(size) => {
                write!(f, "Invalid batch size {size}: must be at least 1")
            }
            ExportError::Output(msg) => write!(f, "Output error: {msg}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {path}"),
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
        }
    }
}

impl std::error::Error for DumpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DumpError::Io(e) => Some(e),
            DumpError::Http(e) => Some(e),
            DumpError::Json(e) => Some(e),
            DumpError::Reported(inner) => inner.source(),
            _ => None,
        }
    }
}
impl std::error::Error for ConnectionError {}
impl std::error::Error for StoreError {}
impl std::error::Error for ExportError {}
impl std::error::Error for ConfigError {}

/* ========================= Conversions to DumpError ========================= */

impl From<io::Error> for DumpError {
    fn from(err: io::Error) -> Self {
        DumpError::Io(err)
    }
}

impl From<reqwest::Error> for DumpError {
    fn from(err: reqwest::Error) -> Self {
        DumpError::Http(err)
    }
}

impl From<serde_json::Error> for DumpError {
    fn from(err: serde_json::Error) -> Self {
        DumpError::Json(err)
    }
}

impl From<ConnectionError> for DumpError {
    fn from(err: ConnectionError) -> Self {
        DumpError::Connection(err)
    }
}

impl From<StoreError> for DumpError {
    fn from(err: StoreError) -> Self {
        DumpError::Store(err)
    }
}

impl From<ExportError> for DumpError {
    fn from(err: ExportError) -> Self {
        DumpError::Export(err)
    }
}

impl From<ConfigError> for DumpError {
    fn from(err: ConfigError) -> Self {
        DumpError::Config(err)
    }
}

impl From<toml::de::Error> for DumpError {
    fn from(err: toml::de::Error) -> Self {
        DumpError::Config(ConfigError::InvalidFormat(err.to_string()))
    }
}

impl From<toml::ser::Error> for DumpError {
    fn from(err: toml::ser::Error) -> Self {
        DumpError::Config(ConfigError::InvalidFormat(err.to_string()))
    }
}
