//! Error handling module for dump operations.
//!
//! This module provides:
//! - Application-specific error types with structured report attributes
//! - The [`ErrorWrapper`] that renders bordered diagnostic reports and
//!   adapts fallible work into a catch-fail shape
//!
//! # Example
//!
//! ```rust,no_run
//! use neo4jdump::error::{DumpError, ErrorWrapper, Result};
//! use neo4jdump::utils::DiagnosticStream;
//!
//! let wrapper = ErrorWrapper::new(DiagnosticStream::stderr());
//! let mut parse = wrapper.catch_fail(|text: &str| -> Result<i64> {
//!     text.parse::<i64>()
//!         .map_err(|e| DumpError::Exception(e.to_string()))
//! });
//! assert_eq!(parse("42"), Some(42));
//! ```

pub mod kinds;
pub mod report;

// Re-export commonly used types
pub use kinds::{
    ConfigError, ConnectionError, DumpError, ExportError, FaultDetails, Result, StoreError,
};
pub use report::{render_report, ErrorWrapper, FaultKind, EXCEPTION_DETECTED, REPORT_WIDTH};
