//! Diagnostic reports and the catch-fail adapter.
//!
//! Every fault in the dump pipeline is funneled through an [`ErrorWrapper`],
//! which renders a bordered report on the diagnostic stream the first time
//! the fault is observed and marks it as [`DumpError::Reported`] so that no
//! later stage reports it again.

use std::any::Any;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};

use futures::FutureExt;
use tracing::debug;

use super::kinds::{DumpError, FaultDetails, Result};
use crate::utils::DiagnosticStream;

/// Width of a report, border included.
pub const REPORT_WIDTH: usize = 78;

/// Message carried by faults constructed after a caught failure.
pub const EXCEPTION_DETECTED: &str = "Exception detected";

/// Constructor for the fault handed to fallback handlers.
pub type FaultKind = fn(&str) -> DumpError;

fn default_fault_kind(message: &str) -> DumpError {
    DumpError::Exception(message.to_string())
}

fn dashes(count: usize) -> String {
    "-".repeat(count.min(REPORT_WIDTH - 1))
}

/// Border line with `label` centered between `left` and `right`.
fn titled_border(left: char, label: &str, right: char) -> String {
    let room = REPORT_WIDTH.saturating_sub(4 + label.len());
    let lead = room / 2;
    format!("{left}{} {label} {}{right}", dashes(lead), dashes(room - lead))
}

fn prefixed(text: &str) -> String {
    text.split('\n')
        .map(|row| format!("| {row}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render a diagnostic report.
///
/// Layout: a title border, the fault's string form, then one bordered
/// section per present attribute among `stack`, `arguments`, `type` and
/// `message`. `message` is skipped when the string form already contains
/// it; the first `stack` row is skipped when it repeats the string form.
pub fn render_report(title: &str, details: &FaultDetails) -> String {
    let title = if title.is_empty() { "Error" } else { title };
    let mut out = vec![String::new(), titled_border('/', title, '\\')];
    out.push(prefixed(&details.display));

    let sections = [
        ("stack", details.stack.as_deref()),
        ("arguments", details.arguments.as_deref()),
        ("type", details.kind.as_deref()),
        ("message", details.message.as_deref()),
    ];

    for (key, value) in sections {
        let Some(value) = value.filter(|v| !v.is_empty()) else {
            continue;
        };
        if key == "message" && details.display.contains(value) {
            continue;
        }
        out.push(titled_border('+', key, '+'));

        let mut rows: Vec<&str> = value.split('\n').collect();
        if rows.len() > 1 && key == "stack" && rows[0] == details.display {
            rows.remove(0);
        }
        out.push(prefixed(&rows.join("\n")));
    }

    out.push(format!("\\{}/", dashes(REPORT_WIDTH - 2)));
    out.push(String::new());
    out.join("\n") + "\n"
}

/// Human-readable text of a caught panic payload.
fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Uniform try/recover adapter.
///
/// Wrapped work keeps its calling convention. On success the value passes
/// through unchanged; on an `Err` or a panic the wrapper emits a report and
/// hands a freshly constructed fault (see [`ErrorWrapper::with_fault_kind`])
/// to a fallback handler whose result is returned instead.
#[derive(Clone)]
pub struct ErrorWrapper {
    diagnostics: DiagnosticStream,
    fault_kind: FaultKind,
}

impl ErrorWrapper {
    /// Create a wrapper that reports to `diagnostics`
    pub fn new(diagnostics: DiagnosticStream) -> Self {
        Self {
            diagnostics,
            fault_kind: default_fault_kind,
        }
    }

    /// Override the kind of fault handed to fallback handlers
    pub fn with_fault_kind(mut self, fault_kind: FaultKind) -> Self {
        self.fault_kind = fault_kind;
        self
    }

    /// The diagnostic stream this wrapper reports to
    pub fn diagnostics(&self) -> &DiagnosticStream {
        &self.diagnostics
    }

    /// Emit a report for `err` on the diagnostic stream
    pub fn print(&self, title: &str, err: &DumpError) {
        debug!("Reporting fault: {}", err);
        self.diagnostics
            .write_str(&render_report(title, &err.details()));
    }

    /// Report `fault` unless that already happened, and mark it reported
    pub fn observe(&self, title: &str, fault: DumpError) -> DumpError {
        if fault.is_reported() {
            return fault;
        }
        self.print(title, &fault);
        DumpError::Reported(Box::new(fault))
    }

    fn attempt<A, T, F>(&self, work: &mut F, args: A) -> Result<T>
    where
        F: FnMut(A) -> Result<T>,
    {
        let fault = match panic::catch_unwind(AssertUnwindSafe(|| work(args))) {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(err)) => err,
            Err(payload) => DumpError::Panic(panic_message(payload)),
        };
        self.observe("Exception", fault);
        Err(DumpError::Reported(Box::new((self.fault_kind)(
            EXCEPTION_DETECTED,
        ))))
    }

    /// Wrap `work` with the catch-and-log default fallback.
    ///
    /// A fault is reported, the constructed fault is reported once more as
    /// `Uncaught Exception`, and the wrapped call yields `None`.
    pub fn catch_fail<A, T, F>(&self, mut work: F) -> impl FnMut(A) -> Option<T>
    where
        F: FnMut(A) -> Result<T>,
    {
        let wrapper = self.clone();
        move |args| match wrapper.attempt(&mut work, args) {
            Ok(value) => Some(value),
            Err(fault) => {
                wrapper.print("Uncaught Exception", fault.inner());
                None
            }
        }
    }

    /// Wrap `work`, routing faults to `fallback`.
    ///
    /// Callers that must abort on failure pass a fallback that returns the
    /// fault as an `Err`.
    pub fn catch_fail_with<A, T, F, H>(&self, mut work: F, mut fallback: H) -> impl FnMut(A) -> Result<T>
    where
        F: FnMut(A) -> Result<T>,
        H: FnMut(DumpError) -> Result<T>,
    {
        let wrapper = self.clone();
        move |args| match wrapper.attempt(&mut work, args) {
            Ok(value) => Ok(value),
            Err(fault) => fallback(fault),
        }
    }

    /// Await `future`, reporting a failure or panic exactly once.
    ///
    /// The returned error is always [`DumpError::Reported`].
    pub async fn guard<T, Fut>(&self, title: &str, future: Fut) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        match AssertUnwindSafe(future).catch_unwind().await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(self.observe(title, err)),
            Err(payload) => Err(self.observe(title, DumpError::Panic(panic_message(payload)))),
        }
    }
}
