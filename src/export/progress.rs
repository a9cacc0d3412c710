//! Progress tracking for export passes
//!
//! On a terminal the pass is shown with an `indicatif` spinner; otherwise a
//! plain carriage-return protocol is written to the diagnostic stream:
//!
//! ```text
//! Nodes: 0% (-)
//! \rNodes: 40% (\)
//! \rNodes: 100%. ALL DONE.
//! ```

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::utils::DiagnosticStream;

/// Spinner glyphs, advanced once per batch.
pub const SPINNER_FRAMES: [&str; 4] = ["\\", "|", "/", "-"];

/// Spinner ticks for the `indicatif` bar.
///
/// Tick 0 shows the same `-` as the plain start line, and tick `n` shows
/// `SPINNER_FRAMES[n - 1]`. The last entry is the finished glyph.
pub const BAR_TICKS: [&str; 5] = ["-", "\\", "|", "/", "-"];

/// How progress is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressMode {
    /// Nothing is rendered
    Hidden,
    /// Carriage-return text lines on the diagnostic stream
    Plain,
    /// `indicatif` spinner on stderr
    Bar,
}

impl ProgressMode {
    /// Pick a mode for `diagnostics`
    pub fn detect(enabled: bool, diagnostics: &DiagnosticStream) -> Self {
        match (enabled, diagnostics.is_terminal()) {
            (false, _) => ProgressMode::Hidden,
            (true, true) => ProgressMode::Bar,
            (true, false) => ProgressMode::Plain,
        }
    }
}

/// Whole percent for a progress fraction
pub fn percent(progress: f64) -> u32 {
    (progress.clamp(0.0, 1.0) * 100.0).round() as u32
}

/// Plain-mode line for one update
pub fn render_update(label: &str, progress: f64, frame: usize) -> String {
    format!(
        "\r{}: {}% ({})     ",
        label,
        percent(progress),
        SPINNER_FRAMES[frame % SPINNER_FRAMES.len()]
    )
}

/// Progress tracker for one pass
pub struct ProgressTracker {
    label: &'static str,
    mode: ProgressMode,
    frame: usize,
    diagnostics: DiagnosticStream,
    bar: Option<ProgressBar>,
}

impl ProgressTracker {
    /// Create a new progress tracker
    ///
    /// # Arguments
    /// * `label` - Pass name shown in front of the percentage
    /// * `mode` - Rendering mode
    /// * `diagnostics` - Stream for plain-mode output
    pub fn new(label: &'static str, mode: ProgressMode, diagnostics: DiagnosticStream) -> Self {
        let bar = (mode == ProgressMode::Bar).then(|| {
            let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
            bar.set_style(
                ProgressStyle::with_template("{prefix}: {msg}% ({spinner})")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner())
                    .tick_strings(&BAR_TICKS),
            );
            bar.set_prefix(label);
            bar
        });

        Self {
            label,
            mode,
            frame: 0,
            diagnostics,
            bar,
        }
    }

    /// Render the initial 0% state
    pub fn start(&self) {
        match self.mode {
            ProgressMode::Plain => self
                .diagnostics
                .write_str(&format!("{}: 0% (-)   ", self.label)),
            ProgressMode::Bar => {
                if let Some(ref bar) = self.bar {
                    bar.set_message("0");
                }
            }
            ProgressMode::Hidden => {}
        }
    }

    /// Record that a batch finished and the pass is `progress` complete
    pub fn update(&mut self, progress: f64) {
        match self.mode {
            ProgressMode::Plain => self
                .diagnostics
                .write_str(&render_update(self.label, progress, self.frame)),
            ProgressMode::Bar => {
                if let Some(ref bar) = self.bar {
                    bar.set_message(percent(progress).to_string());
                    bar.tick();
                }
            }
            ProgressMode::Hidden => {}
        }
        self.frame += 1;
    }

    /// Render the terminal `ALL DONE` state
    pub fn finish(&self) {
        match self.mode {
            ProgressMode::Plain => self.diagnostics.write_str(&format!(
                "\r{}: 100%. ALL DONE.             \n",
                self.label
            )),
            ProgressMode::Bar => {
                if let Some(ref bar) = self.bar {
                    if let Ok(style) = ProgressStyle::with_template("{prefix}: {msg}") {
                        bar.set_style(style);
                    }
                    bar.finish_with_message("100%. ALL DONE.");
                }
            }
            ProgressMode::Hidden => {}
        }
    }

    /// Leave the current state on screen after a failure
    pub fn abandon(&self) {
        match self.mode {
            ProgressMode::Plain => self.diagnostics.write_str("\n"),
            ProgressMode::Bar => {
                if let Some(ref bar) = self.bar {
                    bar.abandon();
                }
            }
            ProgressMode::Hidden => {}
        }
    }
}
