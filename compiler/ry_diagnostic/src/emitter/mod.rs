//! Diagnostic emitters.
//!
//! - Panel: boxed, human-readable output sized to the terminal
//! - JSON: one [`FaultRecord`](crate::FaultRecord) object per line for tooling

mod json;
mod panel;

pub use json::JsonEmitter;
pub use panel::{terminal_width, ColorMode, PanelEmitter};

use crate::Report;

/// Trait for emitting reports in various formats.
pub trait DiagnosticEmitter {
    fn emit(&mut self, report: &Report);

    fn emit_all(&mut self, reports: &[Report]) {
        for report in reports {
            self.emit(report);
        }
    }

    /// Flush any buffered output.
    fn flush(&mut self);

    /// Emit a summary of errors/warnings.
    fn emit_summary(&mut self, error_count: usize, warning_count: usize);
}
