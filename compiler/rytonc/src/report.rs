//! Rendering driver failures in the configured output format.

use ry_diagnostic::emitter::{DiagnosticEmitter, JsonEmitter, PanelEmitter};
use ry_diagnostic::{Diagnostic, ErrorCode, LocationTracker, Report};
use ry_eval::{FaultFormat, FaultReporter};
use ry_ir::SourceUnit;

use crate::config::SessionConfig;
use crate::error::DriverError;

pub struct Reporter {
    format: FaultFormat,
    radius: u32,
}

impl Reporter {
    pub fn new(config: &SessionConfig, is_tty: bool, width: usize) -> Self {
        Reporter {
            format: config.fault_format(is_tty, width),
            radius: config.context_radius,
        }
    }

    /// Reporter for stderr of the current process.
    pub fn stderr(config: &SessionConfig) -> Self {
        let is_tty = std::io::IsTerminal::is_terminal(&std::io::stderr());
        Self::new(config, is_tty, ry_diagnostic::emitter::terminal_width())
    }

    /// Text to print for `error`, with a trailing newline.
    pub fn render(&self, error: &DriverError) -> String {
        match error {
            DriverError::Usage(message) => format!("error: {message}\n"),
            DriverError::Config(e) => format!("error: {e}\n"),
            DriverError::Exec { program, error } => FaultReporter::new(self.format)
                .with_radius(self.radius)
                .render(error, program.as_deref()),
            DriverError::Compile { unit, error } => {
                self.located(&error.to_diagnostic(), unit)
            }
            DriverError::Resolution { unit, error } => {
                // Failures inside a package point into the package source.
                let unit = error.unit().unwrap_or(unit);
                self.located(&error.to_diagnostic(), unit)
            }
            DriverError::Io { .. } => {
                let diag = Diagnostic::error(ErrorCode::E5001).with_message(error.to_string());
                self.emit(&Report::build(&diag, None, None, self.radius))
            }
            DriverError::Artifact(e) => {
                self.emit(&Report::build(&e.to_diagnostic(), None, None, self.radius))
            }
        }
    }

    fn located(&self, diag: &Diagnostic, unit: &SourceUnit) -> String {
        let tracker = LocationTracker::new(unit.clone());
        self.emit(&Report::build(diag, Some(&tracker), None, self.radius))
    }

    fn emit(&self, report: &Report) -> String {
        match self.format {
            FaultFormat::Json => {
                let mut emitter = JsonEmitter::new(Vec::new());
                emitter.emit(report);
                String::from_utf8_lossy(&emitter.into_inner()).into_owned()
            }
            FaultFormat::Panel {
                color,
                is_tty,
                width,
            } => PanelEmitter::new(Vec::new(), color, is_tty, width).render(report),
        }
    }
}
