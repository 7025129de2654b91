//! Rendering execution failures for the user.

use ry_diagnostic::emitter::{ColorMode, DiagnosticEmitter, JsonEmitter, PanelEmitter};
use ry_diagnostic::{RenderGuard, Report};

use crate::errors::ExecError;
use crate::program::Program;

/// Source lines shown on each side of a fault by default.
pub const DEFAULT_CONTEXT_RADIUS: u32 = 2;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FaultFormat {
    Panel {
        color: ColorMode,
        is_tty: bool,
        width: usize,
    },
    /// One JSON record per line.
    Json,
}

/// Turns an [`ExecError`] into a rendered report.
///
/// Rendering goes through a [`RenderGuard`]: a fault raised while another
/// is being rendered gets the one-line form, and past the nesting ceiling
/// only a fallback line is produced.
#[derive(Debug)]
pub struct FaultReporter {
    format: FaultFormat,
    radius: u32,
    guard: RenderGuard,
}

impl FaultReporter {
    pub fn new(format: FaultFormat) -> Self {
        FaultReporter {
            format,
            radius: DEFAULT_CONTEXT_RADIUS,
            guard: RenderGuard::default(),
        }
    }

    #[must_use]
    pub fn with_radius(mut self, radius: u32) -> Self {
        self.radius = radius;
        self
    }

    pub fn guard(&self) -> &RenderGuard {
        &self.guard
    }

    /// Resolve `error` against the program it came from, when known.
    pub fn report(&self, error: &ExecError, program: Option<&Program>) -> Report {
        let diag = error.to_diagnostic();
        match (error, program) {
            (ExecError::Fault(fault), Some(program)) => {
                let (tracker, blocks) = program.locate(fault.package.as_deref());
                Report::build(&diag, Some(&tracker), Some(blocks), self.radius)
                    .with_trace(fault.trace.clone())
            }
            (ExecError::Fault(fault), None) => {
                Report::build(&diag, None, None, self.radius).with_trace(fault.trace.clone())
            }
            _ => Report::build(&diag, None, None, self.radius),
        }
    }

    pub fn render(&self, error: &ExecError, program: Option<&Program>) -> String {
        let Some(token) = self.guard.enter() else {
            let diag = error.to_diagnostic();
            return format!("{}\n", RenderGuard::fallback_line(&diag.kind, &diag.message));
        };
        let report = self.report(error, program);
        match self.format {
            FaultFormat::Json => {
                let mut emitter = JsonEmitter::new(Vec::new());
                emitter.emit(&report);
                String::from_utf8_lossy(&emitter.into_inner()).into_owned()
            }
            FaultFormat::Panel { .. } if token.is_nested() => {
                format!("{}\n", PanelEmitter::<Vec<u8>>::render_compact(&report))
            }
            FaultFormat::Panel {
                color,
                is_tty,
                width,
            } => PanelEmitter::new(Vec::new(), color, is_tty, width).render(&report),
        }
    }
}
