//! Diagnostics resolved against source text and the block registry.

use serde::{Deserialize, Serialize};

use crate::{
    BlockRegistry, Confidence, ContextLine, Diagnostic, ErrorCode, Location, LocationTracker,
    Severity,
};

/// The machine-facing form of a fault, for tooling.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultRecord {
    pub code: String,
    pub kind: String,
    pub message: String,
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub block_hierarchy: Vec<String>,
}

/// Everything an emitter needs to present one diagnostic.
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    pub code: ErrorCode,
    pub severity: Severity,
    pub kind: String,
    pub message: String,
    pub file: String,
    pub location: Option<Location>,
    pub block_hierarchy: Vec<String>,
    pub context: Vec<ContextLine>,
    pub caret_width: u32,
    pub notes: Vec<String>,
    pub trace: Vec<String>,
}

impl Report {
    /// Resolve `diag` against `tracker` and `blocks`.
    ///
    /// Without a tracker (no source available) the report has no location
    /// or context but still carries kind and message.
    pub fn build(
        diag: &Diagnostic,
        tracker: Option<&LocationTracker>,
        blocks: Option<&BlockRegistry>,
        radius: u32,
    ) -> Self {
        let mut report = Report {
            code: diag.code,
            severity: diag.severity,
            kind: diag.kind.clone(),
            message: diag.message.clone(),
            file: tracker.map_or_else(|| "<unknown>".to_string(), LocationTracker::file_name),
            location: None,
            block_hierarchy: Vec::new(),
            context: Vec::new(),
            caret_width: 1,
            notes: diag.notes.clone(),
            trace: Vec::new(),
        };
        let (Some(tracker), Some(span)) = (tracker, diag.primary_span()) else {
            return report;
        };
        let location = tracker.resolve(span);
        report.context = tracker.context(location.line, radius);
        report.caret_width = tracker.caret_width(location.span);
        if let Some(blocks) = blocks {
            report.block_hierarchy = blocks.hierarchy_at(location.line);
        }
        report.location = Some(location);
        report
    }

    /// Attach the tail of an execution trace.
    #[must_use]
    pub fn with_trace(mut self, trace: Vec<String>) -> Self {
        self.trace = trace;
        self
    }

    /// Innermost block title, or `global scope`.
    pub fn block_name(&self) -> &str {
        self.block_hierarchy
            .last()
            .map_or("global scope", String::as_str)
    }

    pub fn is_approximate(&self) -> bool {
        self.location
            .is_some_and(|l| l.confidence == Confidence::Approximate)
    }

    pub fn record(&self) -> FaultRecord {
        FaultRecord {
            code: self.code.to_string(),
            kind: self.kind.clone(),
            message: self.message.clone(),
            file: self.file.clone(),
            line: self.location.map_or(0, |l| l.line),
            column: self.location.map_or(0, |l| l.column),
            block_hierarchy: self.block_hierarchy.clone(),
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;
    use crate::BlockKind;
    use ry_ir::{SourceUnit, Span};

    const SRC: &str = "trash_cleaner = true\nfunc main() {\n    x = 1 / 0\n}\n";

    #[test]
    fn build_resolves_location_blocks_and_context() {
        let tracker = LocationTracker::new(SourceUnit::inline(SRC));
        let mut blocks = BlockRegistry::new();
        blocks.enter("main", BlockKind::Function, 2);
        blocks.exit(4);
        let start = u32::try_from(SRC.find("1 / 0").unwrap()).unwrap();
        let diag = Diagnostic::error(ErrorCode::E4001)
            .with_kind("ZeroDivisionError")
            .with_message("division by zero")
            .with_label(Span::new(start, start + 5), "here");
        let report = Report::build(&diag, Some(&tracker), Some(&blocks), 2);
        let loc = report.location.unwrap();
        assert_eq!((loc.line, loc.column), (3, 9));
        assert_eq!(report.caret_width, 5);
        assert_eq!(report.block_name(), "func main");
        assert_eq!(report.context.len(), 5);

        let record = report.record();
        assert_eq!(record.kind, "ZeroDivisionError");
        assert_eq!(record.file, "<inline>");
        assert_eq!(record.block_hierarchy, vec!["func main".to_string()]);
    }

    #[test]
    fn build_without_tracker_keeps_kind_and_message() {
        let diag = Diagnostic::error(ErrorCode::E5003).with_message("stale artifact");
        let report = Report::build(&diag, None, None, 2);
        assert_eq!(report.location, None);
        assert_eq!(report.block_name(), "global scope");
        assert_eq!(report.record().line, 0);
    }
}
