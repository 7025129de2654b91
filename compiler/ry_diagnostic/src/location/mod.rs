//! Mapping lowered locations back to original source.
//!
//! Spans are authoritative: every node synthesized by a lowering pass keeps
//! the span of the construct it came from, so resolving a span is a plain
//! line-table lookup with [`Confidence::Exact`].
//!
//! Lines of the textual lowered form (as printed by `translate`) carry the
//! span of the statement that produced them. A line without one falls back
//! to text similarity against the original lines. That fallback is
//! deprecated: it can pick the wrong line when code repeats, and its results
//! are always marked [`Confidence::Approximate`].

use ry_ir::{SourceUnit, Span};

use crate::similarity::best_match;
use crate::span_utils::LineOffsetTable;

/// Minimum similarity ratio for the approximate fallback.
const SIMILARITY_THRESHOLD: f64 = 0.6;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Confidence {
    /// Derived from carried span provenance.
    Exact,
    /// Guessed by text similarity.
    Approximate,
}

/// A resolved position in the original source.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Location {
    pub span: Span,
    /// 1-based.
    pub line: u32,
    /// 1-based, in characters.
    pub column: u32,
    pub confidence: Confidence,
}

/// One line of the textual lowered form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoweredLine {
    pub text: String,
    pub origin: Option<Span>,
}

/// One line of a code-context window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextLine {
    pub number: u32,
    pub text: String,
    pub is_focus: bool,
}

#[derive(Clone, Debug)]
pub struct LocationTracker {
    unit: SourceUnit,
    table: LineOffsetTable,
    lowered: Vec<LoweredLine>,
}

impl LocationTracker {
    pub fn new(unit: SourceUnit) -> Self {
        let table = LineOffsetTable::build(unit.text());
        LocationTracker {
            unit,
            table,
            lowered: Vec::new(),
        }
    }

    /// Attach the lowered text form and its per-line provenance.
    #[must_use]
    pub fn with_lowered(mut self, lines: Vec<LoweredLine>) -> Self {
        self.lowered = lines;
        self
    }

    pub fn unit(&self) -> &SourceUnit {
        &self.unit
    }

    pub fn file_name(&self) -> String {
        self.unit.name()
    }

    pub fn line_count(&self) -> usize {
        self.table.line_count()
    }

    /// Resolve a carried span. Out-of-range spans clamp to the end of text.
    pub fn resolve(&self, span: Span) -> Location {
        let len = u32::try_from(self.unit.text().len()).unwrap_or(u32::MAX);
        let start = span.start.min(len);
        let clamped = Span::new(start, span.end.clamp(start, len));
        let (line, column) = self.table.offset_to_line_col(self.unit.text(), start);
        Location {
            span: clamped,
            line,
            column,
            confidence: Confidence::Exact,
        }
    }

    pub fn line_of(&self, span: Span) -> u32 {
        self.resolve(span).line
    }

    /// Resolve a 1-based line of the lowered text form.
    pub fn resolve_lowered_line(&self, line: usize) -> Option<Location> {
        let lowered = self.lowered.get(line.checked_sub(1)?)?;
        match lowered.origin {
            Some(span) => Some(self.resolve(span)),
            None => self.approximate_line_for(&lowered.text),
        }
    }

    /// Deprecated fallback: the original line most similar to `text`.
    pub fn approximate_line_for(&self, text: &str) -> Option<Location> {
        let source = self.unit.text();
        let lines = (1..=self.table.line_count())
            .map(|n| self.table.line_text(source, u32::try_from(n).unwrap_or(u32::MAX)));
        let (idx, _) = best_match(text, lines, SIMILARITY_THRESHOLD)?;
        let line = u32::try_from(idx + 1).unwrap_or(u32::MAX);
        let line_text = self.table.line_text(source, line);
        let indent = line_text.len() - line_text.trim_start().len();
        let start = self.table.line_start_offset(line)? + u32::try_from(indent).ok()?;
        let end = start + u32::try_from(line_text.trim().len()).ok()?;
        let column = u32::try_from(line_text[..indent].chars().count()).ok()? + 1;
        Some(Location {
            span: Span::new(start, end),
            line,
            column,
            confidence: Confidence::Approximate,
        })
    }

    /// Text of a 1-based source line.
    pub fn line_text(&self, line: u32) -> &str {
        self.table.line_text(self.unit.text(), line)
    }

    /// Lines `focus - radius ..= focus + radius`, clamped to the file.
    pub fn context(&self, focus: u32, radius: u32) -> Vec<ContextLine> {
        let last = u32::try_from(self.table.line_count()).unwrap_or(u32::MAX);
        let first = focus.saturating_sub(radius).max(1);
        let end = focus.saturating_add(radius).min(last);
        (first..=end)
            .map(|number| ContextLine {
                number,
                text: self.line_text(number).to_string(),
                is_focus: number == focus,
            })
            .collect()
    }

    /// Width in characters of `span` on its first line, at least 1.
    pub fn caret_width(&self, span: Span) -> u32 {
        let text = self.unit.slice(span);
        let first_line = text.split('\n').next().unwrap_or("");
        u32::try_from(first_line.chars().count()).unwrap_or(1).max(1)
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
