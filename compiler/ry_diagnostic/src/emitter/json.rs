//! JSON-lines emitter.

use std::io::Write;

use crate::Report;

use super::DiagnosticEmitter;

pub struct JsonEmitter<W: Write> {
    writer: W,
}

impl<W: Write> JsonEmitter<W> {
    pub fn new(writer: W) -> Self {
        JsonEmitter { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> DiagnosticEmitter for JsonEmitter<W> {
    fn emit(&mut self, report: &Report) {
        match serde_json::to_string(&report.record()) {
            Ok(line) => {
                let _ = writeln!(self.writer, "{line}");
            }
            Err(e) => {
                let _ = writeln!(
                    self.writer,
                    "{{\"kind\":\"{}\",\"message\":\"unserializable report: {e}\"}}",
                    report.kind
                );
            }
        }
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }

    fn emit_summary(&mut self, error_count: usize, warning_count: usize) {
        let summary = serde_json::json!({
            "summary": { "errors": error_count, "warnings": warning_count }
        });
        let _ = writeln!(self.writer, "{summary}");
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;
    use crate::{Diagnostic, ErrorCode, FaultRecord};

    #[test]
    fn emits_one_parseable_record_per_line() {
        let diag = Diagnostic::error(ErrorCode::E3001).with_message("Module 'foo' not found");
        let report = Report::build(&diag, None, None, 2);
        let mut emitter = JsonEmitter::new(Vec::new());
        emitter.emit(&report);
        emitter.emit_summary(1, 0);
        let out = String::from_utf8(emitter.into_inner()).unwrap();
        let mut lines = out.lines();
        let record: FaultRecord = serde_json::from_str(lines.next().unwrap()).unwrap();
        assert_eq!(record.kind, "ModuleNotFound");
        assert_eq!(record.code, "E3001");
        assert!(lines.next().unwrap().contains("\"errors\":1"));
    }
}
