//! The `translate` command: print the lowered host form.

use std::fmt::Write;
use std::path::Path;

use ry_diagnostic::span_utils::LineOffsetTable;
use ry_diagnostic::LoweredLine;

use crate::error::DriverError;
use crate::session::Session;

/// Host form of the program in `path`. With `map`, each line is prefixed
/// by the source line it came from.
pub fn translate_file(session: &Session, path: &Path, map: bool) -> Result<String, DriverError> {
    let unit = session.read(path)?;
    let program = session.build(&unit)?;
    let lines = ry_lower::print_host(&program.tree);
    if !map {
        return Ok(ry_lower::render(&lines));
    }
    let table = LineOffsetTable::build(unit.text());
    Ok(with_origins(&lines, &table, unit.text()))
}

fn with_origins(lines: &[LoweredLine], table: &LineOffsetTable, source: &str) -> String {
    let mut out = String::new();
    for line in lines {
        let origin = line
            .origin
            .filter(|span| !span.is_dummy())
            .map(|span| table.offset_to_line_col(source, span.start));
        // Writing to a String cannot fail.
        let _ = match origin {
            Some((row, col)) => writeln!(out, "{:>5} | {}", format!("{row}:{col}"), line.text),
            None => writeln!(out, "{:>5} | {}", "-", line.text),
        };
    }
    out
}
