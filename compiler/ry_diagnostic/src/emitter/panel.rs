//! Boxed panel emitter.
//!
//! ```text
//! ╭──── ⚠ ZeroDivisionError [E4001] ─────────────╮
//! │ ERROR TYPE: ZeroDivisionError                │
//! │ MESSAGE: division by zero                    │
//! │ FILE: main.ry                                │
//! │ LINE: 3, COLUMN: 9                           │
//! │ BLOCK: func main                             │
//! │ BLOCK HIERARCHY: func main                   │
//! ├──────────────────────────────────────────────┤
//! │    2 | func main() {                         │
//! │ >> 3 |     x = 1 / 0                         │
//! │      |         ^^^^^                         │
//! ╰──────────────────────────────────────────────╯
//! ```

use std::io::{self, Write};

use crate::{Report, Severity};

use super::DiagnosticEmitter;

/// ANSI color codes for terminal output.
mod colors {
    pub const ERROR: &str = "\x1b[1;31m";
    pub const WARNING: &str = "\x1b[1;33m";
    pub const RESET: &str = "\x1b[0m";
}

const MIN_WIDTH: usize = 40;
const MAX_WIDTH: usize = 160;
const DEFAULT_WIDTH: usize = 80;

/// Color output mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    /// For `Auto`, `is_tty` decides.
    pub fn should_use_colors(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

/// Terminal width from `COLUMNS`, clamped to a readable range.
pub fn terminal_width() -> usize {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(DEFAULT_WIDTH)
        .clamp(MIN_WIDTH, MAX_WIDTH)
}

pub struct PanelEmitter<W: Write> {
    writer: W,
    colors: bool,
    width: usize,
}

impl<W: Write> PanelEmitter<W> {
    pub fn new(writer: W, mode: ColorMode, is_tty: bool, width: usize) -> Self {
        PanelEmitter {
            writer,
            colors: mode.should_use_colors(is_tty),
            width: width.clamp(MIN_WIDTH, MAX_WIDTH),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// The full boxed panel.
    pub fn render(&self, report: &Report) -> String {
        let inner = self.width - 4;
        let mut out = String::new();

        let title = format!("⚠ {} [{}]", report.kind, report.code);
        let title_len = title.chars().count();
        let colored_title = if self.colors {
            let color = match report.severity {
                Severity::Error => colors::ERROR,
                Severity::Warning | Severity::Note => colors::WARNING,
            };
            format!("{color}{title}{}", colors::RESET)
        } else {
            title
        };
        let fill = (self.width - 2).saturating_sub(title_len + 6);
        out.push_str(&format!("╭──── {colored_title} {}╮\n", "─".repeat(fill)));

        let mut header = vec![
            format!("ERROR TYPE: {}", report.kind),
            format!("MESSAGE: {}", report.message),
            format!("FILE: {}", report.file),
        ];
        if let Some(loc) = report.location {
            let approx = if report.is_approximate() {
                " (approximate)"
            } else {
                ""
            };
            header.push(format!("LINE: {}, COLUMN: {}{approx}", loc.line, loc.column));
        }
        header.push(format!("BLOCK: {}", report.block_name()));
        let hierarchy = if report.block_hierarchy.is_empty() {
            "None".to_string()
        } else {
            report.block_hierarchy.join(" -> ")
        };
        header.push(format!("BLOCK HIERARCHY: {hierarchy}"));
        for line in &header {
            push_row(&mut out, line, inner);
        }

        if !report.context.is_empty() {
            push_rule(&mut out, self.width);
            let number_width = report
                .context
                .iter()
                .map(|c| c.number.to_string().len())
                .max()
                .unwrap_or(1)
                .max(4);
            for ctx in &report.context {
                let marker = if ctx.is_focus { ">>" } else { "  " };
                push_row(
                    &mut out,
                    &format!("{marker} {:>number_width$} | {}", ctx.number, ctx.text),
                    inner,
                );
                if ctx.is_focus {
                    if let Some(loc) = report.location {
                        let pad = " ".repeat(loc.column.saturating_sub(1) as usize);
                        let carets = "^".repeat(report.caret_width as usize);
                        push_row(
                            &mut out,
                            &format!("   {:>number_width$} | {pad}{carets}", ""),
                            inner,
                        );
                    }
                }
            }
        }

        if !report.notes.is_empty() || !report.trace.is_empty() {
            push_rule(&mut out, self.width);
            for note in &report.notes {
                push_row(&mut out, &format!("NOTE: {note}"), inner);
            }
            for entry in &report.trace {
                push_row(&mut out, &format!("TRACE: {entry}"), inner);
            }
        }

        out.push_str(&format!("╰{}╯\n", "─".repeat(self.width - 2)));
        out
    }

    /// One line, used for faults raised while another is being rendered.
    pub fn render_compact(report: &Report) -> String {
        match report.location {
            Some(loc) => format!(
                "{}: {} ({}:{}:{})",
                report.kind, report.message, report.file, loc.line, loc.column
            ),
            None => format!("{}: {} ({})", report.kind, report.message, report.file),
        }
    }
}

impl PanelEmitter<io::Stderr> {
    pub fn stderr(mode: ColorMode, is_tty: bool) -> Self {
        PanelEmitter::new(io::stderr(), mode, is_tty, terminal_width())
    }
}

fn push_row(out: &mut String, text: &str, inner: usize) {
    let count = text.chars().count();
    if count > inner {
        let truncated: String = text.chars().take(inner.saturating_sub(1)).collect();
        out.push_str(&format!("│ {truncated}… │\n"));
    } else {
        out.push_str(&format!("│ {text}{} │\n", " ".repeat(inner - count)));
    }
}

fn push_rule(out: &mut String, width: usize) {
    out.push_str(&format!("├{}┤\n", "─".repeat(width - 2)));
}

impl<W: Write> DiagnosticEmitter for PanelEmitter<W> {
    fn emit(&mut self, report: &Report) {
        let text = self.render(report);
        let _ = self.writer.write_all(text.as_bytes());
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }

    fn emit_summary(&mut self, error_count: usize, warning_count: usize) {
        if error_count == 0 && warning_count == 0 {
            return;
        }
        let _ = writeln!(
            self.writer,
            "{error_count} error{}, {warning_count} warning{}",
            if error_count == 1 { "" } else { "s" },
            if warning_count == 1 { "" } else { "s" },
        );
    }
}
