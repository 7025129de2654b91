//! Moving a compilation onto a re-laid-out copy of its source.
//!
//! Two sources with the same fingerprint normally have the same tokens,
//! starting the same lines; only the layout between them differs.
//! [`Alignment::new`] checks this, since fingerprints can collide.
//! Offsets are carried over token by token and block lines follow the
//! tokens that start and end them.

use std::convert::Infallible;

use ry_diagnostic::span_utils::LineOffsetTable;
use ry_ir::visit::{walk_block_mut, walk_expr_mut, walk_stmt_mut, VisitMut};
use ry_ir::{Block, Expr, ExprKind, SourceUnit, Span, Stmt, StmtKind};
use ry_lexer::TokenList;
use ry_lower::Lowered;

/// Token-aligned offset translation between two layouts of one program.
pub(super) struct Alignment<'a> {
    old: &'a TokenList,
    new: &'a TokenList,
    new_len: u32,
}

impl<'a> Alignment<'a> {
    /// `None` unless both streams hold the same tokens with the same line
    /// breaks.
    pub(super) fn new(
        old: &'a TokenList,
        old_text: &str,
        new: &'a TokenList,
        new_text: &str,
    ) -> Option<Self> {
        if old.len() != new.len() {
            return None;
        }
        let same_tokens = old.iter().zip(new.iter()).all(|(a, b)| {
            a.newline_before == b.newline_before
                && old_text.get(a.span.to_range()) == new_text.get(b.span.to_range())
        });
        if !same_tokens {
            return None;
        }
        Some(Alignment {
            old,
            new,
            new_len: u32::try_from(new_text.len()).unwrap_or(u32::MAX),
        })
    }

    pub(super) fn offset(&self, offset: u32) -> u32 {
        let tokens = self.old.as_slice();
        let after = tokens.partition_point(|t| t.span.start <= offset);
        let Some(index) = after.checked_sub(1) else {
            // Leading layout before the first token.
            let first = self.new.get(0).map_or(0, |t| t.span.start);
            return offset.min(first);
        };
        let (Some(old), Some(new)) = (self.old.get(index), self.new.get(index)) else {
            return offset.min(self.new_len);
        };
        if offset <= old.span.end {
            return new.span.start + (offset - old.span.start);
        }
        let limit = self.new.get(after).map_or(self.new_len, |t| t.span.start);
        (new.span.end + (offset - old.span.end)).min(limit)
    }

    pub(super) fn span(&self, span: Span) -> Span {
        if span.is_dummy() {
            return span;
        }
        Span::new(self.offset(span.start), self.offset(span.end))
    }
}

/// Carry `lowered` from `old` over to `new`.
pub(super) fn rebase(
    lowered: &Lowered,
    alignment: &Alignment<'_>,
    old: &SourceUnit,
    new: &SourceUnit,
) -> Lowered {
    let mut tree = lowered.tree.clone();
    let mut respan = Respan { alignment };
    if let Err(never) = respan.visit_block(&mut tree.body) {
        match never {}
    }

    let old_lines = LineOffsetTable::build(old.text());
    let new_lines = LineOffsetTable::build(new.text());
    let moved = |old_offset: u32| new_lines.line_from_offset(alignment.offset(old_offset));
    let tokens = alignment.old.as_slice();

    let mut blocks = lowered.blocks.clone();
    blocks.remap_lines(
        |line| {
            tokens
                .iter()
                .find(|t| old_lines.line_from_offset(t.span.start) == line)
                .map_or(line, |t| moved(t.span.start))
        },
        |line| {
            tokens
                .iter()
                .rev()
                .find(|t| old_lines.line_from_offset(last_byte(t.span)) == line)
                .map_or(line, |t| moved(last_byte(t.span)))
        },
    );
    Lowered { tree, blocks }
}

fn last_byte(span: Span) -> u32 {
    span.end.saturating_sub(1).max(span.start)
}

struct Respan<'a, 'b> {
    alignment: &'a Alignment<'b>,
}

impl VisitMut for Respan<'_, '_> {
    type Error = Infallible;

    fn visit_block(&mut self, block: &mut Block) -> Result<(), Infallible> {
        block.span = self.alignment.span(block.span);
        walk_block_mut(self, block)
    }

    fn visit_stmt(&mut self, stmt: &mut Stmt) -> Result<(), Infallible> {
        stmt.span = self.alignment.span(stmt.span);
        match &mut stmt.kind {
            StmtKind::Func(func) => {
                for param in &mut func.params {
                    param.span = self.alignment.span(param.span);
                }
            }
            StmtKind::Try(t) | StmtKind::Elerr(t) => {
                for handler in &mut t.handlers {
                    handler.span = self.alignment.span(handler.span);
                }
            }
            StmtKind::Import(decl) => {
                for item in &mut decl.items {
                    item.span = self.alignment.span(item.span);
                }
            }
            StmtKind::Match(m) => {
                for arm in &mut m.arms {
                    arm.span = self.alignment.span(arm.span);
                }
            }
            StmtKind::Struct(s) => {
                for field in &mut s.fields {
                    field.span = self.alignment.span(field.span);
                }
            }
            StmtKind::StateMachine(machine) => {
                for transition in &mut machine.transitions {
                    transition.span = self.alignment.span(transition.span);
                }
            }
            _ => {}
        }
        walk_stmt_mut(self, stmt)
    }

    fn visit_expr(&mut self, expr: &mut Expr) -> Result<(), Infallible> {
        expr.span = self.alignment.span(expr.span);
        if let ExprKind::Lambda { params, .. } = &mut expr.kind {
            for param in params {
                param.span = self.alignment.span(param.span);
            }
        }
        walk_expr_mut(self, expr)
    }
}
