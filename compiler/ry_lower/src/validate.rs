//! Final check that a tree holds only host forms.
//!
//! Run after import resolution, right before a tree is executed or
//! serialized. Any failure here is a bug in a pass, not in user code, but
//! it is reported like any other lowering error.

use ry_diagnostic::ErrorCode;
use ry_ir::visit::{walk_block, walk_expr, walk_stmt, Visit};
use ry_ir::{Block, BlockStyle, Expr, ExprKind, PassId, Protected, Span, Stmt, StmtKind, Tree};

use crate::LoweringError;

pub fn validate(tree: &Tree, source_len: usize) -> Result<(), LoweringError> {
    let limit = u32::try_from(source_len).unwrap_or(u32::MAX);
    Validator { limit }.visit_block(&tree.body)
}

struct Validator {
    limit: u32,
}

impl Validator {
    fn check_span(&self, span: Span) -> Result<(), LoweringError> {
        if span.start > span.end || span.end > self.limit {
            return Err(invalid(span, format!("span {span:?} lies outside the source")));
        }
        Ok(())
    }
}

impl Visit for Validator {
    type Error = LoweringError;

    fn visit_block(&mut self, block: &Block) -> Result<(), LoweringError> {
        if block.style == BlockStyle::Brace {
            return Err(invalid(block.span, "brace block survived lowering"));
        }
        walk_block(self, block)
    }

    fn visit_stmt(&mut self, stmt: &Stmt) -> Result<(), LoweringError> {
        self.check_span(stmt.span)?;
        if stmt.kind.is_surface() || matches!(stmt.kind, StmtKind::Import(_)) {
            return Err(invalid(
                stmt.span,
                format!("{} survived lowering", stmt.kind.describe()),
            ));
        }
        walk_stmt(self, stmt)
    }

    fn visit_expr(&mut self, expr: &Expr) -> Result<(), LoweringError> {
        self.check_span(expr.span)?;
        let leftover = match &expr.kind {
            ExprKind::This => Some("`this`".to_string()),
            ExprKind::Range { .. } => Some("range literal".to_string()),
            ExprKind::Binary { op, .. } if op.is_surface() => {
                Some(format!("operator `{}`", op.symbol()))
            }
            ExprKind::Aggregate(Protected::Placeholder(token))
            | ExprKind::ForeignCall {
                code: Protected::Placeholder(token),
                ..
            } => Some(format!("placeholder `{token}`")),
            _ => None,
        };
        if let Some(what) = leftover {
            return Err(invalid(expr.span, format!("{what} survived lowering")));
        }
        walk_expr(self, expr)
    }
}

#[cold]
fn invalid(span: Span, message: impl Into<String>) -> LoweringError {
    LoweringError::new(PassId::Validate, ErrorCode::E2008, span, message)
}
