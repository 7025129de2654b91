//! `macro name(p) { }` definitions and `name!(args)` invocations.
//!
//! Definitions are collected from the whole tree first, so a macro may be
//! invoked before the line that defines it. An invocation is replaced by a
//! copy of the macro body with each parameter name substituted by the
//! matching argument expression.

use std::mem;

use rustc_hash::FxHashMap;
use ry_diagnostic::ErrorCode;
use ry_ir::visit::{walk_block_mut, walk_expr_mut, walk_stmt_mut, VisitMut};
use ry_ir::{Block, Expr, ExprKind, MacroDecl, Origin, PassId, Span, Stmt, StmtKind, Tree};
use ry_stack::ensure_sufficient_stack;
use smallvec::smallvec;

use crate::rewrite::{keep, rewrite_exprs, rewrite_stmts};
use crate::{LoweringError, Pass, PassContext};

pub struct Macros;

impl Pass for Macros {
    fn id(&self) -> PassId {
        PassId::Macros
    }

    fn run(&self, mut tree: Tree, _cx: &mut PassContext) -> Result<Tree, LoweringError> {
        let mut defs: FxHashMap<String, MacroDecl> = FxHashMap::default();
        rewrite_stmts(&mut tree.body, |stmt| match stmt.kind {
            StmtKind::MacroDef(decl) => {
                if defs.contains_key(&decl.name) {
                    return Err(LoweringError::new(
                        PassId::Macros,
                        ErrorCode::E2001,
                        stmt.span,
                        format!("macro `{}` is defined more than once", decl.name),
                    ));
                }
                defs.insert(decl.name.clone(), decl);
                Ok(smallvec![])
            }
            kind => keep(Stmt { kind, ..stmt }),
        })?;

        Expander {
            defs: &defs,
            stack: Vec::new(),
        }
        .visit_block(&mut tree.body)?;
        Ok(tree)
    }
}

struct Expander<'a> {
    defs: &'a FxHashMap<String, MacroDecl>,
    /// Macros currently being expanded, outermost first.
    stack: Vec<String>,
}

impl Expander<'_> {
    fn expand(&mut self, name: &str, args: Vec<Expr>, span: Span) -> Result<Vec<Stmt>, LoweringError> {
        let defs = self.defs;
        let Some(def) = defs.get(name) else {
            return Err(LoweringError::new(
                PassId::Macros,
                ErrorCode::E2002,
                span,
                format!("undefined macro `{name}!`"),
            ));
        };
        if args.len() != def.params.len() {
            return Err(LoweringError::new(
                PassId::Macros,
                ErrorCode::E2003,
                span,
                format!(
                    "macro `{name}!` takes {} argument(s) but {} were given",
                    def.params.len(),
                    args.len()
                ),
            ));
        }
        if self.stack.iter().any(|active| active == name) {
            return Err(LoweringError::new(
                PassId::Macros,
                ErrorCode::E2004,
                span,
                format!("macro `{name}!` expands into itself"),
            ));
        }

        let mut body = def.body.clone();
        Respan { span }.visit_block(&mut body)?;
        let params = &def.params;
        rewrite_exprs(&mut body, |expr| {
            if let ExprKind::Name(n) = &expr.kind {
                if let Some(i) = params.iter().position(|p| p == n) {
                    return Ok(args[i].clone());
                }
            }
            Ok(expr)
        })?;

        self.stack.push(name.to_string());
        let result = self.visit_block(&mut body);
        self.stack.pop();
        result?;
        Ok(body.stmts)
    }
}

impl VisitMut for Expander<'_> {
    type Error = LoweringError;

    fn visit_block(&mut self, block: &mut Block) -> Result<(), LoweringError> {
        ensure_sufficient_stack(|| {
            walk_block_mut(self, block)?;
            let old = mem::take(&mut block.stmts);
            let mut out = Vec::with_capacity(old.len());
            for stmt in old {
                match stmt.kind {
                    StmtKind::MacroCall { name, args } => {
                        out.extend(self.expand(&name, args, stmt.span)?);
                    }
                    kind => out.push(Stmt { kind, ..stmt }),
                }
            }
            block.stmts = out;
            Ok(())
        })
    }
}

/// Moves every node of an expansion to the invocation site.
struct Respan {
    span: Span,
}

impl VisitMut for Respan {
    type Error = LoweringError;

    fn visit_block(&mut self, block: &mut Block) -> Result<(), LoweringError> {
        block.span = self.span;
        walk_block_mut(self, block)
    }

    fn visit_stmt(&mut self, stmt: &mut Stmt) -> Result<(), LoweringError> {
        stmt.span = self.span;
        stmt.origin = Origin::Synthesized(PassId::Macros);
        walk_stmt_mut(self, stmt)
    }

    fn visit_expr(&mut self, expr: &mut Expr) -> Result<(), LoweringError> {
        expr.span = self.span;
        expr.origin = Origin::Synthesized(PassId::Macros);
        walk_expr_mut(self, expr)
    }
}
