//! `match v { case p => .. else => .. }`
//!
//! The scrutinee is evaluated once into a fresh temporary, then tested
//! against each arm in order. Literal patterns compare with `==`, type
//! patterns test `isinstance` and bind the value, `_` always matches.
//! Without an `else` arm an unmatched value raises `MatchError`.

use ry_diagnostic::ErrorCode;
use ry_ir::{BinaryOp, ExprKind, IfBranch, MatchStmt, PassId, Pattern, Stmt, StmtKind, Tree};
use smallvec::SmallVec;

use crate::build::Synth;
use crate::rewrite::{keep, rewrite_stmts, Stmts};
use crate::{LoweringError, Pass, PassContext};

pub struct Match;

impl Pass for Match {
    fn id(&self) -> PassId {
        PassId::Match
    }

    fn run(&self, mut tree: Tree, cx: &mut PassContext) -> Result<Tree, LoweringError> {
        rewrite_stmts(&mut tree.body, |stmt| match stmt.kind {
            StmtKind::Match(m) => {
                let s = Synth::new(PassId::Match, stmt.span);
                lower(s, m, cx)
            }
            kind => keep(Stmt { kind, ..stmt }),
        })?;
        Ok(tree)
    }
}

fn lower(s: Synth, m: MatchStmt, cx: &mut PassContext) -> Result<Stmts, LoweringError> {
    if m.arms.is_empty() && m.default.is_none() {
        return Err(LoweringError::new(
            PassId::Match,
            ErrorCode::E2007,
            s.span,
            "match block has no arms",
        ));
    }
    let temp = cx.fresh_name("match");
    let mut out: Stmts = SmallVec::new();
    out.push(s.assign_name(&temp, m.scrutinee));

    if m.arms.is_empty() {
        out.extend(m.default.map(|b| b.stmts).unwrap_or_default());
        return Ok(out);
    }

    let branches = m
        .arms
        .into_iter()
        .map(|arm| {
            let a = Synth::new(PassId::Match, arm.span);
            let mut body = arm.body;
            let cond = match arm.pattern {
                Pattern::Literal(lit) => a.binary(BinaryOp::Eq, a.name(&temp), lit),
                Pattern::Wildcard => a.expr(ExprKind::Bool(true)),
                Pattern::Type { type_name, binding } => {
                    body.stmts.insert(0, a.assign_name(&binding, a.name(&temp)));
                    a.call_name("isinstance", vec![a.name(&temp), a.name(&type_name)])
                }
            };
            IfBranch { cond, body }
        })
        .collect();
    let fallback = m.default.unwrap_or_else(|| {
        s.block(vec![s.raise("MatchError", s.str("No matching pattern"))])
    });
    out.push(s.stmt(StmtKind::If {
        branches,
        else_block: Some(fallback),
    }));
    Ok(out)
}
