//! `a..b` is inclusive and `a...b` exclusive; both become `range` calls.

use ry_ir::{BinaryOp, Expr, ExprKind, PassId, Tree};

use crate::build::Synth;
use crate::rewrite::rewrite_exprs;
use crate::{LoweringError, Pass, PassContext};

pub struct Ranges;

impl Pass for Ranges {
    fn id(&self) -> PassId {
        PassId::Ranges
    }

    fn run(&self, mut tree: Tree, _cx: &mut PassContext) -> Result<Tree, LoweringError> {
        rewrite_exprs(&mut tree.body, |expr| match expr.kind {
            ExprKind::Range {
                start,
                end,
                inclusive,
            } => {
                let s = Synth::new(PassId::Ranges, expr.span);
                let end = if inclusive {
                    s.binary(BinaryOp::Add, *end, s.int(1))
                } else {
                    *end
                };
                Ok(s.call_name("range", vec![*start, end]))
            }
            kind => Ok(Expr { kind, ..expr }),
        })?;
        Ok(tree)
    }
}
