//! Surface operators `|>`, `>>` and `<=>`.

use ry_ir::{BinaryOp, Expr, ExprKind, PassId, Tree};

use crate::build::Synth;
use crate::rewrite::rewrite_exprs;
use crate::{LoweringError, Pass, PassContext};

pub struct Operators;

impl Pass for Operators {
    fn id(&self) -> PassId {
        PassId::Operators
    }

    fn run(&self, mut tree: Tree, cx: &mut PassContext) -> Result<Tree, LoweringError> {
        rewrite_exprs(&mut tree.body, |expr| {
            let ExprKind::Binary { op, left, right } = expr.kind else {
                return Ok(expr);
            };
            let s = Synth::new(PassId::Operators, expr.span);
            Ok(match op {
                // x |> f  =>  f(x)
                BinaryOp::Pipe => s.call(*right, vec![*left]),
                // f >> g  =>  func(x) { return g(f(x)) }
                BinaryOp::Compose => {
                    let x = cx.fresh_name("x");
                    let inner = s.call(*left, vec![s.name(&x)]);
                    s.expr(ExprKind::Lambda {
                        params: vec![s.param(&x)],
                        body: s.block(vec![s.ret(Some(s.call(*right, vec![inner])))]),
                    })
                }
                // a <=> b  =>  (func(l, r) { return (l > r) - (l < r) })(a, b)
                // so each operand is evaluated once, left first.
                BinaryOp::Spaceship => {
                    let l = cx.fresh_name("l");
                    let r = cx.fresh_name("r");
                    let gt = s.binary(BinaryOp::Gt, s.name(&l), s.name(&r));
                    let lt = s.binary(BinaryOp::Lt, s.name(&l), s.name(&r));
                    let compare = s.expr(ExprKind::Lambda {
                        params: vec![s.param(&l), s.param(&r)],
                        body: s.block(vec![s.ret(Some(s.binary(BinaryOp::Sub, gt, lt)))]),
                    });
                    s.call(compare, vec![*left, *right])
                }
                op => Expr {
                    kind: ExprKind::Binary { op, left, right },
                    ..expr
                },
            })
        })?;
        Ok(tree)
    }
}
