//! `state_machine Name { initial s  a -> b: act }`
//!
//! Becomes a class holding `state` and a nested `transitions` table keyed by
//! source state then action, with a `transition(action)` method that moves
//! to the target state or raises `StateError`.

use rustc_hash::FxHashSet;
use ry_diagnostic::ErrorCode;
use ry_ir::{BinaryOp, ExprKind, IfBranch, PassId, StateMachineDecl, Stmt, StmtKind, Tree};
use smallvec::smallvec;

use crate::build::Synth;
use crate::rewrite::{keep, rewrite_stmts};
use crate::{LoweringError, Pass, PassContext};

pub struct StateMachines;

impl Pass for StateMachines {
    fn id(&self) -> PassId {
        PassId::StateMachines
    }

    fn run(&self, mut tree: Tree, _cx: &mut PassContext) -> Result<Tree, LoweringError> {
        rewrite_stmts(&mut tree.body, |stmt| match stmt.kind {
            StmtKind::StateMachine(machine) => {
                check(&machine, stmt.span)?;
                let s = Synth::new(PassId::StateMachines, stmt.span);
                Ok(smallvec![lower(s, &machine)])
            }
            kind => keep(Stmt { kind, ..stmt }),
        })?;
        Ok(tree)
    }
}

fn check(machine: &StateMachineDecl, stmt_span: ry_ir::Span) -> Result<(), LoweringError> {
    let mut seen = FxHashSet::default();
    for t in &machine.transitions {
        if !seen.insert((t.from.as_str(), t.action.as_str())) {
            return Err(LoweringError::new(
                PassId::StateMachines,
                ErrorCode::E2005,
                t.span,
                format!(
                    "state machine `{}` has two transitions from `{}` on `{}`",
                    machine.name, t.from, t.action
                ),
            ));
        }
    }
    let known = machine
        .transitions
        .iter()
        .any(|t| t.from == machine.initial || t.to == machine.initial);
    if !machine.transitions.is_empty() && !known {
        return Err(LoweringError::new(
            PassId::StateMachines,
            ErrorCode::E2005,
            stmt_span,
            format!(
                "initial state `{}` of `{}` does not appear in any transition",
                machine.initial, machine.name
            ),
        ));
    }
    Ok(())
}

fn lower(s: Synth, machine: &StateMachineDecl) -> Stmt {
    // {from: {action: to}} in first-seen order of source states.
    let mut table: Vec<(String, Vec<(String, String)>)> = Vec::new();
    for t in &machine.transitions {
        let entry = (t.action.clone(), t.to.clone());
        match table.iter_mut().find(|(from, _)| *from == t.from) {
            Some((_, actions)) => actions.push(entry),
            None => table.push((t.from.clone(), vec![entry])),
        }
    }
    let transitions = s.expr(ExprKind::Dict(
        table
            .into_iter()
            .map(|(from, actions)| {
                let inner = actions
                    .into_iter()
                    .map(|(action, to)| (s.str(action), s.str(to)))
                    .collect();
                (s.str(from), s.expr(ExprKind::Dict(inner)))
            })
            .collect(),
    ));

    let this = || s.name("self");
    let state = || s.attr(this(), "state");
    let table = || s.attr(this(), "transitions");

    let init = s.func(
        "__init__",
        vec![s.param("self")],
        vec![
            s.assign(state(), s.str(machine.initial.clone())),
            s.assign(table(), transitions),
        ],
    );

    let allowed = s.binary(
        BinaryOp::And,
        s.binary(BinaryOp::In, state(), table()),
        s.binary(BinaryOp::In, s.name("action"), s.index(table(), state())),
    );
    let message = s.binary(
        BinaryOp::Add,
        s.binary(
            BinaryOp::Add,
            s.binary(
                BinaryOp::Add,
                s.str("Invalid transition '"),
                s.call_name("str", vec![s.name("action")]),
            ),
            s.str("' from state '"),
        ),
        s.binary(BinaryOp::Add, s.call_name("str", vec![state()]), s.str("'")),
    );
    let step = s.stmt(StmtKind::If {
        branches: vec![IfBranch {
            cond: allowed,
            body: s.block(vec![
                s.assign(state(), s.index(s.index(table(), state()), s.name("action"))),
                s.ret(Some(state())),
            ]),
        }],
        else_block: Some(s.block(vec![s.raise("StateError", message)])),
    });
    let transition = s.func(
        "transition",
        vec![s.param("self"), s.param("action")],
        vec![step],
    );

    s.class(&machine.name, vec![init, transition], false)
}
