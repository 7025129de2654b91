//! Register user-visible constructs in the block registry.
//!
//! The tree is not changed. The registry is rebuilt from scratch on every
//! run, with enter/exit calls mirroring the nesting of the constructs.

use std::convert::Infallible;

use ry_diagnostic::BlockKind;
use ry_ir::visit::{walk_stmt, Visit};
use ry_ir::{PassId, Stmt, StmtKind, Tree};

use crate::{LoweringError, Pass, PassContext};

pub struct Blocks;

impl Pass for Blocks {
    fn id(&self) -> PassId {
        PassId::Blocks
    }

    fn run(&self, tree: Tree, cx: &mut PassContext) -> Result<Tree, LoweringError> {
        *cx.blocks_mut() = ry_diagnostic::BlockRegistry::new();
        let mut collector = Collector { cx, in_pack: false };
        if let Err(never) = collector.visit_block(&tree.body) {
            match never {}
        }
        Ok(tree)
    }
}

struct Collector<'a> {
    cx: &'a mut PassContext,
    /// Directly inside a pack body, where functions are methods.
    in_pack: bool,
}

impl Collector<'_> {
    fn entry(&self, stmt: &Stmt) -> Option<(String, BlockKind)> {
        match &stmt.kind {
            StmtKind::Func(func) => {
                let kind = if self.in_pack {
                    BlockKind::Method
                } else {
                    BlockKind::Function
                };
                Some((func.name.clone(), kind))
            }
            StmtKind::Pack(pack) => Some((pack.name.clone(), BlockKind::Type)),
            StmtKind::Struct(record) => Some((record.name.clone(), BlockKind::Record)),
            StmtKind::StateMachine(machine) => {
                Some((machine.name.clone(), BlockKind::StateMachine))
            }
            StmtKind::Event { left, right, .. } => {
                let unit = self.cx.unit();
                let name = format!("{} -> {}", unit.slice(left.span), unit.slice(right.span));
                Some((name, BlockKind::Event))
            }
            _ => None,
        }
    }
}

impl Visit for Collector<'_> {
    type Error = Infallible;

    fn visit_stmt(&mut self, stmt: &Stmt) -> Result<(), Infallible> {
        let Some((name, kind)) = self.entry(stmt) else {
            return walk_stmt(self, stmt);
        };
        let start = self.cx.line_of(stmt.span.start);
        let end = self.cx.end_line_of(stmt.span);
        self.cx.blocks_mut().enter(name, kind, start);
        let outer = std::mem::replace(&mut self.in_pack, kind == BlockKind::Type);
        walk_stmt(self, stmt)?;
        self.in_pack = outer;
        self.cx.blocks_mut().exit(end);
        Ok(())
    }
}
