//! The fixed, ordered sequence of lowering passes.

use ry_diagnostic::BlockRegistry;
use ry_ir::{PassId, SourceUnit, Tree};
use tracing::{debug, debug_span};

use crate::passes::{
    Blocks, Contracts, Declarations, Defer, Events, Foreign, Guards, Macros, Match, Oop,
    Operators, Protect, Ranges, Records, Restore, StateMachines, StrictTyping, Tables, TrySugar,
};
use crate::{LoweringError, Pass, PassContext};

/// Output of a pipeline run.
#[derive(Clone, Debug, PartialEq)]
pub struct Lowered {
    pub tree: Tree,
    pub blocks: BlockRegistry,
}

pub struct Pipeline {
    passes: Vec<Box<dyn Pass>>,
}

impl Pipeline {
    /// All passes in their required order.
    ///
    /// `protect` must run first and `restore` last. `blocks` runs before
    /// any pass that moves function bodies, and `declarations` after every
    /// pass that matches brace blocks.
    pub fn standard() -> Self {
        Pipeline {
            passes: vec![
                Box::new(Protect),
                Box::new(Macros),
                Box::new(Blocks),
                Box::new(Contracts),
                Box::new(StrictTyping),
                Box::new(Records),
                Box::new(StateMachines),
                Box::new(Events),
                Box::new(Guards),
                Box::new(Defer),
                Box::new(Match),
                Box::new(Operators),
                Box::new(Ranges),
                Box::new(TrySugar),
                Box::new(Tables),
                Box::new(Oop),
                Box::new(Declarations),
                Box::new(Foreign),
                Box::new(Restore),
            ],
        }
    }

    pub fn passes(&self) -> impl Iterator<Item = PassId> + '_ {
        self.passes.iter().map(|p| p.id())
    }

    #[tracing::instrument(level = "debug", skip_all, fields(unit = %unit.name()))]
    pub fn run(&self, tree: Tree, unit: &SourceUnit) -> Result<Lowered, LoweringError> {
        let mut cx = PassContext::new(tree.directives, unit);
        let mut tree = tree;
        for pass in &self.passes {
            let _span = debug_span!("pass", name = %pass.id()).entered();
            tree = pass.run(tree, &mut cx)?;
        }
        debug!(
            blocks = cx.blocks().len(),
            protected = cx.protected().len(),
            "lowering finished"
        );
        Ok(Lowered {
            tree,
            blocks: cx.into_blocks(),
        })
    }
}

/// Run the standard pipeline over a parsed tree.
pub fn lower(tree: Tree, unit: &SourceUnit) -> Result<Lowered, LoweringError> {
    Pipeline::standard().run(tree, unit)
}
