//! Switch every remaining brace-delimited block to host style.
//!
//! Runs after all passes that look for brace blocks.

use std::convert::Infallible;

use ry_ir::visit::{walk_block_mut, VisitMut};
use ry_ir::{Block, BlockStyle, PassId, Tree};

use crate::{LoweringError, Pass, PassContext};

pub struct Declarations;

impl Pass for Declarations {
    fn id(&self) -> PassId {
        PassId::Declarations
    }

    fn run(&self, mut tree: Tree, _cx: &mut PassContext) -> Result<Tree, LoweringError> {
        if let Err(never) = HostStyle.visit_block(&mut tree.body) {
            match never {}
        }
        Ok(tree)
    }
}

struct HostStyle;

impl VisitMut for HostStyle {
    type Error = Infallible;

    fn visit_block(&mut self, block: &mut Block) -> Result<(), Infallible> {
        if block.style == BlockStyle::Brace {
            block.style = BlockStyle::Host;
        }
        walk_block_mut(self, block)
    }
}
