use ry_ir::{PassId, Tree};

use crate::{LoweringError, PassContext};

/// One tree-to-tree lowering step.
///
/// A pass must return its input unchanged when the tree contains none of
/// the constructs it handles.
pub trait Pass: Send + Sync {
    fn id(&self) -> PassId;

    fn run(&self, tree: Tree, cx: &mut PassContext) -> Result<Tree, LoweringError>;
}
