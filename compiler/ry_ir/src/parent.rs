//! Parent index for upward traversal.
//!
//! The tree itself has no back-pointers. When a consumer needs to walk from
//! a node to its ancestors (provenance checks, diagnostics), it builds a
//! `ParentIndex` once from a finished tree. Node ids are pre-order positions
//! of statements and expressions, so they are only meaningful for the tree
//! the index was built from.

use std::convert::Infallible;

use crate::visit::{walk_expr, walk_stmt, Visit};
use crate::{Expr, Origin, Span, Stmt, Tree};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug)]
struct Entry {
    parent: Option<NodeId>,
    span: Span,
    origin: Origin,
    is_stmt: bool,
}

/// Pre-order table of every statement and expression with its parent.
#[derive(Clone, Debug, Default)]
pub struct ParentIndex {
    entries: Vec<Entry>,
}

struct Builder {
    entries: Vec<Entry>,
    stack: Vec<NodeId>,
}

impl Builder {
    fn push(&mut self, span: Span, origin: Origin, is_stmt: bool) -> NodeId {
        let id = NodeId(u32::try_from(self.entries.len()).unwrap_or(u32::MAX));
        self.entries.push(Entry {
            parent: self.stack.last().copied(),
            span,
            origin,
            is_stmt,
        });
        id
    }
}

impl Visit for Builder {
    type Error = Infallible;

    fn visit_stmt(&mut self, stmt: &Stmt) -> Result<(), Infallible> {
        let id = self.push(stmt.span, stmt.origin, true);
        self.stack.push(id);
        walk_stmt(self, stmt)?;
        self.stack.pop();
        Ok(())
    }

    fn visit_expr(&mut self, expr: &Expr) -> Result<(), Infallible> {
        let id = self.push(expr.span, expr.origin, false);
        self.stack.push(id);
        walk_expr(self, expr)?;
        self.stack.pop();
        Ok(())
    }
}

impl ParentIndex {
    pub fn build(tree: &Tree) -> Self {
        let mut builder = Builder {
            entries: Vec::new(),
            stack: Vec::new(),
        };
        if let Err(never) = builder.visit_block(&tree.body) {
            match never {}
        }
        ParentIndex {
            entries: builder.entries,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All node ids in pre-order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.entries.len()).map(|i| NodeId(u32::try_from(i).unwrap_or(u32::MAX)))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.entries.get(id.index()).and_then(|e| e.parent)
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.entries.get(id.index()).map_or(Span::DUMMY, |e| e.span)
    }

    pub fn origin(&self, id: NodeId) -> Origin {
        self.entries
            .get(id.index())
            .map_or(Origin::Source, |e| e.origin)
    }

    pub fn is_stmt(&self, id: NodeId) -> bool {
        self.entries.get(id.index()).is_some_and(|e| e.is_stmt)
    }

    /// Ancestors of `id`, nearest first, excluding `id` itself.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&p| self.parent(p))
    }

    /// The nearest node (itself or an ancestor) that came straight from
    /// source text.
    pub fn source_anchor(&self, id: NodeId) -> Option<NodeId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|&n| !self.origin(n).is_synthesized())
    }
}
