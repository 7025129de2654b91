//! Intermediate representation for the Ryton compiler.
//!
//! Everything downstream of the lexer speaks in terms of these types:
//! - [`Span`] byte ranges into the original [`SourceUnit`]
//! - [`Tree`] and its [`Stmt`]/[`Expr`] nodes, each tagged with an [`Origin`]
//! - visitor traits for passes that walk or rewrite the tree
//! - a [`ParentIndex`] for upward traversal without back-pointers

mod ast;
mod parent;
mod source;
mod span;
pub mod visit;

pub use ast::{
    BinaryOp, Block, BlockStyle, ClassDecl, Contract, Directives, Expr, ExprKind, FieldDecl,
    ForeignBlock, FuncDecl, Handler, HostBinding, HostImport, IfBranch, ImportDecl, ImportItem,
    ImportKind, MacroDecl, MatchArm, MatchStmt, Origin, PackDecl, Param, PassId, Pattern,
    ProtectToken, Protected, StateMachineDecl, Stmt, StmtKind, StructDecl, Transition, Tree,
    TryStmt, UnaryOp,
};
pub use parent::{NodeId, ParentIndex};
pub use source::{ContentHash, SourceOrigin, SourceUnit};
pub use span::{Span, SpanError};
