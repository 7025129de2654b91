//! Syntax tree.
//!
//! One tree type serves the whole pipeline: the parser produces surface
//! nodes, each lowering pass replaces its surface forms with host forms,
//! and the executor only ever sees host forms. Nodes own their children
//! exclusively; upward traversal goes through [`ParentIndex`](crate::ParentIndex).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Span;

/// Identifies the lowering pass that synthesized a node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PassId {
    Protect,
    Macros,
    Blocks,
    Contracts,
    StrictTyping,
    Records,
    StateMachines,
    Events,
    Guards,
    Defer,
    Match,
    Operators,
    Ranges,
    TrySugar,
    Tables,
    Oop,
    Declarations,
    Foreign,
    Restore,
    Imports,
    Validate,
}

impl PassId {
    pub fn name(self) -> &'static str {
        match self {
            PassId::Protect => "protect",
            PassId::Macros => "macros",
            PassId::Blocks => "blocks",
            PassId::Contracts => "contracts",
            PassId::StrictTyping => "strict_typing",
            PassId::Records => "records",
            PassId::StateMachines => "state_machines",
            PassId::Events => "events",
            PassId::Guards => "guards",
            PassId::Defer => "defer",
            PassId::Match => "match",
            PassId::Operators => "operators",
            PassId::Ranges => "ranges",
            PassId::TrySugar => "try_sugar",
            PassId::Tables => "tables",
            PassId::Oop => "oop",
            PassId::Declarations => "declarations",
            PassId::Foreign => "foreign",
            PassId::Restore => "restore",
            PassId::Imports => "imports",
            PassId::Validate => "validate",
        }
    }
}

impl fmt::Display for PassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Provenance of a node.
///
/// Synthesized nodes keep the span of the construct they were lowered
/// from, so every span in a lowered tree still points into the original
/// source text.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Origin {
    #[default]
    Source,
    Synthesized(PassId),
}

impl Origin {
    pub fn is_synthesized(self) -> bool {
        matches!(self, Origin::Synthesized(_))
    }
}

/// Token standing in for a protected region until the restore pass.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProtectToken(pub u32);

impl fmt::Display for ProtectToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "__protected_{}__", self.0)
    }
}

/// Text that later passes must not touch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Protected {
    Raw(String),
    Placeholder(ProtectToken),
}

/// Top-level directives discovered by the parser.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Directives {
    /// Clear the object table and force a collection after the run.
    pub trash_cleaner: bool,
    /// Insert runtime checks for annotated parameters.
    pub strict_typing: bool,
}

/// The unit under rewrite.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub body: Block,
    pub directives: Directives,
}

/// How a block is delimited in the textual form it will be printed in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockStyle {
    /// The implicit top-level block.
    Module,
    /// Surface `{ ... }` block.
    Brace,
    /// Host indentation block.
    Host,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub style: BlockStyle,
    pub span: Span,
}

impl Block {
    pub fn new(stmts: Vec<Stmt>, style: BlockStyle, span: Span) -> Self {
        Block { stmts, style, span }
    }

    pub fn is_empty(&self) -> bool {
        self.stmts.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
    pub origin: Origin,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt {
            kind,
            span,
            origin: Origin::Source,
        }
    }

    pub fn synth(kind: StmtKind, span: Span, pass: PassId) -> Self {
        Stmt {
            kind,
            span,
            origin: Origin::Synthesized(pass),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum StmtKind {
    // Host forms
    Expr(Expr),
    Assign {
        target: Expr,
        value: Expr,
        private: bool,
    },
    AugAssign {
        target: Expr,
        op: BinaryOp,
        value: Expr,
    },
    Func(FuncDecl),
    Class(ClassDecl),
    If {
        branches: Vec<IfBranch>,
        else_block: Option<Block>,
    },
    While {
        cond: Expr,
        body: Block,
    },
    For {
        var: String,
        iter: Expr,
        body: Block,
    },
    Return(Option<Expr>),
    Break,
    Continue,
    Pass,
    Raise(Expr),
    Try(TryStmt),
    /// Poll `cond` every `interval_ms`; run `body` once when it holds.
    Watch {
        cond: Expr,
        body: Block,
        interval_ms: u64,
    },
    HostImport(HostImport),

    // Imports awaiting resolution
    Import(ImportDecl),

    // Surface forms
    Guard {
        cond: Expr,
        body: Block,
    },
    Defer(Block),
    Match(MatchStmt),
    Pack(PackDecl),
    Struct(StructDecl),
    StateMachine(StateMachineDecl),
    Event {
        left: Expr,
        right: Expr,
        body: Block,
    },
    Parallel(Block),
    Elerr(TryStmt),
    MacroDef(MacroDecl),
    MacroCall {
        name: String,
        args: Vec<Expr>,
    },
    Table {
        name: String,
        value: Expr,
    },
    Foreign(ForeignBlock),
    NativeLib {
        name: String,
    },
}

impl StmtKind {
    /// Short name of the node kind, for diagnostics and validation.
    pub fn describe(&self) -> &'static str {
        match self {
            StmtKind::Expr(_) => "expression",
            StmtKind::Assign { .. } => "assignment",
            StmtKind::AugAssign { .. } => "compound assignment",
            StmtKind::Func(_) => "function",
            StmtKind::Class(_) => "class",
            StmtKind::If { .. } => "if",
            StmtKind::While { .. } => "while",
            StmtKind::For { .. } => "for",
            StmtKind::Return(_) => "return",
            StmtKind::Break => "break",
            StmtKind::Continue => "continue",
            StmtKind::Pass => "pass",
            StmtKind::Raise(_) => "raise",
            StmtKind::Try(_) => "try",
            StmtKind::Watch { .. } => "watch",
            StmtKind::HostImport(_) => "host import",
            StmtKind::Import(_) => "import",
            StmtKind::Guard { .. } => "guard",
            StmtKind::Defer(_) => "defer",
            StmtKind::Match(_) => "match",
            StmtKind::Pack(_) => "pack",
            StmtKind::Struct(_) => "struct",
            StmtKind::StateMachine(_) => "state_machine",
            StmtKind::Event { .. } => "event",
            StmtKind::Parallel(_) => "parallel",
            StmtKind::Elerr(_) => "try/elerr",
            StmtKind::MacroDef(_) => "macro",
            StmtKind::MacroCall { .. } => "macro call",
            StmtKind::Table { .. } => "table",
            StmtKind::Foreign(_) => "foreign block",
            StmtKind::NativeLib { .. } => "clib",
        }
    }

    /// True for forms that some lowering pass must remove.
    pub fn is_surface(&self) -> bool {
        matches!(
            self,
            StmtKind::Guard { .. }
                | StmtKind::Defer(_)
                | StmtKind::Match(_)
                | StmtKind::Pack(_)
                | StmtKind::Struct(_)
                | StmtKind::StateMachine(_)
                | StmtKind::Event { .. }
                | StmtKind::Parallel(_)
                | StmtKind::Elerr(_)
                | StmtKind::MacroDef(_)
                | StmtKind::MacroCall { .. }
                | StmtKind::Table { .. }
                | StmtKind::Foreign(_)
                | StmtKind::NativeLib { .. }
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IfBranch {
    pub cond: Expr,
    pub body: Block,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub ty: Option<String>,
    pub default: Option<Expr>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub require: Expr,
    pub ensure: Expr,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FuncDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub body: Block,
    pub contract: Option<Contract>,
    pub private: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassDecl {
    pub name: String,
    pub base: Option<String>,
    pub body: Block,
    pub private: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PackDecl {
    pub name: String,
    pub base: Option<String>,
    pub body: Block,
    pub private: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    pub ty: String,
    pub default: Option<Expr>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StructDecl {
    pub name: String,
    pub fields: Vec<FieldDecl>,
    pub private: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub from: String,
    pub to: String,
    pub action: String,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateMachineDecl {
    pub name: String,
    pub initial: String,
    pub transitions: Vec<Transition>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Handler {
    /// Error kind to catch; `None` catches everything.
    pub kind: Option<String>,
    pub binding: Option<String>,
    pub body: Block,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TryStmt {
    pub body: Block,
    pub handlers: Vec<Handler>,
    pub finally: Option<Block>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Pattern {
    Literal(Expr),
    Wildcard,
    /// `Type(binding)`: matches instances of `type_name`, binds the value.
    Type { type_name: String, binding: String },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchArm {
    pub pattern: Pattern,
    pub body: Block,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchStmt {
    pub scrutinee: Expr,
    pub arms: Vec<MatchArm>,
    pub default: Option<Block>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MacroDecl {
    pub name: String,
    pub params: Vec<String>,
    pub body: Block,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForeignBlock {
    pub lang: String,
    pub code: Protected,
    pub result: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImportKind {
    Module,
    Package,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportItem {
    /// Dotted path segments, e.g. `["std", "Math"]`.
    pub path: Vec<String>,
    pub alias: Option<String>,
    pub span: Span,
}

impl ImportItem {
    pub fn dotted(&self) -> String {
        self.path.join(".")
    }

    /// Name the item is bound to in the importing scope.
    pub fn local_name(&self) -> &str {
        self.alias
            .as_deref()
            .or_else(|| self.path.last().map(String::as_str))
            .unwrap_or("")
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportDecl {
    pub kind: ImportKind,
    pub items: Vec<ImportItem>,
}

/// One resolved import binding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostBinding {
    /// `symbol` of host module `module`, bound as `local`. `companions`
    /// are the other targets that had to be available alongside it.
    Module {
        local: String,
        module: String,
        symbol: String,
        companions: Vec<String>,
    },
    /// A loaded package, bound as a module value.
    Package { local: String, package: String },
    /// A native library exposed by the host.
    Native { local: String, library: String },
}

impl HostBinding {
    pub fn local(&self) -> &str {
        match self {
            HostBinding::Module { local, .. }
            | HostBinding::Package { local, .. }
            | HostBinding::Native { local, .. } => local,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostImport {
    pub bindings: Vec<HostBinding>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
    pub origin: Origin,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr {
            kind,
            span,
            origin: Origin::Source,
        }
    }

    pub fn synth(kind: ExprKind, span: Span, pass: PassId) -> Self {
        Expr {
            kind,
            span,
            origin: Origin::Synthesized(pass),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    None,
    Name(String),
    /// Surface `this`; the OOP pass rewrites it to `self`.
    This,
    List(Vec<Expr>),
    Dict(Vec<(Expr, Expr)>),
    /// Literal aggregate `<{ ... }>`, kept verbatim.
    Aggregate(Protected),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Attr {
        object: Box<Expr>,
        name: String,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    Lambda {
        params: Vec<Param>,
        body: Block,
    },
    /// Surface range literal; `inclusive` for `a..b`.
    Range {
        start: Box<Expr>,
        end: Box<Expr>,
        inclusive: bool,
    },
    /// Call into an embedded-language bridge.
    ForeignCall {
        lang: String,
        code: Protected,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    And,
    Or,
    In,
    /// `x |> f`
    Pipe,
    /// `f >> g`
    Compose,
    /// `a <=> b`
    Spaceship,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::LtEq => "<=",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::In => "in",
            BinaryOp::Pipe => "|>",
            BinaryOp::Compose => ">>",
            BinaryOp::Spaceship => "<=>",
        }
    }

    /// Operators that only exist in surface syntax.
    pub fn is_surface(self) -> bool {
        matches!(self, BinaryOp::Pipe | BinaryOp::Compose | BinaryOp::Spaceship)
    }
}
