//! Textual host form of a lowered tree.
//!
//! Used by `translate` and to give the location tracker something to map
//! back from. Each printed line remembers the span of the statement that
//! produced it.

use std::fmt::Write;

use ry_diagnostic::LoweredLine;
use ry_ir::{
    Block, Expr, ExprKind, HostBinding, Param, Protected, Span, Stmt, StmtKind, Tree, UnaryOp,
};

const INDENT: &str = "    ";

pub fn print_host(tree: &Tree) -> Vec<LoweredLine> {
    let mut printer = Printer {
        lines: Vec::new(),
        depth: 0,
    };
    printer.stmts(&tree.body);
    printer.lines
}

pub fn render(lines: &[LoweredLine]) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(&line.text);
        out.push('\n');
    }
    out
}

struct Printer {
    lines: Vec<LoweredLine>,
    depth: usize,
}

impl Printer {
    fn line(&mut self, text: &str, origin: Span) {
        let indent = INDENT.repeat(self.depth);
        for part in text.split('\n') {
            self.lines.push(LoweredLine {
                text: format!("{indent}{part}"),
                origin: Some(origin),
            });
        }
    }

    fn stmts(&mut self, block: &Block) {
        for stmt in &block.stmts {
            self.stmt(stmt);
        }
    }

    fn suite(&mut self, header: &str, block: &Block, origin: Span) {
        self.line(header, origin);
        self.depth += 1;
        if block.is_empty() {
            self.line("pass", origin);
        } else {
            self.stmts(block);
        }
        self.depth -= 1;
    }

    fn stmt(&mut self, stmt: &Stmt) {
        let at = stmt.span;
        match &stmt.kind {
            StmtKind::Expr(e) => self.line(&expr(e), at),
            StmtKind::Assign { target, value, .. } => {
                self.line(&format!("{} = {}", expr(target), expr(value)), at);
            }
            StmtKind::AugAssign { target, op, value } => {
                let text = format!("{} {}= {}", expr(target), op.symbol(), expr(value));
                self.line(&text, at);
            }
            StmtKind::Func(func) => {
                let header = format!("def {}({}):", func.name, params(&func.params));
                self.suite(&header, &func.body, at);
            }
            StmtKind::Class(class) => {
                let header = match &class.base {
                    Some(base) => format!("class {}({base}):", class.name),
                    None => format!("class {}:", class.name),
                };
                self.suite(&header, &class.body, at);
            }
            StmtKind::If {
                branches,
                else_block,
            } => {
                for (i, branch) in branches.iter().enumerate() {
                    let kw = if i == 0 { "if" } else { "elif" };
                    self.suite(&format!("{kw} {}:", expr(&branch.cond)), &branch.body, at);
                }
                if let Some(block) = else_block {
                    self.suite("else:", block, at);
                }
            }
            StmtKind::While { cond, body } => {
                self.suite(&format!("while {}:", expr(cond)), body, at);
            }
            StmtKind::For { var, iter, body } => {
                self.suite(&format!("for {var} in {}:", expr(iter)), body, at);
            }
            StmtKind::Return(None) => self.line("return", at),
            StmtKind::Return(Some(e)) => self.line(&format!("return {}", expr(e)), at),
            StmtKind::Break => self.line("break", at),
            StmtKind::Continue => self.line("continue", at),
            StmtKind::Pass => self.line("pass", at),
            StmtKind::Raise(e) => self.line(&format!("raise {}", expr(e)), at),
            StmtKind::Try(t) => {
                self.suite("try:", &t.body, at);
                for handler in &t.handlers {
                    let header = match (&handler.kind, &handler.binding) {
                        (Some(kind), Some(b)) => format!("except {kind} as {b}:"),
                        (Some(kind), None) => format!("except {kind}:"),
                        (None, Some(b)) => format!("except Exception as {b}:"),
                        (None, None) => "except:".to_string(),
                    };
                    self.suite(&header, &handler.body, handler.span);
                }
                if let Some(finally) = &t.finally {
                    self.suite("finally:", finally, at);
                }
            }
            StmtKind::Watch {
                cond,
                body,
                interval_ms,
            } => {
                self.suite(&format!("watch {} ({interval_ms}ms):", expr(cond)), body, at);
            }
            StmtKind::HostImport(import) => {
                for binding in &import.bindings {
                    self.line(&host_binding(binding), at);
                }
            }
            StmtKind::Import(import) => {
                let items: Vec<_> = import.items.iter().map(|i| i.dotted()).collect();
                self.line(&format!("import {}", items.join(", ")), at);
            }
            other => self.line(&format!("# unlowered {}", other.describe()), at),
        }
    }
}

fn host_binding(binding: &HostBinding) -> String {
    match binding {
        HostBinding::Module {
            local,
            module,
            symbol,
            ..
        } => {
            if symbol.is_empty() {
                format!("import {module} as {local}")
            } else {
                format!("from {module} import {symbol} as {local}")
            }
        }
        HostBinding::Package { local, package } => format!("import {package} as {local}"),
        HostBinding::Native { local, library } => format!("{local} = __native__({library:?})"),
    }
}

fn params(params: &[Param]) -> String {
    let mut out = String::new();
    for (i, p) in params.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&p.name);
        if let Some(ty) = &p.ty {
            let _ = write!(out, ": {ty}");
        }
        if let Some(default) = &p.default {
            let _ = write!(out, "={}", expr(default));
        }
    }
    out
}

fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn protected(p: &Protected) -> String {
    match p {
        Protected::Raw(text) => text.clone(),
        Protected::Placeholder(token) => token.to_string(),
    }
}

/// Operand text, parenthesized when it is itself an operator expression.
fn operand(e: &Expr) -> String {
    match e.kind {
        ExprKind::Binary { .. } | ExprKind::Unary { .. } | ExprKind::Lambda { .. } => {
            format!("({})", expr(e))
        }
        _ => expr(e),
    }
}

fn list(items: &[Expr]) -> String {
    items.iter().map(expr).collect::<Vec<_>>().join(", ")
}

fn expr(e: &Expr) -> String {
    match &e.kind {
        ExprKind::Int(v) => v.to_string(),
        ExprKind::Float(v) => format!("{v:?}"),
        ExprKind::Str(s) => quote(s),
        ExprKind::Bool(true) => "True".to_string(),
        ExprKind::Bool(false) => "False".to_string(),
        ExprKind::None => "None".to_string(),
        ExprKind::Name(n) => n.clone(),
        ExprKind::This => "this".to_string(),
        ExprKind::List(items) => format!("[{}]", list(items)),
        ExprKind::Dict(entries) => {
            let body: Vec<_> = entries
                .iter()
                .map(|(k, v)| format!("{}: {}", expr(k), expr(v)))
                .collect();
            format!("{{{}}}", body.join(", "))
        }
        ExprKind::Aggregate(p) => protected(p),
        ExprKind::Unary { op, operand: o } => match op {
            UnaryOp::Neg => format!("-{}", operand(o)),
            UnaryOp::Not => format!("not {}", operand(o)),
        },
        ExprKind::Binary { op, left, right } => {
            format!("{} {} {}", operand(left), op.symbol(), operand(right))
        }
        ExprKind::Call { callee, args } => format!("{}({})", operand(callee), list(args)),
        ExprKind::Attr { object, name } => format!("{}.{name}", operand(object)),
        ExprKind::Index { object, index } => format!("{}[{}]", operand(object), expr(index)),
        ExprKind::Lambda { params: ps, body } => match body.stmts.as_slice() {
            [Stmt {
                kind: StmtKind::Return(Some(value)),
                ..
            }] => format!("lambda {}: {}", params(ps), expr(value)),
            _ => {
                let mut inner = Printer {
                    lines: Vec::new(),
                    depth: 0,
                };
                inner.stmts(body);
                let stmts: Vec<_> = inner.lines.into_iter().map(|l| l.text.trim().to_string()).collect();
                format!("lambda {}: {{ {} }}", params(ps), stmts.join("; "))
            }
        },
        ExprKind::Range {
            start,
            end,
            inclusive,
        } => {
            let dots = if *inclusive { ".." } else { "..." };
            format!("{}{dots}{}", operand(start), operand(end))
        }
        ExprKind::ForeignCall { lang, code } => {
            format!("__bridge__({}, \"\"\"{}\"\"\")", quote(lang), protected(code))
        }
    }
}
