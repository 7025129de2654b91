//! Tree traversal.
//!
//! [`Visit`] walks a tree read-only, [`VisitMut`] walks it in place. Both are
//! fallible so a pass can abort with its own error type at the first
//! malformed construct. Override a `visit_*` method to intercept a node and
//! call the matching `walk_*` function to continue into its children.

use crate::{Block, Expr, ExprKind, FuncDecl, Pattern, Stmt, StmtKind, TryStmt};

/// Read-only visitor.
pub trait Visit {
    type Error;

    fn visit_block(&mut self, block: &Block) -> Result<(), Self::Error> {
        walk_block(self, block)
    }

    fn visit_stmt(&mut self, stmt: &Stmt) -> Result<(), Self::Error> {
        walk_stmt(self, stmt)
    }

    fn visit_expr(&mut self, expr: &Expr) -> Result<(), Self::Error> {
        walk_expr(self, expr)
    }
}

pub fn walk_block<V: Visit + ?Sized>(v: &mut V, block: &Block) -> Result<(), V::Error> {
    for stmt in &block.stmts {
        v.visit_stmt(stmt)?;
    }
    Ok(())
}

fn walk_func<V: Visit + ?Sized>(v: &mut V, func: &FuncDecl) -> Result<(), V::Error> {
    for param in &func.params {
        if let Some(default) = &param.default {
            v.visit_expr(default)?;
        }
    }
    if let Some(contract) = &func.contract {
        v.visit_expr(&contract.require)?;
        v.visit_expr(&contract.ensure)?;
    }
    v.visit_block(&func.body)
}

fn walk_try<V: Visit + ?Sized>(v: &mut V, t: &TryStmt) -> Result<(), V::Error> {
    v.visit_block(&t.body)?;
    for handler in &t.handlers {
        v.visit_block(&handler.body)?;
    }
    if let Some(finally) = &t.finally {
        v.visit_block(finally)?;
    }
    Ok(())
}

pub fn walk_stmt<V: Visit + ?Sized>(v: &mut V, stmt: &Stmt) -> Result<(), V::Error> {
    match &stmt.kind {
        StmtKind::Expr(e) | StmtKind::Raise(e) | StmtKind::Return(Some(e)) => v.visit_expr(e),
        StmtKind::Assign { target, value, .. } | StmtKind::AugAssign { target, value, .. } => {
            v.visit_expr(target)?;
            v.visit_expr(value)
        }
        StmtKind::Func(func) => walk_func(v, func),
        StmtKind::Class(class) => v.visit_block(&class.body),
        StmtKind::Pack(pack) => v.visit_block(&pack.body),
        StmtKind::If {
            branches,
            else_block,
        } => {
            for branch in branches {
                v.visit_expr(&branch.cond)?;
                v.visit_block(&branch.body)?;
            }
            if let Some(block) = else_block {
                v.visit_block(block)?;
            }
            Ok(())
        }
        StmtKind::While { cond, body }
        | StmtKind::Guard { cond, body }
        | StmtKind::Watch { cond, body, .. } => {
            v.visit_expr(cond)?;
            v.visit_block(body)
        }
        StmtKind::For { iter, body, .. } => {
            v.visit_expr(iter)?;
            v.visit_block(body)
        }
        StmtKind::Try(t) | StmtKind::Elerr(t) => walk_try(v, t),
        StmtKind::Defer(block) | StmtKind::Parallel(block) => v.visit_block(block),
        StmtKind::Match(m) => {
            v.visit_expr(&m.scrutinee)?;
            for arm in &m.arms {
                if let Pattern::Literal(lit) = &arm.pattern {
                    v.visit_expr(lit)?;
                }
                v.visit_block(&arm.body)?;
            }
            if let Some(default) = &m.default {
                v.visit_block(default)?;
            }
            Ok(())
        }
        StmtKind::Struct(s) => {
            for field in &s.fields {
                if let Some(default) = &field.default {
                    v.visit_expr(default)?;
                }
            }
            Ok(())
        }
        StmtKind::Event { left, right, body } => {
            v.visit_expr(left)?;
            v.visit_expr(right)?;
            v.visit_block(body)
        }
        StmtKind::MacroDef(m) => v.visit_block(&m.body),
        StmtKind::MacroCall { args, .. } => {
            for arg in args {
                v.visit_expr(arg)?;
            }
            Ok(())
        }
        StmtKind::Table { value, .. } => v.visit_expr(value),
        StmtKind::Return(None)
        | StmtKind::Break
        | StmtKind::Continue
        | StmtKind::Pass
        | StmtKind::HostImport(_)
        | StmtKind::Import(_)
        | StmtKind::StateMachine(_)
        | StmtKind::Foreign(_)
        | StmtKind::NativeLib { .. } => Ok(()),
    }
}

pub fn walk_expr<V: Visit + ?Sized>(v: &mut V, expr: &Expr) -> Result<(), V::Error> {
    match &expr.kind {
        ExprKind::List(items) => {
            for item in items {
                v.visit_expr(item)?;
            }
            Ok(())
        }
        ExprKind::Dict(entries) => {
            for (key, value) in entries {
                v.visit_expr(key)?;
                v.visit_expr(value)?;
            }
            Ok(())
        }
        ExprKind::Unary { operand, .. } => v.visit_expr(operand),
        ExprKind::Binary { left, right, .. } => {
            v.visit_expr(left)?;
            v.visit_expr(right)
        }
        ExprKind::Range { start, end, .. } => {
            v.visit_expr(start)?;
            v.visit_expr(end)
        }
        ExprKind::Call { callee, args } => {
            v.visit_expr(callee)?;
            for arg in args {
                v.visit_expr(arg)?;
            }
            Ok(())
        }
        ExprKind::Attr { object, .. } => v.visit_expr(object),
        ExprKind::Index { object, index } => {
            v.visit_expr(object)?;
            v.visit_expr(index)
        }
        ExprKind::Lambda { params, body } => {
            for param in params {
                if let Some(default) = &param.default {
                    v.visit_expr(default)?;
                }
            }
            v.visit_block(body)
        }
        ExprKind::Int(_)
        | ExprKind::Float(_)
        | ExprKind::Str(_)
        | ExprKind::Bool(_)
        | ExprKind::None
        | ExprKind::Name(_)
        | ExprKind::This
        | ExprKind::Aggregate(_)
        | ExprKind::ForeignCall { .. } => Ok(()),
    }
}

/// In-place visitor.
pub trait VisitMut {
    type Error;

    fn visit_block(&mut self, block: &mut Block) -> Result<(), Self::Error> {
        walk_block_mut(self, block)
    }

    fn visit_stmt(&mut self, stmt: &mut Stmt) -> Result<(), Self::Error> {
        walk_stmt_mut(self, stmt)
    }

    fn visit_expr(&mut self, expr: &mut Expr) -> Result<(), Self::Error> {
        walk_expr_mut(self, expr)
    }
}

pub fn walk_block_mut<V: VisitMut + ?Sized>(v: &mut V, block: &mut Block) -> Result<(), V::Error> {
    for stmt in &mut block.stmts {
        v.visit_stmt(stmt)?;
    }
    Ok(())
}

fn walk_func_mut<V: VisitMut + ?Sized>(v: &mut V, func: &mut FuncDecl) -> Result<(), V::Error> {
    for param in &mut func.params {
        if let Some(default) = &mut param.default {
            v.visit_expr(default)?;
        }
    }
    if let Some(contract) = &mut func.contract {
        v.visit_expr(&mut contract.require)?;
        v.visit_expr(&mut contract.ensure)?;
    }
    v.visit_block(&mut func.body)
}

fn walk_try_mut<V: VisitMut + ?Sized>(v: &mut V, t: &mut TryStmt) -> Result<(), V::Error> {
    v.visit_block(&mut t.body)?;
    for handler in &mut t.handlers {
        v.visit_block(&mut handler.body)?;
    }
    if let Some(finally) = &mut t.finally {
        v.visit_block(finally)?;
    }
    Ok(())
}

pub fn walk_stmt_mut<V: VisitMut + ?Sized>(v: &mut V, stmt: &mut Stmt) -> Result<(), V::Error> {
    match &mut stmt.kind {
        StmtKind::Expr(e) | StmtKind::Raise(e) | StmtKind::Return(Some(e)) => v.visit_expr(e),
        StmtKind::Assign { target, value, .. } | StmtKind::AugAssign { target, value, .. } => {
            v.visit_expr(target)?;
            v.visit_expr(value)
        }
        StmtKind::Func(func) => walk_func_mut(v, func),
        StmtKind::Class(class) => v.visit_block(&mut class.body),
        StmtKind::Pack(pack) => v.visit_block(&mut pack.body),
        StmtKind::If {
            branches,
            else_block,
        } => {
            for branch in branches {
                v.visit_expr(&mut branch.cond)?;
                v.visit_block(&mut branch.body)?;
            }
            if let Some(block) = else_block {
                v.visit_block(block)?;
            }
            Ok(())
        }
        StmtKind::While { cond, body }
        | StmtKind::Guard { cond, body }
        | StmtKind::Watch { cond, body, .. } => {
            v.visit_expr(cond)?;
            v.visit_block(body)
        }
        StmtKind::For { iter, body, .. } => {
            v.visit_expr(iter)?;
            v.visit_block(body)
        }
        StmtKind::Try(t) | StmtKind::Elerr(t) => walk_try_mut(v, t),
        StmtKind::Defer(block) | StmtKind::Parallel(block) => v.visit_block(block),
        StmtKind::Match(m) => {
            v.visit_expr(&mut m.scrutinee)?;
            for arm in &mut m.arms {
                if let Pattern::Literal(lit) = &mut arm.pattern {
                    v.visit_expr(lit)?;
                }
                v.visit_block(&mut arm.body)?;
            }
            if let Some(default) = &mut m.default {
                v.visit_block(default)?;
            }
            Ok(())
        }
        StmtKind::Struct(s) => {
            for field in &mut s.fields {
                if let Some(default) = &mut field.default {
                    v.visit_expr(default)?;
                }
            }
            Ok(())
        }
        StmtKind::Event { left, right, body } => {
            v.visit_expr(left)?;
            v.visit_expr(right)?;
            v.visit_block(body)
        }
        StmtKind::MacroDef(m) => v.visit_block(&mut m.body),
        StmtKind::MacroCall { args, .. } => {
            for arg in args {
                v.visit_expr(arg)?;
            }
            Ok(())
        }
        StmtKind::Table { value, .. } => v.visit_expr(value),
        StmtKind::Return(None)
        | StmtKind::Break
        | StmtKind::Continue
        | StmtKind::Pass
        | StmtKind::HostImport(_)
        | StmtKind::Import(_)
        | StmtKind::StateMachine(_)
        | StmtKind::Foreign(_)
        | StmtKind::NativeLib { .. } => Ok(()),
    }
}

pub fn walk_expr_mut<V: VisitMut + ?Sized>(v: &mut V, expr: &mut Expr) -> Result<(), V::Error> {
    match &mut expr.kind {
        ExprKind::List(items) => {
            for item in items {
                v.visit_expr(item)?;
            }
            Ok(())
        }
        ExprKind::Dict(entries) => {
            for (key, value) in entries {
                v.visit_expr(key)?;
                v.visit_expr(value)?;
            }
            Ok(())
        }
        ExprKind::Unary { operand, .. } => v.visit_expr(operand),
        ExprKind::Binary { left, right, .. } => {
            v.visit_expr(left)?;
            v.visit_expr(right)
        }
        ExprKind::Range { start, end, .. } => {
            v.visit_expr(start)?;
            v.visit_expr(end)
        }
        ExprKind::Call { callee, args } => {
            v.visit_expr(callee)?;
            for arg in args {
                v.visit_expr(arg)?;
            }
            Ok(())
        }
        ExprKind::Attr { object, .. } => v.visit_expr(object),
        ExprKind::Index { object, index } => {
            v.visit_expr(object)?;
            v.visit_expr(index)
        }
        ExprKind::Lambda { params, body } => {
            for param in params {
                if let Some(default) = &mut param.default {
                    v.visit_expr(default)?;
                }
            }
            v.visit_block(body)
        }
        ExprKind::Int(_)
        | ExprKind::Float(_)
        | ExprKind::Str(_)
        | ExprKind::Bool(_)
        | ExprKind::None
        | ExprKind::Name(_)
        | ExprKind::This
        | ExprKind::Aggregate(_)
        | ExprKind::ForeignCall { .. } => Ok(()),
    }
}
