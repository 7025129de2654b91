//! Statement execution.

use std::sync::Arc;

use ry_ir::{Block, ClassDecl, Expr, ExprKind, FuncDecl, HostBinding, HostImport, Stmt, StmtKind, TryStmt};
use ry_stack::ensure_sufficient_stack;

use super::Interpreter;
use crate::environment::Env;
use crate::errors::{Flow, Raised};
use crate::value::{Class, Function, Module, Value};

impl Interpreter {
    pub(crate) fn exec_block(&mut self, block: &Block, env: &Env) -> Result<(), Flow> {
        ensure_sufficient_stack(|| {
            for stmt in &block.stmts {
                self.safe_point()?;
                self.exec_stmt(stmt, env)?;
            }
            Ok(())
        })
    }

    fn exec_stmt(&mut self, stmt: &Stmt, env: &Env) -> Result<(), Flow> {
        match &stmt.kind {
            StmtKind::Expr(expr) => {
                self.eval(expr, env)?;
            }
            StmtKind::Assign { target, value, .. } => {
                let value = self.eval(value, env)?;
                self.assign(target, value, env)?;
            }
            StmtKind::AugAssign { target, op, value } => {
                let current = self.eval(target, env)?;
                let rhs = self.eval(value, env)?;
                let updated = self.binary(*op, current, rhs, stmt.span)?;
                self.assign(target, updated, env)?;
            }
            StmtKind::Func(func) => {
                let value = self.define_function(func, env)?;
                env.set(func.name.clone(), value);
            }
            StmtKind::Class(class) => self.define_class(class, env)?,
            StmtKind::If {
                branches,
                else_block,
            } => {
                for branch in branches {
                    if self.eval(&branch.cond, env)?.is_truthy() {
                        return self.exec_block(&branch.body, env);
                    }
                }
                if let Some(block) = else_block {
                    self.exec_block(block, env)?;
                }
            }
            StmtKind::While { cond, body } => {
                while self.eval(cond, env)?.is_truthy() {
                    match self.exec_block(body, env) {
                        Ok(()) | Err(Flow::Continue) => {}
                        Err(Flow::Break) => break,
                        Err(flow) => return Err(flow),
                    }
                    self.safe_point()?;
                }
            }
            StmtKind::For { var, iter, body } => {
                let iterable = self.eval(iter, env)?;
                self.exec_for(var, iterable, body, env, iter.span)?;
            }
            StmtKind::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval(expr, env)?,
                    None => Value::None,
                };
                return Err(Flow::Return(value));
            }
            StmtKind::Break => return Err(Flow::Break),
            StmtKind::Continue => return Err(Flow::Continue),
            StmtKind::Pass => {}
            StmtKind::Raise(expr) => {
                let value = self.eval(expr, env)?;
                return Err(self.raise_value(value, expr));
            }
            StmtKind::Try(stmt) => self.exec_try(stmt, env)?,
            StmtKind::Watch {
                cond,
                body,
                interval_ms,
            } => self.register_watch(cond, body, *interval_ms, env),
            StmtKind::HostImport(import) => self.exec_import(import, stmt, env)?,
            other => {
                return Err(self.raise(
                    "RuntimeError",
                    format!("{} must be lowered before execution", other.describe()),
                    stmt.span,
                ));
            }
        }
        Ok(())
    }

    fn exec_for(
        &mut self,
        var: &str,
        iterable: Value,
        body: &Block,
        env: &Env,
        span: ry_ir::Span,
    ) -> Result<(), Flow> {
        let step = |this: &mut Self, item: Value| -> Result<bool, Flow> {
            env.set(var, item);
            match this.exec_block(body, env) {
                Ok(()) | Err(Flow::Continue) => Ok(true),
                Err(Flow::Break) => Ok(false),
                Err(flow) => Err(flow),
            }
        };
        // Ranges are walked lazily; everything else is snapshotted first.
        if let Value::Range { start, end } = iterable {
            for i in start..end {
                if !step(self, Value::Int(i))? {
                    break;
                }
            }
            return Ok(());
        }
        for item in self.iterate(&iterable, span)? {
            if !step(self, item)? {
                break;
            }
        }
        Ok(())
    }

    pub(super) fn assign(&mut self, target: &Expr, value: Value, env: &Env) -> Result<(), Flow> {
        match &target.kind {
            ExprKind::Name(name) => {
                env.set(name.clone(), value);
                Ok(())
            }
            ExprKind::Attr { object, name } => {
                let object = self.eval(object, env)?;
                self.set_attr(&object, name, value, target.span)
            }
            ExprKind::Index { object, index } => {
                let object = self.eval(object, env)?;
                let index = self.eval(index, env)?;
                self.set_index(&object, index, value, target.span)
            }
            ExprKind::List(targets) => {
                let items = self.iterate(&value, target.span)?;
                if items.len() != targets.len() {
                    return Err(self.raise(
                        "ValueError",
                        format!(
                            "expected {} values to unpack, got {}",
                            targets.len(),
                            items.len()
                        ),
                        target.span,
                    ));
                }
                for (target, item) in targets.iter().zip(items) {
                    self.assign(target, item, env)?;
                }
                Ok(())
            }
            _ => Err(self.raise("TypeError", "cannot assign to expression", target.span)),
        }
    }

    /// `raise value`: an exception instance or class, or anything else
    /// wrapped as a `RuntimeError` message.
    fn raise_value(&mut self, value: Value, expr: &Expr) -> Flow {
        let value = match value {
            Value::Class(class) if class.is_a("Exception") => {
                match self.instantiate(&class, Vec::new(), expr.span) {
                    Ok(instance) => instance,
                    Err(flow) => return flow,
                }
            }
            other => other,
        };
        match &value {
            Value::Instance(instance) if instance.class.is_a("Exception") => {
                let message = match instance.field("message") {
                    Some(Value::Str(s)) => s.to_string(),
                    Some(Value::None) | None => String::new(),
                    Some(other) => self.to_str(&other).unwrap_or_default(),
                };
                let kind = instance.class.name.clone();
                self.raised(value, kind, message, expr.span)
            }
            other => {
                let message = self.to_str(other).unwrap_or_default();
                self.raise("RuntimeError", message, expr.span)
            }
        }
    }

    fn exec_try(&mut self, stmt: &TryStmt, env: &Env) -> Result<(), Flow> {
        let mut outcome = self.exec_block(&stmt.body, env);
        if let Err(Flow::Raise(raised)) = outcome {
            outcome = match stmt.handlers.iter().find(|h| handles(h.kind.as_deref(), &raised)) {
                Some(handler) => {
                    if let Some(binding) = &handler.binding {
                        env.set(binding.clone(), raised.value.clone());
                    }
                    self.exec_block(&handler.body, env)
                }
                None => Err(Flow::Raise(raised)),
            };
        }
        if let Some(finally) = &stmt.finally {
            // A jump out of `finally` replaces whatever was in flight.
            self.exec_block(finally, env)?;
        }
        outcome
    }

    pub(super) fn define_function(&mut self, func: &FuncDecl, env: &Env) -> Result<Value, Flow> {
        let mut defaults = Vec::with_capacity(func.params.len());
        for param in &func.params {
            defaults.push(match &param.default {
                Some(expr) => Some(self.eval(expr, env)?),
                None => None,
            });
        }
        Ok(Value::Function(Arc::new(Function {
            name: func.name.clone(),
            params: func.params.iter().map(|p| p.name.clone()).collect(),
            defaults,
            body: Arc::new(func.body.clone()),
            closure: env.clone(),
            package: self.package.clone(),
        })))
    }

    fn define_class(&mut self, decl: &ClassDecl, env: &Env) -> Result<(), Flow> {
        let base = match &decl.base {
            Some(name) => match env.get(name) {
                Some(Value::Class(class)) => Some(class),
                Some(other) => {
                    return Err(self.raise(
                        "TypeError",
                        format!("cannot inherit from {} `{name}`", other.type_name()),
                        decl.body.span,
                    ));
                }
                None => {
                    return Err(self.raise(
                        "NameError",
                        format!("name '{name}' is not defined"),
                        decl.body.span,
                    ));
                }
            },
            None => None,
        };
        let body_env = env.child();
        self.exec_block(&decl.body, &body_env)?;
        let class = Class::new(decl.name.clone(), base);
        {
            let mut attrs = class.attrs.lock();
            for (name, value) in body_env.locals() {
                // Methods close over the enclosing scope, not the class body.
                let value = match value {
                    Value::Function(f) => Value::Function(Arc::new(f.rebind(env.clone()))),
                    other => other,
                };
                attrs.insert(name, value);
            }
        }
        env.set(decl.name.clone(), Value::Class(Arc::new(class)));
        Ok(())
    }

    fn exec_import(&mut self, import: &HostImport, stmt: &Stmt, env: &Env) -> Result<(), Flow> {
        for binding in &import.bindings {
            let value = match binding {
                HostBinding::Module { module, symbol, .. } => {
                    let Some(host) = self.host_module(module) else {
                        return Err(self.raise(
                            "ImportError",
                            format!("host module `{module}` is not available"),
                            stmt.span,
                        ));
                    };
                    if symbol.is_empty() {
                        host
                    } else {
                        let member = match &host {
                            Value::Module(m) => m.get(symbol),
                            _ => None,
                        };
                        member.ok_or_else(|| {
                            self.raise(
                                "ImportError",
                                format!("cannot import name `{symbol}` from `{module}`"),
                                stmt.span,
                            )
                        })?
                    }
                }
                HostBinding::Package { package, .. } => self.load_package(package, stmt.span)?,
                HostBinding::Native { library, .. } => Value::Module(Arc::new(Module {
                    name: library.clone(),
                    members: Vec::new(),
                    native: true,
                })),
            };
            env.set(binding.local().to_string(), value);
        }
        Ok(())
    }
}

fn handles(kind: Option<&str>, raised: &Raised) -> bool {
    let Some(kind) = kind else {
        return true;
    };
    match &raised.value {
        Value::Instance(instance) => instance.class.is_a(kind),
        _ => raised.kind == kind || kind == "Exception",
    }
}
