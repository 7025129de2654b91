//! Expression evaluation, attribute and index access.

use std::sync::Arc;

use ry_ir::{BinaryOp, Expr, ExprKind, Protected, Span};
use ry_stack::ensure_sufficient_stack;

use super::Interpreter;
use crate::builtins::methods;
use crate::environment::Env;
use crate::errors::Flow;
use crate::value::{Dict, Function, Value};

impl Interpreter {
    pub(crate) fn eval(&mut self, expr: &Expr, env: &Env) -> Result<Value, Flow> {
        ensure_sufficient_stack(|| self.eval_inner(expr, env))
    }

    fn eval_inner(&mut self, expr: &Expr, env: &Env) -> Result<Value, Flow> {
        let span = expr.span;
        match &expr.kind {
            ExprKind::Int(n) => Ok(Value::Int(*n)),
            ExprKind::Float(x) => Ok(Value::Float(*x)),
            ExprKind::Str(s) => Ok(Value::str(s.as_str())),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::None => Ok(Value::None),
            ExprKind::Name(name) => self.lookup(env, name, span),
            ExprKind::This => self.lookup(env, "self", span),
            ExprKind::List(items) => {
                let items = items
                    .iter()
                    .map(|item| self.eval(item, env))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::list(items))
            }
            ExprKind::Dict(pairs) => {
                let mut dict = Dict::default();
                for (key, value) in pairs {
                    let key = self.eval(key, env)?;
                    let value = self.eval(value, env)?;
                    dict.insert(key, value);
                }
                Ok(Value::dict(dict))
            }
            ExprKind::Aggregate(Protected::Raw(text)) => Ok(Value::str(text.as_str())),
            ExprKind::Aggregate(Protected::Placeholder(_))
            | ExprKind::ForeignCall {
                code: Protected::Placeholder(_),
                ..
            } => Err(self.raise("RuntimeError", "protected text was never restored", span)),
            ExprKind::Unary { op, operand } => {
                let operand = self.eval(operand, env)?;
                self.unary(*op, operand, span)
            }
            ExprKind::Binary {
                op: BinaryOp::And,
                left,
                right,
            } => {
                let left = self.eval(left, env)?;
                if left.is_truthy() {
                    self.eval(right, env)
                } else {
                    Ok(left)
                }
            }
            ExprKind::Binary {
                op: BinaryOp::Or,
                left,
                right,
            } => {
                let left = self.eval(left, env)?;
                if left.is_truthy() {
                    Ok(left)
                } else {
                    self.eval(right, env)
                }
            }
            ExprKind::Binary { op, left, right } => {
                let left = self.eval(left, env)?;
                let right = self.eval(right, env)?;
                self.binary(*op, left, right, span)
            }
            ExprKind::Call { callee, args } => {
                let callee = self.eval(callee, env)?;
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg, env))
                    .collect::<Result<Vec<_>, _>>()?;
                self.call_value(callee, args, span)
            }
            ExprKind::Attr { object, name } => {
                let object = self.eval(object, env)?;
                self.get_attr(&object, name, span)
            }
            ExprKind::Index { object, index } => {
                let object = self.eval(object, env)?;
                let index = self.eval(index, env)?;
                self.get_index(&object, &index, span)
            }
            ExprKind::Lambda { params, body } => Ok(Value::Function(Arc::new(Function {
                name: "<lambda>".to_string(),
                params: params.iter().map(|p| p.name.clone()).collect(),
                defaults: vec![None; params.len()],
                body: Arc::new(body.clone()),
                closure: env.clone(),
                package: self.package.clone(),
            }))),
            ExprKind::Range {
                start,
                end,
                inclusive,
            } => {
                let start = self.eval(start, env)?;
                let end = self.eval(end, env)?;
                match (start.as_int(), end.as_int()) {
                    (Some(start), Some(end)) => Ok(Value::Range {
                        start,
                        end: if *inclusive { end.saturating_add(1) } else { end },
                    }),
                    _ => Err(self.raise("TypeError", "range bounds must be integers", span)),
                }
            }
            ExprKind::ForeignCall {
                lang,
                code: Protected::Raw(code),
            } => self.call_bridge(lang, code, span),
        }
    }

    fn lookup(&self, env: &Env, name: &str, span: Span) -> Result<Value, Flow> {
        env.get(name)
            .ok_or_else(|| self.raise("NameError", format!("name '{name}' is not defined"), span))
    }

    pub(crate) fn get_attr(&mut self, object: &Value, name: &str, span: Span) -> Result<Value, Flow> {
        let found = match object {
            Value::Instance(instance) => instance.field(name).or_else(|| {
                instance.class.lookup(name).map(|attr| match attr {
                    Value::Function(f) => Value::BoundMethod(Arc::new((object.clone(), f))),
                    other => other,
                })
            }),
            Value::Class(class) => class.lookup(name),
            Value::Module(module) if module.native => {
                return Err(self.raise(
                    "AttributeError",
                    format!(
                        "native library `{}` exposes no symbols to the interpreter",
                        module.name
                    ),
                    span,
                ));
            }
            Value::Module(module) => module.get(name),
            Value::Table(table) => {
                if let Some(method) = methods::lookup(object, name) {
                    return Ok(Value::NativeMethod(Arc::new((object.clone(), method))));
                }
                let (value, index) = {
                    let table = table.lock();
                    (table.data.get(&Value::str(name)), table.handler("__index"))
                };
                match (value, index) {
                    (Some(value), _) => Some(value),
                    (None, Some(handler)) => {
                        return self.call_value(handler, vec![object.clone(), Value::str(name)], span);
                    }
                    (None, None) => Some(Value::None),
                }
            }
            other => methods::lookup(other, name)
                .map(|method| Value::NativeMethod(Arc::new((other.clone(), method)))),
        };
        found.ok_or_else(|| {
            self.raise(
                "AttributeError",
                format!("'{}' object has no attribute '{name}'", object.type_name()),
                span,
            )
        })
    }

    pub(crate) fn set_attr(&mut self, object: &Value, name: &str, value: Value, span: Span) -> Result<(), Flow> {
        match object {
            Value::Instance(instance) => {
                instance.fields.lock().insert(name.to_string(), value);
                Ok(())
            }
            Value::Class(class) => {
                class.attrs.lock().insert(name.to_string(), value);
                Ok(())
            }
            Value::Table(_) => self.set_index(object, Value::str(name), value, span),
            other => Err(self.raise(
                "AttributeError",
                format!("cannot set attribute '{name}' on '{}' object", other.type_name()),
                span,
            )),
        }
    }

    pub(crate) fn get_index(&mut self, object: &Value, index: &Value, span: Span) -> Result<Value, Flow> {
        match object {
            Value::List(items) => {
                let items = items.lock();
                let i = self.position(index, items.len(), span)?;
                Ok(items[i].clone())
            }
            Value::Str(s) => {
                let chars: Vec<char> = s.chars().collect();
                let i = self.position(index, chars.len(), span)?;
                Ok(Value::str(chars[i].to_string()))
            }
            Value::Dict(dict) => {
                let found = dict.lock().get(index);
                match found {
                    Some(value) => Ok(value),
                    None => {
                        let key = self.repr(index)?;
                        Err(self.raise("KeyError", key, span))
                    }
                }
            }
            Value::Table(table) => {
                let (value, handler) = {
                    let table = table.lock();
                    (table.data.get(index), table.handler("__index"))
                };
                match (value, handler) {
                    (Some(value), _) => Ok(value),
                    (None, Some(handler)) => {
                        self.call_value(handler, vec![object.clone(), index.clone()], span)
                    }
                    (None, None) => Ok(Value::None),
                }
            }
            Value::Range { start, end } => {
                let len = usize::try_from(end.saturating_sub(*start)).unwrap_or(0);
                let i = self.position(index, len, span)?;
                let offset = i64::try_from(i).unwrap_or(i64::MAX);
                Ok(Value::Int(start.saturating_add(offset)))
            }
            other => Err(self.raise(
                "TypeError",
                format!("'{}' object is not subscriptable", other.type_name()),
                span,
            )),
        }
    }

    pub(crate) fn set_index(&mut self, object: &Value, index: Value, value: Value, span: Span) -> Result<(), Flow> {
        match object {
            Value::List(items) => {
                let len = items.lock().len();
                let i = self.position(&index, len, span)?;
                if let Some(slot) = items.lock().get_mut(i) {
                    *slot = value;
                }
                Ok(())
            }
            Value::Dict(dict) => {
                dict.lock().insert(index, value);
                Ok(())
            }
            Value::Table(table) => {
                let handler = {
                    let table = table.lock();
                    if table.data.contains(&index) {
                        None
                    } else {
                        table.handler("__newindex")
                    }
                };
                match handler {
                    Some(handler) => {
                        self.call_value(handler, vec![object.clone(), index, value], span)?;
                    }
                    None => table.lock().data.insert(index, value),
                }
                Ok(())
            }
            other => Err(self.raise(
                "TypeError",
                format!("'{}' object does not support item assignment", other.type_name()),
                span,
            )),
        }
    }

    /// Resolve a possibly negative index against `len`.
    fn position(&self, index: &Value, len: usize, span: Span) -> Result<usize, Flow> {
        let Some(raw) = index.as_int() else {
            return Err(self.raise(
                "TypeError",
                format!("indices must be integers, not {}", index.type_name()),
                span,
            ));
        };
        let len_i = i64::try_from(len).unwrap_or(i64::MAX);
        let adjusted = if raw < 0 { raw + len_i } else { raw };
        usize::try_from(adjusted)
            .ok()
            .filter(|&i| i < len)
            .ok_or_else(|| self.raise("IndexError", "index out of range", span))
    }
}
