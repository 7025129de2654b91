//! Unary and binary operators.
//!
//! Integer arithmetic is checked and raises `OverflowError`; bools take
//! part in arithmetic as `0` and `1`. `%` follows the sign of the divisor.

use std::cmp::Ordering;

use ry_ir::{BinaryOp, Span, UnaryOp};

use super::Interpreter;
use crate::errors::Flow;
use crate::value::Value;

impl Interpreter {
    pub(super) fn unary(&mut self, op: UnaryOp, operand: Value, span: Span) -> Result<Value, Flow> {
        match (op, &operand) {
            (UnaryOp::Not, _) => Ok(Value::Bool(!operand.is_truthy())),
            (UnaryOp::Neg, Value::Float(x)) => Ok(Value::Float(-x)),
            (UnaryOp::Neg, _) => match operand.as_int() {
                Some(n) => n
                    .checked_neg()
                    .map(Value::Int)
                    .ok_or_else(|| self.overflow(span)),
                None => Err(self.raise(
                    "TypeError",
                    format!("bad operand type for unary -: '{}'", operand.type_name()),
                    span,
                )),
            },
        }
    }

    pub(crate) fn binary(&mut self, op: BinaryOp, left: Value, right: Value, span: Span) -> Result<Value, Flow> {
        match op {
            BinaryOp::Add => self.add(left, right, span),
            BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
                self.arithmetic(op, left, right, span)
            }
            BinaryOp::Eq => Ok(Value::Bool(left.equals(&right))),
            BinaryOp::NotEq => Ok(Value::Bool(!left.equals(&right))),
            BinaryOp::Lt | BinaryOp::Gt | BinaryOp::LtEq | BinaryOp::GtEq => {
                let ordering = self.compare(op, &left, &right, span)?;
                Ok(Value::Bool(match op {
                    BinaryOp::Lt => ordering == Ordering::Less,
                    BinaryOp::Gt => ordering == Ordering::Greater,
                    BinaryOp::LtEq => ordering != Ordering::Greater,
                    _ => ordering != Ordering::Less,
                }))
            }
            BinaryOp::And => Ok(if left.is_truthy() { right } else { left }),
            BinaryOp::Or => Ok(if left.is_truthy() { left } else { right }),
            BinaryOp::In => self.contains(&right, &left, span).map(Value::Bool),
            BinaryOp::Pipe => self.call_value(right, vec![left], span),
            BinaryOp::Spaceship => {
                let ordering = self.compare(op, &left, &right, span)?;
                Ok(Value::Int(match ordering {
                    Ordering::Less => -1,
                    Ordering::Equal => 0,
                    Ordering::Greater => 1,
                }))
            }
            BinaryOp::Compose => Err(self.raise(
                "RuntimeError",
                "`>>` must be lowered before execution",
                span,
            )),
        }
    }

    fn add(&mut self, left: Value, right: Value, span: Span) -> Result<Value, Flow> {
        match (&left, &right) {
            (Value::Str(a), Value::Str(b)) => Ok(Value::str(format!("{a}{b}"))),
            (Value::List(a), Value::List(b)) => {
                let mut items = a.lock().clone();
                items.extend(b.lock().iter().cloned());
                Ok(Value::list(items))
            }
            _ => self.arithmetic(BinaryOp::Add, left, right, span),
        }
    }

    fn arithmetic(&mut self, op: BinaryOp, left: Value, right: Value, span: Span) -> Result<Value, Flow> {
        if let Some(result) = self.metamethod(op, &left, &right, span)? {
            return Ok(result);
        }
        if let (Some(a), Some(b)) = (left.as_int(), right.as_int()) {
            return self.int_arithmetic(op, a, b, span);
        }
        if let (Some(a), Some(b)) = (left.as_float(), right.as_float()) {
            return self.float_arithmetic(op, a, b, span);
        }
        if op == BinaryOp::Mul {
            if let Some(repeated) = repeat(&left, &right).or_else(|| repeat(&right, &left)) {
                return Ok(repeated);
            }
        }
        Err(self.raise(
            "TypeError",
            format!(
                "unsupported operand type(s) for {}: '{}' and '{}'",
                op.symbol(),
                left.type_name(),
                right.type_name()
            ),
            span,
        ))
    }

    #[expect(clippy::cast_precision_loss, reason = "true division yields a float")]
    fn int_arithmetic(&self, op: BinaryOp, a: i64, b: i64, span: Span) -> Result<Value, Flow> {
        let result = match op {
            BinaryOp::Add => a.checked_add(b),
            BinaryOp::Sub => a.checked_sub(b),
            BinaryOp::Mul => a.checked_mul(b),
            BinaryOp::Div => {
                if b == 0 {
                    return Err(self.raise("ZeroDivisionError", "division by zero", span));
                }
                return Ok(Value::Float(a as f64 / b as f64));
            }
            _ => {
                if b == 0 {
                    return Err(self.raise("ZeroDivisionError", "integer modulo by zero", span));
                }
                a.checked_rem(b).map(|r| if r != 0 && (r < 0) != (b < 0) { r + b } else { r })
            }
        };
        result.map(Value::Int).ok_or_else(|| self.overflow(span))
    }

    fn float_arithmetic(&self, op: BinaryOp, a: f64, b: f64, span: Span) -> Result<Value, Flow> {
        let result = match op {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => {
                if b == 0.0 {
                    return Err(self.raise("ZeroDivisionError", "float division by zero", span));
                }
                a / b
            }
            _ => {
                if b == 0.0 {
                    return Err(self.raise("ZeroDivisionError", "float modulo", span));
                }
                let r = a % b;
                if r != 0.0 && (r < 0.0) != (b < 0.0) {
                    r + b
                } else {
                    r
                }
            }
        };
        Ok(Value::Float(result))
    }

    /// `__add` and `__sub` handlers of a MetaTable operand.
    fn metamethod(&mut self, op: BinaryOp, left: &Value, right: &Value, span: Span) -> Result<Option<Value>, Flow> {
        let name = match op {
            BinaryOp::Add => "__add",
            BinaryOp::Sub => "__sub",
            BinaryOp::Mul => "__mul",
            BinaryOp::Div => "__div",
            _ => return Ok(None),
        };
        let handler = [left, right].into_iter().find_map(|operand| match operand {
            Value::Table(table) => table.lock().handler(name),
            _ => None,
        });
        match handler {
            Some(handler) => self
                .call_value(handler, vec![left.clone(), right.clone()], span)
                .map(Some),
            None => Ok(None),
        }
    }

    fn compare(&self, op: BinaryOp, left: &Value, right: &Value, span: Span) -> Result<Ordering, Flow> {
        let ordering = match (left, right) {
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            _ => match (left.as_float(), right.as_float()) {
                (Some(a), Some(b)) => a.partial_cmp(&b),
                _ => None,
            },
        };
        ordering.ok_or_else(|| {
            self.raise(
                "TypeError",
                format!(
                    "'{}' not supported between instances of '{}' and '{}'",
                    op.symbol(),
                    left.type_name(),
                    right.type_name()
                ),
                span,
            )
        })
    }

    pub(crate) fn contains(&self, container: &Value, item: &Value, span: Span) -> Result<bool, Flow> {
        match container {
            Value::List(items) => {
                let items = items.lock().clone();
                Ok(items.iter().any(|v| v.equals(item)))
            }
            Value::Dict(dict) => Ok(dict.lock().contains(item)),
            Value::Table(table) => Ok(table.lock().data.contains(item)),
            Value::Range { start, end } => Ok(item.as_int().is_some_and(|n| *start <= n && n < *end)),
            Value::Str(s) => match item {
                Value::Str(needle) => Ok(s.contains(needle.as_ref())),
                other => Err(self.raise(
                    "TypeError",
                    format!("'in <string>' requires string as left operand, not {}", other.type_name()),
                    span,
                )),
            },
            other => Err(self.raise(
                "TypeError",
                format!("argument of type '{}' is not iterable", other.type_name()),
                span,
            )),
        }
    }

    #[cold]
    fn overflow(&self, span: Span) -> Flow {
        self.raise("OverflowError", "integer overflow", span)
    }
}

/// `seq * n` for strings and lists.
fn repeat(seq: &Value, count: &Value) -> Option<Value> {
    let n = usize::try_from(count.as_int()?.max(0)).ok()?;
    match seq {
        Value::Str(s) => Some(Value::str(s.repeat(n))),
        Value::List(items) => {
            let items = items.lock();
            let mut out = Vec::with_capacity(items.len() * n);
            for _ in 0..n {
                out.extend(items.iter().cloned());
            }
            Some(Value::list(out))
        }
        _ => None,
    }
}
