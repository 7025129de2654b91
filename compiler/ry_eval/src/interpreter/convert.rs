//! Conversions to text and iteration.

use ry_ir::Span;

use super::Interpreter;
use crate::errors::Flow;
use crate::value::Value;

impl Interpreter {
    /// `str(value)`, honouring `__str__` on instances and `__tostring` on
    /// tables.
    pub(crate) fn to_str(&mut self, value: &Value) -> Result<String, Flow> {
        match value {
            Value::Str(s) => Ok(s.to_string()),
            Value::Instance(instance) => {
                if instance.class.lookup("__str__").is_some() {
                    let method = self.get_attr(value, "__str__", Span::DUMMY)?;
                    let text = self.call_value(method, Vec::new(), Span::DUMMY)?;
                    return self.to_str(&text);
                }
                if instance.class.is_a("Exception") {
                    return match instance.field("message") {
                        Some(message) => self.to_str(&message),
                        None => Ok(String::new()),
                    };
                }
                Ok(format!("<{} object>", instance.class.name))
            }
            Value::Table(table) => {
                let handler = table.lock().handler("__tostring");
                if let Some(handler) = handler {
                    let text = self.call_value(handler, vec![value.clone()], Span::DUMMY)?;
                    return self.to_str(&text);
                }
                let data = Value::dict(table.lock().data.clone());
                self.repr(&data)
            }
            other => self.repr(other),
        }
    }

    /// Quoted form used inside containers.
    pub(crate) fn repr(&mut self, value: &Value) -> Result<String, Flow> {
        Ok(match value {
            Value::None => "None".to_string(),
            Value::Bool(true) => "True".to_string(),
            Value::Bool(false) => "False".to_string(),
            Value::Int(n) => n.to_string(),
            Value::Float(x) => format_float(*x),
            Value::Str(s) => format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
            Value::List(items) => {
                let items = items.lock().clone();
                let parts = items
                    .iter()
                    .map(|item| self.repr(item))
                    .collect::<Result<Vec<_>, _>>()?;
                format!("[{}]", parts.join(", "))
            }
            Value::Dict(dict) => {
                let entries = dict.lock().entries.clone();
                let mut parts = Vec::with_capacity(entries.len());
                for (k, v) in &entries {
                    parts.push(format!("{}: {}", self.repr(k)?, self.repr(v)?));
                }
                format!("{{{}}}", parts.join(", "))
            }
            Value::Range { start, end } => format!("range({start}, {end})"),
            Value::Function(f) => format!("<function {}>", f.name),
            Value::Builtin(b) => format!("<built-in function {}>", b.name),
            Value::Class(c) => format!("<class '{}'>", c.name),
            Value::BoundMethod(bound) => format!("<bound method {}>", bound.1.name),
            Value::NativeMethod(bound) => format!("<built-in method {}>", bound.1),
            Value::Module(m) => format!("<module '{}'>", m.name),
            Value::Instance(_) | Value::Table(_) => self.to_str(value)?,
        })
    }

    /// Snapshot the items of an iterable.
    pub(crate) fn iterate(&self, value: &Value, span: Span) -> Result<Vec<Value>, Flow> {
        match value {
            Value::List(items) => Ok(items.lock().clone()),
            Value::Dict(dict) => Ok(dict.lock().keys()),
            Value::Table(table) => Ok(table.lock().data.keys()),
            Value::Str(s) => Ok(s.chars().map(|c| Value::str(c.to_string())).collect()),
            Value::Range { start, end } => Ok((*start..*end).map(Value::Int).collect()),
            other => Err(self.raise(
                "TypeError",
                format!("'{}' object is not iterable", other.type_name()),
                span,
            )),
        }
    }
}

/// Floats always show a fractional part or exponent, like `1.0`.
pub(crate) fn format_float(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if x.fract() == 0.0 && x.abs() < 1e16 {
        format!("{x:.1}")
    } else {
        format!("{x}")
    }
}
