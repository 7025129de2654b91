//! Lua-style tables and JSON output.
//!
//! A table literal `<{ ... }>` reaches the interpreter as its verbatim
//! text; `MetaTable(...)` parses the braces as JSON.

use std::sync::Arc;

use parking_lot::Mutex;
use ry_ir::Span;

use super::arity;
use crate::errors::Flow;
use crate::interpreter::Interpreter;
use crate::value::{Builtin, Dict, MetaTable, Value};

type Result = std::result::Result<Value, Flow>;

pub(super) static GLOBALS: &[Builtin] = &[
    Builtin { name: "MetaTable", func: meta_table },
    Builtin { name: "print_json", func: print_json },
];

pub(super) static LIB: &[Builtin] = &[Builtin { name: "print_json", func: print_json }];

fn meta_table(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    arity(interp, "MetaTable", &args, 0, 1, span)?;
    let data = match args.into_iter().next() {
        None | Some(Value::None) => Dict::default(),
        Some(Value::Dict(d)) => d.lock().clone(),
        Some(Value::Table(t)) => t.lock().data.clone(),
        Some(Value::Str(text)) => parse_literal(interp, &text, span)?,
        Some(other) => {
            return Err(interp.raise(
                "TypeError",
                format!("MetaTable() expected a table literal or dict, got {}", other.type_name()),
                span,
            ));
        }
    };
    Ok(Value::Table(Arc::new(Mutex::new(MetaTable { data, meta: None }))))
}

fn parse_literal(interp: &Interpreter, text: &str, span: Span) -> std::result::Result<Dict, Flow> {
    let body = text.trim();
    let body = body.strip_prefix('<').unwrap_or(body);
    let body = body.strip_suffix('>').unwrap_or(body);
    let parsed: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| interp.raise("ValueError", format!("invalid table literal: {e}"), span))?;
    match from_json(parsed) {
        Value::Dict(d) => Ok(d.lock().clone()),
        _ => Err(interp.raise("ValueError", "table literal must be an object", span)),
    }
}

fn from_json(value: serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::None,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => Value::str(s),
        serde_json::Value::Array(items) => Value::list(items.into_iter().map(from_json).collect()),
        serde_json::Value::Object(map) => {
            let mut dict = Dict::default();
            for (k, v) in map {
                dict.insert(Value::str(k), from_json(v));
            }
            Value::dict(dict)
        }
    }
}

fn to_json(interp: &mut Interpreter, value: &Value) -> std::result::Result<serde_json::Value, Flow> {
    use serde_json::Value as Json;
    Ok(match value {
        Value::None => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(n) => Json::from(*n),
        Value::Float(x) => serde_json::Number::from_f64(*x).map_or(Json::Null, Json::Number),
        Value::Str(s) => Json::String(s.to_string()),
        Value::List(items) => {
            let items = items.lock().clone();
            Json::Array(
                items
                    .iter()
                    .map(|item| to_json(interp, item))
                    .collect::<std::result::Result<_, _>>()?,
            )
        }
        Value::Dict(_) | Value::Table(_) => {
            let entries = match value {
                Value::Dict(d) => d.lock().entries.clone(),
                Value::Table(t) => t.lock().data.entries.clone(),
                _ => Vec::new(),
            };
            let mut map = serde_json::Map::new();
            for (k, v) in &entries {
                map.insert(interp.to_str(k)?, to_json(interp, v)?);
            }
            Json::Object(map)
        }
        other => Json::String(interp.to_str(other)?),
    })
}

fn print_json(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    arity(interp, "print_json", &args, 1, 1, span)?;
    let json = to_json(interp, &args[0])?;
    let text = serde_json::to_string_pretty(&json)
        .map_err(|e| interp.raise("ValueError", e.to_string(), span))?;
    interp.print_line(&text);
    Ok(Value::None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_numbers_keep_their_kind() {
        let value = from_json(serde_json::json!({"a": 1, "b": 2.5, "c": [true, null]}));
        let Value::Dict(d) = value else {
            panic!("expected a dict");
        };
        let d = d.lock();
        assert!(matches!(d.get(&Value::str("a")), Some(Value::Int(1))));
        assert!(matches!(d.get(&Value::str("b")), Some(Value::Float(x)) if (x - 2.5).abs() < f64::EPSILON));
        assert!(matches!(d.get(&Value::str("c")), Some(Value::List(_))));
    }
}
