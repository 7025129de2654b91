//! Methods of the built-in types.

use std::cmp::Ordering;
use std::sync::Arc;

use ry_ir::Span;

use super::string::capitalized;
use super::{arity, int_arg, str_arg};
use crate::errors::Flow;
use crate::interpreter::Interpreter;
use crate::value::{Dict, Value};

type Result = std::result::Result<Value, Flow>;

const STR_METHODS: &[&str] = &[
    "upper",
    "lower",
    "capitalize",
    "strip",
    "split",
    "replace",
    "startswith",
    "endswith",
    "find",
    "count",
    "join",
];

const LIST_METHODS: &[&str] = &[
    "append", "extend", "insert", "pop", "remove", "index", "count", "reverse", "sort", "copy",
    "clear",
];

const DICT_METHODS: &[&str] = &[
    "keys", "values", "items", "get", "pop", "update", "copy", "clear",
];

const TABLE_METHODS: &[&str] = &["set_metatable", "get_metatable", "keys", "values"];

/// The method `name` of `value`'s type, if it has one.
pub(crate) fn lookup(value: &Value, name: &str) -> Option<&'static str> {
    let methods = match value {
        Value::Str(_) => STR_METHODS,
        Value::List(_) => LIST_METHODS,
        Value::Dict(_) => DICT_METHODS,
        Value::Table(_) => TABLE_METHODS,
        _ => return None,
    };
    methods.iter().copied().find(|m| *m == name)
}

pub(crate) fn call(interp: &mut Interpreter, receiver: &Value, name: &str, args: Vec<Value>, span: Span) -> Result {
    match receiver {
        Value::Str(s) => str_method(interp, s, name, args, span),
        Value::List(_) => list_method(interp, receiver, name, args, span),
        Value::Dict(_) => dict_method(interp, receiver, name, args, span),
        Value::Table(_) => table_method(interp, receiver, name, args, span),
        other => Err(interp.raise(
            "AttributeError",
            format!("'{}' object has no attribute '{name}'", other.type_name()),
            span,
        )),
    }
}

fn count(n: usize) -> Value {
    Value::Int(i64::try_from(n).unwrap_or(i64::MAX))
}

fn str_method(interp: &mut Interpreter, s: &Arc<str>, name: &str, args: Vec<Value>, span: Span) -> Result {
    match name {
        "upper" | "lower" | "capitalize" | "strip" => {
            arity(interp, name, &args, 0, 0, span)?;
            Ok(Value::str(match name {
                "upper" => s.to_uppercase(),
                "lower" => s.to_lowercase(),
                "capitalize" => capitalized(s),
                _ => s.trim().to_string(),
            }))
        }
        "split" => {
            arity(interp, name, &args, 0, 1, span)?;
            let parts: Vec<Value> = match args.first() {
                Some(sep) => {
                    let sep = str_arg(interp, name, sep, span)?;
                    if sep.is_empty() {
                        return Err(interp.raise("ValueError", "empty separator", span));
                    }
                    s.split(&*sep).map(Value::str).collect()
                }
                None => s.split_whitespace().map(Value::str).collect(),
            };
            Ok(Value::list(parts))
        }
        "replace" => {
            arity(interp, name, &args, 2, 2, span)?;
            let from = str_arg(interp, name, &args[0], span)?;
            let to = str_arg(interp, name, &args[1], span)?;
            Ok(Value::str(s.replace(&*from, &to)))
        }
        "startswith" | "endswith" | "find" | "count" => {
            arity(interp, name, &args, 1, 1, span)?;
            let needle = str_arg(interp, name, &args[0], span)?;
            Ok(match name {
                "startswith" => Value::Bool(s.starts_with(&*needle)),
                "endswith" => Value::Bool(s.ends_with(&*needle)),
                "count" => count(s.matches(&*needle).count()),
                _ => match s.find(&*needle) {
                    Some(byte) => count(s[..byte].chars().count()),
                    None => Value::Int(-1),
                },
            })
        }
        "join" => {
            arity(interp, name, &args, 1, 1, span)?;
            let mut parts = Vec::new();
            for item in interp.iterate(&args[0], span)? {
                parts.push(interp.to_str(&item)?);
            }
            Ok(Value::str(parts.join(&**s)))
        }
        _ => Err(no_method(interp, "str", name, span)),
    }
}

fn list_method(interp: &mut Interpreter, receiver: &Value, name: &str, args: Vec<Value>, span: Span) -> Result {
    let Value::List(items) = receiver else {
        return Err(no_method(interp, &receiver.type_name(), name, span));
    };
    match name {
        "append" => {
            arity(interp, name, &args, 1, 1, span)?;
            items.lock().extend(args);
            Ok(Value::None)
        }
        "extend" => {
            arity(interp, name, &args, 1, 1, span)?;
            let more = interp.iterate(&args[0], span)?;
            items.lock().extend(more);
            Ok(Value::None)
        }
        "insert" => {
            arity(interp, name, &args, 2, 2, span)?;
            let at = int_arg(interp, name, &args[0], span)?;
            let mut items = items.lock();
            let len = i64::try_from(items.len()).unwrap_or(i64::MAX);
            let at = if at < 0 { (at + len).max(0) } else { at.min(len) };
            items.insert(usize::try_from(at).unwrap_or(0), args[1].clone());
            Ok(Value::None)
        }
        "pop" => {
            arity(interp, name, &args, 0, 1, span)?;
            let mut guard = items.lock();
            if guard.is_empty() {
                drop(guard);
                return Err(interp.raise("IndexError", "pop from empty list", span));
            }
            let len = i64::try_from(guard.len()).unwrap_or(i64::MAX);
            let at = match args.first() {
                Some(i) => i.as_int().unwrap_or(len - 1),
                None => len - 1,
            };
            let at = if at < 0 { at + len } else { at };
            let index = usize::try_from(at).ok().filter(|&i| i < guard.len());
            match index {
                Some(i) => Ok(guard.remove(i)),
                None => {
                    drop(guard);
                    Err(interp.raise("IndexError", "pop index out of range", span))
                }
            }
        }
        "remove" | "index" => {
            arity(interp, name, &args, 1, 1, span)?;
            // Compare against a snapshot; an element may be the list itself.
            let snapshot = items.lock().clone();
            match snapshot.iter().position(|v| v.equals(&args[0])) {
                Some(i) if name == "remove" => {
                    items.lock().remove(i);
                    Ok(Value::None)
                }
                Some(i) => Ok(count(i)),
                None => Err(interp.raise("ValueError", format!("list.{name}(x): x not in list"), span)),
            }
        }
        "count" => {
            arity(interp, name, &args, 1, 1, span)?;
            let snapshot = items.lock().clone();
            Ok(count(snapshot.iter().filter(|v| v.equals(&args[0])).count()))
        }
        "reverse" => {
            arity(interp, name, &args, 0, 0, span)?;
            items.lock().reverse();
            Ok(Value::None)
        }
        "sort" => {
            arity(interp, name, &args, 0, 0, span)?;
            let mut sorted = items.lock().clone();
            sort_values(interp, &mut sorted, span)?;
            *items.lock() = sorted;
            Ok(Value::None)
        }
        "copy" => Ok(Value::list(items.lock().clone())),
        "clear" => {
            items.lock().clear();
            Ok(Value::None)
        }
        _ => Err(no_method(interp, "list", name, span)),
    }
}

fn dict_method(interp: &mut Interpreter, receiver: &Value, name: &str, args: Vec<Value>, span: Span) -> Result {
    let Value::Dict(dict) = receiver else {
        return Err(no_method(interp, &receiver.type_name(), name, span));
    };
    match name {
        "keys" => Ok(Value::list(dict.lock().keys())),
        "values" => Ok(Value::list(
            dict.lock().entries.iter().map(|(_, v)| v.clone()).collect(),
        )),
        "items" => Ok(Value::list(
            dict.lock()
                .entries
                .iter()
                .map(|(k, v)| Value::list(vec![k.clone(), v.clone()]))
                .collect(),
        )),
        "get" => {
            arity(interp, name, &args, 1, 2, span)?;
            let found = dict.lock().get(&args[0]);
            Ok(found.or_else(|| args.get(1).cloned()).unwrap_or(Value::None))
        }
        "pop" => {
            arity(interp, name, &args, 1, 2, span)?;
            let removed = dict.lock().remove(&args[0]);
            match (removed, args.get(1)) {
                (Some(value), _) => Ok(value),
                (None, Some(default)) => Ok(default.clone()),
                (None, None) => {
                    let key = interp.repr(&args[0])?;
                    Err(interp.raise("KeyError", key, span))
                }
            }
        }
        "update" => {
            arity(interp, name, &args, 1, 1, span)?;
            let entries = match &args[0] {
                Value::Dict(other) => other.lock().entries.clone(),
                Value::Table(other) => other.lock().data.entries.clone(),
                other => {
                    return Err(interp.raise(
                        "TypeError",
                        format!("cannot update dict from '{}'", other.type_name()),
                        span,
                    ));
                }
            };
            let mut dict = dict.lock();
            for (k, v) in entries {
                dict.insert(k, v);
            }
            Ok(Value::None)
        }
        "copy" => Ok(Value::dict(dict.lock().clone())),
        "clear" => {
            *dict.lock() = Dict::default();
            Ok(Value::None)
        }
        _ => Err(no_method(interp, "dict", name, span)),
    }
}

fn table_method(interp: &mut Interpreter, receiver: &Value, name: &str, args: Vec<Value>, span: Span) -> Result {
    let Value::Table(table) = receiver else {
        return Err(no_method(interp, &receiver.type_name(), name, span));
    };
    match name {
        "set_metatable" => {
            arity(interp, name, &args, 1, 1, span)?;
            match &args[0] {
                meta @ Value::Dict(_) => {
                    table.lock().meta = Some(meta.clone());
                    Ok(Value::None)
                }
                _ => Err(interp.raise("TypeError", "Metatable must be a dictionary", span)),
            }
        }
        "get_metatable" => Ok(table.lock().meta.clone().unwrap_or(Value::None)),
        "keys" => Ok(Value::list(table.lock().data.keys())),
        "values" => Ok(Value::list(
            table.lock().data.entries.iter().map(|(_, v)| v.clone()).collect(),
        )),
        _ => Err(no_method(interp, "MetaTable", name, span)),
    }
}

#[cold]
fn no_method(interp: &Interpreter, type_name: &str, name: &str, span: Span) -> Flow {
    interp.raise(
        "AttributeError",
        format!("'{type_name}' object has no attribute '{name}'"),
        span,
    )
}

/// Sort numbers or strings in place; mixed kinds raise `TypeError`.
pub(crate) fn sort_values(interp: &Interpreter, items: &mut [Value], span: Span) -> std::result::Result<(), Flow> {
    let all_numbers = items.iter().all(|v| v.as_float().is_some());
    let all_strings = items.iter().all(|v| matches!(v, Value::Str(_)));
    if !all_numbers && !all_strings {
        return Err(interp.raise(
            "TypeError",
            "'<' not supported between these elements",
            span,
        ));
    }
    items.sort_by(|a, b| match (a, b) {
        (Value::Str(x), Value::Str(y)) => x.cmp(y),
        _ => a
            .as_float()
            .zip(b.as_float())
            .and_then(|(x, y)| x.partial_cmp(&y))
            .unwrap_or(Ordering::Equal),
    });
    Ok(())
}
