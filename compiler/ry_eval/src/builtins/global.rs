//! Functions available without an import, and the `std.lib` basics.

use std::sync::Arc;

use ry_ir::{BinaryOp, Span};

use super::methods::sort_values;
use super::{arity, float_arg, int_arg};
use crate::errors::Flow;
use crate::interpreter::Interpreter;
use crate::value::{Builtin, Dict, Value};

type Result = std::result::Result<Value, Flow>;

pub(super) static GLOBALS: &[Builtin] = &[
    Builtin { name: "print", func: print },
    Builtin { name: "len", func: len },
    Builtin { name: "str", func: str },
    Builtin { name: "repr", func: repr },
    Builtin { name: "int", func: int },
    Builtin { name: "float", func: float },
    Builtin { name: "bool", func: bool },
    Builtin { name: "range", func: range },
    Builtin { name: "type", func: type_of },
    Builtin { name: "isinstance", func: isinstance },
    Builtin { name: "abs", func: abs },
    Builtin { name: "min", func: min },
    Builtin { name: "max", func: max },
    Builtin { name: "sum", func: sum },
    Builtin { name: "round", func: round },
    Builtin { name: "list", func: list },
    Builtin { name: "dict", func: dict },
    Builtin { name: "sorted", func: sorted },
    Builtin { name: "enumerate", func: enumerate },
];

pub(super) static LIB: &[Builtin] = &[
    Builtin { name: "print", func: print },
    Builtin { name: "len", func: len },
    Builtin { name: "str", func: str },
    Builtin { name: "int", func: int },
    Builtin { name: "float", func: float },
    Builtin { name: "range", func: range },
    Builtin { name: "type", func: type_of },
    Builtin { name: "print_list", func: print_list },
    Builtin { name: "print_dict", func: print_dict },
];

fn print(interp: &mut Interpreter, args: Vec<Value>, _span: Span) -> Result {
    let parts = args
        .iter()
        .map(|arg| interp.to_str(arg))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    interp.print_line(&parts.join(" "));
    Ok(Value::None)
}

fn len(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    arity(interp, "len", &args, 1, 1, span)?;
    let n = match &args[0] {
        Value::Str(s) => s.chars().count(),
        Value::List(items) => items.lock().len(),
        Value::Dict(d) => d.lock().len(),
        Value::Range { start, end } => usize::try_from(end.saturating_sub(*start)).unwrap_or(0),
        Value::Table(table) => {
            let (handler, n) = {
                let table = table.lock();
                (table.handler("__len"), table.data.len())
            };
            if let Some(handler) = handler {
                return interp.call_value(handler, vec![args[0].clone()], span);
            }
            n
        }
        other => {
            return Err(interp.raise(
                "TypeError",
                format!("object of type '{}' has no len()", other.type_name()),
                span,
            ));
        }
    };
    Ok(Value::Int(i64::try_from(n).unwrap_or(i64::MAX)))
}

fn str(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    arity(interp, "str", &args, 0, 1, span)?;
    match args.first() {
        Some(value) => Ok(Value::str(interp.to_str(value)?)),
        None => Ok(Value::str("")),
    }
}

fn repr(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    arity(interp, "repr", &args, 1, 1, span)?;
    Ok(Value::str(interp.repr(&args[0])?))
}

#[expect(clippy::cast_possible_truncation, reason = "range checked before casting")]
fn int(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    arity(interp, "int", &args, 0, 1, span)?;
    let Some(value) = args.first() else {
        return Ok(Value::Int(0));
    };
    match value {
        Value::Int(_) | Value::Bool(_) => Ok(Value::Int(value.as_int().unwrap_or(0))),
        Value::Float(x) if x.is_finite() && x.abs() < 9.2e18 => Ok(Value::Int(x.trunc() as i64)),
        Value::Float(_) => Err(interp.raise("OverflowError", "cannot convert float to integer", span)),
        Value::Str(s) => s.trim().parse().map(Value::Int).map_err(|_| {
            interp.raise(
                "ValueError",
                format!("invalid literal for int() with base 10: '{s}'"),
                span,
            )
        }),
        other => Err(interp.raise(
            "TypeError",
            format!("int() argument must be a string or a number, not '{}'", other.type_name()),
            span,
        )),
    }
}

fn float(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    arity(interp, "float", &args, 0, 1, span)?;
    let Some(value) = args.first() else {
        return Ok(Value::Float(0.0));
    };
    match value {
        Value::Str(s) => s.trim().parse().map(Value::Float).map_err(|_| {
            interp.raise(
                "ValueError",
                format!("could not convert string to float: '{s}'"),
                span,
            )
        }),
        other => float_arg(interp, "float", other, span).map(Value::Float),
    }
}

fn bool(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    arity(interp, "bool", &args, 0, 1, span)?;
    Ok(Value::Bool(args.first().is_some_and(Value::is_truthy)))
}

fn range(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    arity(interp, "range", &args, 1, 3, span)?;
    let bounds = args
        .iter()
        .map(|arg| int_arg(interp, "range", arg, span))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    match bounds[..] {
        [end] => Ok(Value::Range { start: 0, end }),
        [start, end] => Ok(Value::Range { start, end }),
        [start, end, step] => {
            if step == 0 {
                return Err(interp.raise("ValueError", "range() arg 3 must not be zero", span));
            }
            let mut items = Vec::new();
            let mut i = start;
            while (step > 0 && i < end) || (step < 0 && i > end) {
                items.push(Value::Int(i));
                let Some(next) = i.checked_add(step) else {
                    break;
                };
                i = next;
            }
            Ok(Value::list(items))
        }
        _ => Ok(Value::None),
    }
}

fn type_of(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    arity(interp, "type", &args, 1, 1, span)?;
    Ok(match &args[0] {
        Value::Instance(instance) => Value::Class(Arc::clone(&instance.class)),
        other => Value::str(other.type_name()),
    })
}

fn isinstance(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    arity(interp, "isinstance", &args, 2, 2, span)?;
    let matched = match &args[1] {
        Value::List(types) => {
            let types = types.lock().clone();
            types.iter().any(|t| is_instance(&args[0], t))
        }
        single => is_instance(&args[0], single),
    };
    Ok(Value::Bool(matched))
}

fn is_instance(value: &Value, ty: &Value) -> bool {
    match ty {
        Value::Class(class) => match value {
            Value::Instance(instance) => instance.class.is_a(&class.name),
            _ => false,
        },
        Value::Builtin(builtin) => matches!(
            (builtin.name, value),
            ("int", Value::Int(_) | Value::Bool(_))
                | ("float", Value::Float(_))
                | ("str", Value::Str(_))
                | ("bool", Value::Bool(_))
                | ("list", Value::List(_))
                | ("dict", Value::Dict(_))
                | ("range", Value::Range { .. })
                | ("MetaTable", Value::Table(_))
        ),
        _ => false,
    }
}

fn abs(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    arity(interp, "abs", &args, 1, 1, span)?;
    match &args[0] {
        Value::Float(x) => Ok(Value::Float(x.abs())),
        other => {
            let n = int_arg(interp, "abs", other, span)?;
            n.checked_abs()
                .map(Value::Int)
                .ok_or_else(|| interp.raise("OverflowError", "integer overflow", span))
        }
    }
}

/// Items of a single iterable argument, or the arguments themselves.
fn candidates(interp: &Interpreter, name: &str, args: Vec<Value>, span: Span) -> std::result::Result<Vec<Value>, Flow> {
    let items = match <[Value; 1]>::try_from(args) {
        Ok([single]) => interp.iterate(&single, span)?,
        Err(args) => args,
    };
    if items.is_empty() {
        return Err(interp.raise("ValueError", format!("{name}() arg is an empty sequence"), span));
    }
    Ok(items)
}

fn extreme(interp: &mut Interpreter, name: &str, args: Vec<Value>, span: Span, op: BinaryOp) -> Result {
    let mut items = candidates(interp, name, args, span)?.into_iter();
    let Some(mut best) = items.next() else {
        return Ok(Value::None);
    };
    for item in items {
        if interp.binary(op, item.clone(), best.clone(), span)?.is_truthy() {
            best = item;
        }
    }
    Ok(best)
}

fn min(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    extreme(interp, "min", args, span, BinaryOp::Lt)
}

fn max(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    extreme(interp, "max", args, span, BinaryOp::Gt)
}

fn sum(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    arity(interp, "sum", &args, 1, 2, span)?;
    let mut total = args.get(1).cloned().unwrap_or(Value::Int(0));
    for item in interp.iterate(&args[0], span)? {
        total = interp.binary(BinaryOp::Add, total, item, span)?;
    }
    Ok(total)
}

#[expect(clippy::cast_possible_truncation, reason = "range checked before casting")]
fn round(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    arity(interp, "round", &args, 1, 2, span)?;
    if let Value::Int(_) | Value::Bool(_) = &args[0] {
        return Ok(Value::Int(args[0].as_int().unwrap_or(0)));
    }
    let x = float_arg(interp, "round", &args[0], span)?;
    match args.get(1) {
        Some(digits) => {
            let digits = int_arg(interp, "round", digits, span)?;
            let scale = 10f64.powi(i32::try_from(digits).unwrap_or(0));
            Ok(Value::Float((x * scale).round_ties_even() / scale))
        }
        None => {
            let rounded = x.round_ties_even();
            if !rounded.is_finite() || rounded.abs() >= 9.2e18 {
                return Err(interp.raise("OverflowError", "cannot convert float to integer", span));
            }
            Ok(Value::Int(rounded as i64))
        }
    }
}

fn list(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    arity(interp, "list", &args, 0, 1, span)?;
    match args.first() {
        Some(iterable) => Ok(Value::list(interp.iterate(iterable, span)?)),
        None => Ok(Value::list(Vec::new())),
    }
}

fn dict(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    arity(interp, "dict", &args, 0, 1, span)?;
    match args.first() {
        None => Ok(Value::dict(Dict::default())),
        Some(Value::Dict(d)) => Ok(Value::dict(d.lock().clone())),
        Some(Value::Table(t)) => Ok(Value::dict(t.lock().data.clone())),
        Some(other) => Err(interp.raise(
            "TypeError",
            format!("cannot convert '{}' to dict", other.type_name()),
            span,
        )),
    }
}

fn sorted(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    arity(interp, "sorted", &args, 1, 1, span)?;
    let mut items = interp.iterate(&args[0], span)?;
    sort_values(interp, &mut items, span)?;
    Ok(Value::list(items))
}

fn enumerate(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    arity(interp, "enumerate", &args, 1, 1, span)?;
    let items = interp.iterate(&args[0], span)?;
    Ok(Value::list(
        (0..)
            .zip(items)
            .map(|(i, item)| Value::list(vec![Value::Int(i), item]))
            .collect(),
    ))
}

fn print_list(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    arity(interp, "print_list", &args, 1, 2, span)?;
    let indent = indent_arg(interp, &args, span)?;
    print_items(interp, &args[0], indent, span)?;
    Ok(Value::None)
}

fn print_dict(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    arity(interp, "print_dict", &args, 1, 2, span)?;
    let indent = indent_arg(interp, &args, span)?;
    print_entries(interp, &args[0], indent, span)?;
    Ok(Value::None)
}

fn indent_arg(interp: &Interpreter, args: &[Value], span: Span) -> std::result::Result<usize, Flow> {
    match args.get(1) {
        Some(v) => Ok(usize::try_from(int_arg(interp, "indent", v, span)?).unwrap_or(0)),
        None => Ok(0),
    }
}

fn print_items(interp: &mut Interpreter, list: &Value, indent: usize, span: Span) -> std::result::Result<(), Flow> {
    for item in interp.iterate(list, span)? {
        match &item {
            Value::Dict(_) => print_entries(interp, &item, indent, span)?,
            Value::List(_) => print_items(interp, &item, indent + 2, span)?,
            other => {
                let text = interp.to_str(other)?;
                interp.print_line(&format!("{}{text}", " ".repeat(indent)));
            }
        }
    }
    Ok(())
}

fn print_entries(interp: &mut Interpreter, dict: &Value, indent: usize, span: Span) -> std::result::Result<(), Flow> {
    let Value::Dict(d) = dict else {
        return Err(interp.raise("TypeError", "print_dict() expected a dict", span));
    };
    let entries = d.lock().entries.clone();
    for (key, value) in entries {
        let key = interp.to_str(&key)?;
        if let Value::Dict(_) = value {
            interp.print_line(&format!("{}{key}:", " ".repeat(indent)));
            print_entries(interp, &value, indent + 4, span)?;
        } else {
            let value = interp.to_str(&value)?;
            interp.print_line(&format!("{}{key}: {value}", " ".repeat(indent)));
        }
    }
    Ok(())
}
