//! `std.Memory`: the program's view of the memory runtime.

use ry_ir::Span;

use super::{arity, str_arg};
use crate::errors::Flow;
use crate::interpreter::Interpreter;
use crate::value::{Builtin, Dict, Value};

type Result = std::result::Result<Value, Flow>;

pub(super) static FUNCTIONS: &[Builtin] = &[
    Builtin { name: "stats", func: stats },
    Builtin { name: "collect", func: collect },
    Builtin { name: "store", func: store },
    Builtin { name: "load", func: load },
    Builtin { name: "free", func: free },
    Builtin { name: "usage", func: usage },
    Builtin { name: "count", func: count },
];

fn int(n: usize) -> Value {
    Value::Int(i64::try_from(n).unwrap_or(i64::MAX))
}

fn stats(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    arity(interp, "stats", &args, 0, 0, span)?;
    let stats = interp.memory().stats();
    let mut dict = Dict::default();
    for (key, value) in [
        ("algorithm", Value::str(stats.algorithm.name())),
        ("heap_size", int(stats.heap_size)),
        ("threshold", int(stats.threshold)),
        ("total_allocated", int(stats.total_allocated)),
        ("objects_count", int(stats.objects_count)),
        ("collections", int(stats.collections)),
        ("last_reclaimed", int(stats.last_reclaimed)),
        ("named_objects", int(stats.named_objects)),
        ("named_bytes", int(stats.named_bytes)),
    ] {
        dict.insert(Value::str(key), value);
    }
    Ok(Value::dict(dict))
}

/// Force a full collection; returns how many objects were reclaimed.
fn collect(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    arity(interp, "collect", &args, 0, 0, span)?;
    Ok(int(interp.memory().collect().len()))
}

fn store(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    arity(interp, "store", &args, 2, 2, span)?;
    let name = str_arg(interp, "store", &args[0], span)?;
    let value = args[1].clone();
    let size = value.approximate_size();
    // The replaced value is dropped here, outside the table lock.
    drop(interp.memory().store(name.to_string(), value, size));
    Ok(Value::None)
}

fn load(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    arity(interp, "load", &args, 1, 1, span)?;
    let name = str_arg(interp, "load", &args[0], span)?;
    Ok(interp.memory().load(&name).unwrap_or(Value::None))
}

fn free(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    arity(interp, "free", &args, 1, 1, span)?;
    let name = str_arg(interp, "free", &args[0], span)?;
    let freed = interp.memory().free_object(&name);
    freed
        .map(|_| Value::None)
        .map_err(|e| interp.raise("MemoryError", e.to_string(), span))
}

/// Bytes in use on the collected heap and in the object table.
fn usage(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    arity(interp, "usage", &args, 0, 0, span)?;
    let stats = interp.memory().stats();
    Ok(int(stats.total_allocated + stats.named_bytes))
}

fn count(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    arity(interp, "count", &args, 0, 0, span)?;
    let stats = interp.memory().stats();
    Ok(int(stats.objects_count + stats.named_objects))
}
