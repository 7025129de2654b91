//! Built-in functions, exception classes and host modules.

mod global;
mod math;
mod memory;
pub(crate) mod methods;
mod string;
mod table;
mod time;

use std::sync::Arc;

use rustc_hash::FxHashMap;
use ry_ir::Span;

use crate::environment::Env;
use crate::errors::Flow;
use crate::interpreter::Interpreter;
use crate::value::{Builtin, Class, Module, Value};

/// Host modules an import may resolve to.
pub(crate) const HOST_MODULES: &[&str] = &[
    "std",
    "std.lib",
    "std.Math",
    "std.String",
    "std.Time",
    "std.Memory",
];

/// Exception classes and their bases, parents before children.
const EXCEPTIONS: &[(&str, Option<&str>)] = &[
    ("Exception", None),
    ("RuntimeError", Some("Exception")),
    ("TypeError", Some("Exception")),
    ("ValueError", Some("Exception")),
    ("NameError", Some("Exception")),
    ("AttributeError", Some("Exception")),
    ("ImportError", Some("Exception")),
    ("ArithmeticError", Some("Exception")),
    ("ZeroDivisionError", Some("ArithmeticError")),
    ("OverflowError", Some("ArithmeticError")),
    ("LookupError", Some("Exception")),
    ("KeyError", Some("LookupError")),
    ("IndexError", Some("LookupError")),
    ("RecursionError", Some("RuntimeError")),
    ("MemoryError", Some("Exception")),
    ("BridgeError", Some("Exception")),
    ("ContractError", Some("Exception")),
    ("StateError", Some("Exception")),
    ("MatchError", Some("Exception")),
];

pub(crate) fn exception_classes() -> FxHashMap<&'static str, Arc<Class>> {
    let mut classes: FxHashMap<&'static str, Arc<Class>> = FxHashMap::default();
    for &(name, base) in EXCEPTIONS {
        let base = base.and_then(|b| classes.get(b).cloned());
        classes.insert(name, Arc::new(Class::new(name, base)));
    }
    classes
}

pub(crate) fn install_globals(env: &Env, exceptions: &FxHashMap<&'static str, Arc<Class>>) {
    for builtin in global::GLOBALS.iter().chain(table::GLOBALS) {
        env.set(builtin.name, Value::Builtin(builtin));
    }
    for (name, class) in exceptions {
        env.set(*name, Value::Class(Arc::clone(class)));
    }
}

pub(crate) fn host_modules() -> FxHashMap<&'static str, Value> {
    let lib = module("std.lib", global::LIB.iter().chain(table::LIB), Vec::new());
    let math = module("std.Math", math::FUNCTIONS, math::constants());
    let string = module("std.String", string::FUNCTIONS, Vec::new());
    let time = module("std.Time", time::FUNCTIONS, Vec::new());
    let memory = module("std.Memory", memory::FUNCTIONS, Vec::new());

    let mut std_members = match &lib {
        Value::Module(m) => m.members.clone(),
        _ => Vec::new(),
    };
    for (name, value) in [
        ("lib", &lib),
        ("Math", &math),
        ("String", &string),
        ("Time", &time),
        ("Memory", &memory),
    ] {
        std_members.push((name.to_string(), value.clone()));
    }
    let std = Value::Module(Arc::new(Module {
        name: "std".to_string(),
        members: std_members,
        native: false,
    }));

    let mut modules = FxHashMap::default();
    modules.insert("std", std);
    modules.insert("std.lib", lib);
    modules.insert("std.Math", math);
    modules.insert("std.String", string);
    modules.insert("std.Time", time);
    modules.insert("std.Memory", memory);
    modules
}

fn module(
    name: &str,
    functions: impl IntoIterator<Item = &'static Builtin>,
    constants: Vec<(String, Value)>,
) -> Value {
    let mut members: Vec<(String, Value)> = functions
        .into_iter()
        .map(|b| (b.name.to_string(), Value::Builtin(b)))
        .collect();
    members.extend(constants);
    Value::Module(Arc::new(Module {
        name: name.to_string(),
        members,
        native: false,
    }))
}

// Argument helpers shared by the built-in modules.

pub(crate) fn arity(
    interp: &Interpreter,
    name: &str,
    args: &[Value],
    min: usize,
    max: usize,
    span: Span,
) -> Result<(), Flow> {
    if (min..=max).contains(&args.len()) {
        return Ok(());
    }
    let expected = if min == max {
        min.to_string()
    } else {
        format!("{min} to {max}")
    };
    Err(interp.raise(
        "TypeError",
        format!("{name}() takes {expected} argument(s) but {} were given", args.len()),
        span,
    ))
}

pub(crate) fn int_arg(interp: &Interpreter, name: &str, value: &Value, span: Span) -> Result<i64, Flow> {
    value.as_int().ok_or_else(|| {
        interp.raise(
            "TypeError",
            format!("{name}() expected an integer, got {}", value.type_name()),
            span,
        )
    })
}

pub(crate) fn float_arg(interp: &Interpreter, name: &str, value: &Value, span: Span) -> Result<f64, Flow> {
    value.as_float().ok_or_else(|| {
        interp.raise(
            "TypeError",
            format!("{name}() expected a number, got {}", value.type_name()),
            span,
        )
    })
}

pub(crate) fn str_arg(interp: &Interpreter, name: &str, value: &Value, span: Span) -> Result<Arc<str>, Flow> {
    match value {
        Value::Str(s) => Ok(Arc::clone(s)),
        other => Err(interp.raise(
            "TypeError",
            format!("{name}() expected a string, got {}", other.type_name()),
            span,
        )),
    }
}

/// Whole floats are shown as ints by the numeric helpers.
#[expect(clippy::cast_possible_truncation, reason = "only whole values in i64 range")]
pub(crate) fn number(x: f64) -> Value {
    if x.fract() == 0.0 && x.abs() < 9.0e15 {
        Value::Int(x as i64)
    } else {
        Value::Float(x)
    }
}
