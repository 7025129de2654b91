//! `std.Time`

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use ry_ir::Span;

use super::{arity, float_arg};
use crate::errors::Flow;
use crate::interpreter::Interpreter;
use crate::value::{Builtin, Value};

type Result = std::result::Result<Value, Flow>;

pub(super) static FUNCTIONS: &[Builtin] = &[
    Builtin { name: "now", func: now },
    Builtin { name: "ticks_ms", func: ticks_ms },
    Builtin { name: "sleep", func: sleep },
];

/// Seconds since the Unix epoch.
fn now(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    arity(interp, "now", &args, 0, 0, span)?;
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0);
    Ok(Value::Float(secs))
}

/// Milliseconds since the interpreter started.
fn ticks_ms(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    arity(interp, "ticks_ms", &args, 0, 0, span)?;
    Ok(Value::Int(i64::try_from(interp.elapsed().as_millis()).unwrap_or(i64::MAX)))
}

/// Watches keep being polled while the program sleeps.
fn sleep(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    arity(interp, "sleep", &args, 1, 1, span)?;
    let secs = float_arg(interp, "sleep", &args[0], span)?;
    let duration = Duration::try_from_secs_f64(secs)
        .map_err(|_| interp.raise("ValueError", "sleep length must be non-negative", span))?;
    interp.sleep(duration)?;
    Ok(Value::None)
}
