//! `std.Math`

use ry_ir::Span;

use super::{arity, float_arg, int_arg, number};
use crate::errors::Flow;
use crate::interpreter::Interpreter;
use crate::value::{Builtin, Value};

type Result = std::result::Result<Value, Flow>;

pub(super) static FUNCTIONS: &[Builtin] = &[
    Builtin { name: "sqrt", func: sqrt },
    Builtin { name: "pow", func: pow },
    Builtin { name: "floor", func: floor },
    Builtin { name: "ceil", func: ceil },
    Builtin { name: "sin", func: sin },
    Builtin { name: "cos", func: cos },
    Builtin { name: "fibonacci", func: fibonacci },
    Builtin { name: "factorial", func: factorial },
    Builtin { name: "prime_factors", func: prime_factors },
    Builtin { name: "is_prime", func: is_prime },
    Builtin { name: "gcd", func: gcd },
    Builtin { name: "lcm", func: lcm },
    Builtin { name: "deg_to_rad", func: deg_to_rad },
    Builtin { name: "rad_to_deg", func: rad_to_deg },
];

pub(super) fn constants() -> Vec<(String, Value)> {
    vec![
        ("pi".to_string(), Value::Float(std::f64::consts::PI)),
        ("e".to_string(), Value::Float(std::f64::consts::E)),
    ]
}

fn unary_float(interp: &Interpreter, name: &str, args: &[Value], span: Span) -> std::result::Result<f64, Flow> {
    arity(interp, name, args, 1, 1, span)?;
    float_arg(interp, name, &args[0], span)
}

fn sqrt(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    let x = unary_float(interp, "sqrt", &args, span)?;
    if x < 0.0 {
        return Err(interp.raise("ValueError", "math domain error", span));
    }
    Ok(Value::Float(x.sqrt()))
}

fn pow(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    arity(interp, "pow", &args, 2, 2, span)?;
    if let (Some(base), Some(exp)) = (args[0].as_int(), args[1].as_int()) {
        if let Ok(exp) = u32::try_from(exp) {
            return base
                .checked_pow(exp)
                .map(Value::Int)
                .ok_or_else(|| interp.raise("OverflowError", "integer overflow", span));
        }
    }
    let base = float_arg(interp, "pow", &args[0], span)?;
    let exp = float_arg(interp, "pow", &args[1], span)?;
    Ok(Value::Float(base.powf(exp)))
}

fn floor(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    let x = unary_float(interp, "floor", &args, span)?;
    Ok(number(x.floor()))
}

fn ceil(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    let x = unary_float(interp, "ceil", &args, span)?;
    Ok(number(x.ceil()))
}

fn sin(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    unary_float(interp, "sin", &args, span).map(|x| Value::Float(x.sin()))
}

fn cos(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    unary_float(interp, "cos", &args, span).map(|x| Value::Float(x.cos()))
}

fn unary_int(interp: &Interpreter, name: &str, args: &[Value], span: Span) -> std::result::Result<i64, Flow> {
    arity(interp, name, args, 1, 1, span)?;
    int_arg(interp, name, &args[0], span)
}

fn fibonacci(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    let n = unary_int(interp, "fibonacci", &args, span)?;
    if n <= 0 {
        return Ok(Value::Int(0));
    }
    let (mut a, mut b) = (0i64, 1i64);
    for _ in 1..n {
        let next = a
            .checked_add(b)
            .ok_or_else(|| interp.raise("OverflowError", "integer overflow", span))?;
        a = b;
        b = next;
    }
    Ok(Value::Int(b))
}

fn factorial(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    let n = unary_int(interp, "factorial", &args, span)?;
    if n < 0 {
        return Err(interp.raise("ValueError", "factorial() not defined for negative values", span));
    }
    (1..=n)
        .try_fold(1i64, i64::checked_mul)
        .map(Value::Int)
        .ok_or_else(|| interp.raise("OverflowError", "integer overflow", span))
}

fn prime_factors(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    let mut n = unary_int(interp, "prime_factors", &args, span)?;
    let mut factors = Vec::new();
    let mut d = 2i64;
    while n > 1 {
        while n % d == 0 {
            factors.push(Value::Int(d));
            n /= d;
        }
        d += 1;
        if d.saturating_mul(d) > n {
            if n > 1 {
                factors.push(Value::Int(n));
            }
            break;
        }
    }
    Ok(Value::list(factors))
}

fn is_prime(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    let n = unary_int(interp, "is_prime", &args, span)?;
    if n < 2 {
        return Ok(Value::Bool(false));
    }
    let mut i = 2i64;
    while i.saturating_mul(i) <= n {
        if n % i == 0 {
            return Ok(Value::Bool(false));
        }
        i += 1;
    }
    Ok(Value::Bool(true))
}

/// `None` when the result does not fit, which only happens for `i64::MIN`.
fn gcd_of(mut a: i64, mut b: i64) -> Option<i64> {
    while b != 0 {
        // `i64::MIN % -1` is 0; only the plain operator overflows on it.
        (a, b) = (b, a.wrapping_rem(b));
    }
    a.checked_abs()
}

fn gcd(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    arity(interp, "gcd", &args, 2, 2, span)?;
    let a = int_arg(interp, "gcd", &args[0], span)?;
    let b = int_arg(interp, "gcd", &args[1], span)?;
    gcd_of(a, b)
        .map(Value::Int)
        .ok_or_else(|| interp.raise("OverflowError", "integer overflow", span))
}

fn lcm(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    arity(interp, "lcm", &args, 2, 2, span)?;
    let a = int_arg(interp, "lcm", &args[0], span)?;
    let b = int_arg(interp, "lcm", &args[1], span)?;
    let Some(g) = gcd_of(a, b) else {
        return Err(interp.raise("OverflowError", "integer overflow", span));
    };
    if g == 0 {
        return Ok(Value::Int(0));
    }
    (a / g)
        .checked_mul(b)
        .and_then(i64::checked_abs)
        .map(Value::Int)
        .ok_or_else(|| interp.raise("OverflowError", "integer overflow", span))
}

fn deg_to_rad(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    unary_float(interp, "deg_to_rad", &args, span).map(|x| Value::Float(x.to_radians()))
}

fn rad_to_deg(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    unary_float(interp, "rad_to_deg", &args, span).map(|x| Value::Float(x.to_degrees()))
}
