//! `std.String`

use ry_ir::Span;

use super::{arity, int_arg, str_arg};
use crate::errors::Flow;
use crate::interpreter::Interpreter;
use crate::value::{Builtin, Value};

type Result = std::result::Result<Value, Flow>;

pub(super) static FUNCTIONS: &[Builtin] = &[
    Builtin { name: "trim", func: trim },
    Builtin { name: "to_upper", func: to_upper },
    Builtin { name: "to_lower", func: to_lower },
    Builtin { name: "capitalize", func: capitalize },
    Builtin { name: "reverse", func: reverse },
    Builtin { name: "contains", func: contains },
    Builtin { name: "starts_with", func: starts_with },
    Builtin { name: "ends_with", func: ends_with },
    Builtin { name: "split", func: split },
    Builtin { name: "join", func: join },
    Builtin { name: "replace", func: replace },
    Builtin { name: "count_words", func: count_words },
    Builtin { name: "is_palindrome", func: is_palindrome },
    Builtin { name: "levenshtein_distance", func: levenshtein_distance },
    Builtin { name: "truncate", func: truncate },
    Builtin { name: "slugify", func: slugify },
];

/// Apply `f` to the single string argument of `name`.
fn map_text(
    interp: &Interpreter,
    name: &str,
    args: &[Value],
    span: Span,
    f: impl FnOnce(&str) -> Value,
) -> Result {
    arity(interp, name, args, 1, 1, span)?;
    Ok(f(&str_arg(interp, name, &args[0], span)?))
}

/// Apply `f` to the two string arguments of `name`.
fn map_pair(
    interp: &Interpreter,
    name: &str,
    args: &[Value],
    span: Span,
    f: impl FnOnce(&str, &str) -> Value,
) -> Result {
    arity(interp, name, args, 2, 2, span)?;
    let a = str_arg(interp, name, &args[0], span)?;
    let b = str_arg(interp, name, &args[1], span)?;
    Ok(f(&a, &b))
}

fn trim(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    map_text(interp, "trim", &args, span, |s| Value::str(s.trim()))
}

fn to_upper(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    map_text(interp, "to_upper", &args, span, |s| Value::str(s.to_uppercase()))
}

fn to_lower(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    map_text(interp, "to_lower", &args, span, |s| Value::str(s.to_lowercase()))
}

pub(crate) fn capitalized(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn capitalize(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    map_text(interp, "capitalize", &args, span, |s| Value::str(capitalized(s)))
}

fn reverse(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    map_text(interp, "reverse", &args, span, |s| Value::str(s.chars().rev().collect::<String>()))
}

fn contains(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    map_pair(interp, "contains", &args, span, |s, sub| Value::Bool(s.contains(sub)))
}

fn starts_with(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    map_pair(interp, "starts_with", &args, span, |s, p| Value::Bool(s.starts_with(p)))
}

fn ends_with(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    map_pair(interp, "ends_with", &args, span, |s, p| Value::Bool(s.ends_with(p)))
}

fn split(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    arity(interp, "split", &args, 1, 2, span)?;
    let text = str_arg(interp, "split", &args[0], span)?;
    let delimiter = match args.get(1) {
        Some(d) => str_arg(interp, "split", d, span)?,
        None => " ".into(),
    };
    if delimiter.is_empty() {
        return Err(interp.raise("ValueError", "empty separator", span));
    }
    Ok(Value::list(text.split(&*delimiter).map(Value::str).collect()))
}

fn join(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    arity(interp, "join", &args, 1, 2, span)?;
    let delimiter = match args.get(1) {
        Some(d) => str_arg(interp, "join", d, span)?,
        None => "".into(),
    };
    let mut parts = Vec::new();
    for item in interp.iterate(&args[0], span)? {
        parts.push(interp.to_str(&item)?);
    }
    Ok(Value::str(parts.join(&*delimiter)))
}

fn replace(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    arity(interp, "replace", &args, 3, 3, span)?;
    let text = str_arg(interp, "replace", &args[0], span)?;
    let word = str_arg(interp, "replace", &args[1], span)?;
    let replacement = str_arg(interp, "replace", &args[2], span)?;
    Ok(Value::str(text.replace(&*word, &replacement)))
}

fn count_words(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    map_text(interp, "count_words", &args, span, |s| {
        Value::Int(i64::try_from(s.split_whitespace().count()).unwrap_or(i64::MAX))
    })
}

fn is_palindrome(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    map_text(interp, "is_palindrome", &args, span, |s| {
        let letters: Vec<char> = s
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();
        Value::Bool(letters.iter().eq(letters.iter().rev()))
    })
}

fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.chars().enumerate() {
        let mut current = Vec::with_capacity(b.len() + 1);
        current.push(i + 1);
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            current.push((previous[j + 1] + 1).min(current[j] + 1).min(previous[j] + cost));
        }
        previous = current;
    }
    previous[b.len()]
}

fn levenshtein_distance(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    map_pair(interp, "levenshtein_distance", &args, span, |a, b| {
        Value::Int(i64::try_from(levenshtein(a, b)).unwrap_or(i64::MAX))
    })
}

fn truncate(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    arity(interp, "truncate", &args, 2, 3, span)?;
    let text = str_arg(interp, "truncate", &args[0], span)?;
    let length = usize::try_from(int_arg(interp, "truncate", &args[1], span)?).unwrap_or(0);
    let suffix = match args.get(2) {
        Some(s) => str_arg(interp, "truncate", s, span)?,
        None => "...".into(),
    };
    if text.chars().count() <= length {
        return Ok(Value::Str(text));
    }
    let keep = length.saturating_sub(suffix.chars().count());
    let head: String = text.chars().take(keep).collect();
    Ok(Value::str(format!("{head}{suffix}")))
}

fn slugify(interp: &mut Interpreter, args: Vec<Value>, span: Span) -> Result {
    map_text(interp, "slugify", &args, span, |s| {
        let cleaned: String = s
            .to_lowercase()
            .chars()
            .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '-' || *c == '_')
            .collect();
        let words: Vec<&str> = cleaned
            .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
            .filter(|w| !w.is_empty())
            .collect();
        Value::str(words.join("-"))
    })
}
