use pretty_assertions::assert_eq;
use ry_ir::{BinaryOp, Span, UnaryOp};

use super::convert::format_float;
use super::Interpreter;
use crate::errors::Flow;
use crate::value::Value;

fn kind_of(flow: Flow) -> String {
    match flow {
        Flow::Raise(raised) => raised.kind,
        other => panic!("expected an exception, got {other:?}"),
    }
}

#[test]
fn floats_always_show_a_fraction() {
    assert_eq!(format_float(1.0), "1.0");
    assert_eq!(format_float(0.1), "0.1");
    assert_eq!(format_float(-2.5), "-2.5");
    assert_eq!(format_float(f64::INFINITY), "inf");
}

#[test]
fn modulo_follows_the_divisor() {
    let mut interp = Interpreter::builder().build();
    let r = interp
        .binary(BinaryOp::Mod, Value::Int(-7), Value::Int(3), Span::DUMMY)
        .unwrap();
    assert!(matches!(r, Value::Int(2)));
    let r = interp
        .binary(BinaryOp::Mod, Value::Int(7), Value::Int(-3), Span::DUMMY)
        .unwrap();
    assert!(matches!(r, Value::Int(-2)));
}

#[test]
fn arithmetic_faults_have_python_kinds() {
    let mut interp = Interpreter::builder().build();
    let err = interp
        .binary(BinaryOp::Div, Value::Int(1), Value::Int(0), Span::DUMMY)
        .unwrap_err();
    assert_eq!(kind_of(err), "ZeroDivisionError");
    let err = interp
        .binary(BinaryOp::Add, Value::Int(i64::MAX), Value::Int(1), Span::DUMMY)
        .unwrap_err();
    assert_eq!(kind_of(err), "OverflowError");
    let err = interp
        .binary(BinaryOp::Add, Value::str("a"), Value::Int(1), Span::DUMMY)
        .unwrap_err();
    assert_eq!(kind_of(err), "TypeError");
    let err = interp
        .unary(UnaryOp::Neg, Value::Int(i64::MIN), Span::DUMMY)
        .unwrap_err();
    assert_eq!(kind_of(err), "OverflowError");
}

#[test]
fn true_division_yields_floats_and_bools_count_as_ints() {
    let mut interp = Interpreter::builder().build();
    let r = interp
        .binary(BinaryOp::Div, Value::Int(7), Value::Int(2), Span::DUMMY)
        .unwrap();
    assert!(matches!(r, Value::Float(x) if (x - 3.5).abs() < f64::EPSILON));
    let r = interp
        .binary(BinaryOp::Add, Value::Bool(true), Value::Int(1), Span::DUMMY)
        .unwrap();
    assert!(matches!(r, Value::Int(2)));
}

#[test]
fn containers_render_like_their_literals() {
    let mut interp = Interpreter::builder().build();
    let list = Value::list(vec![Value::Int(1), Value::str("a"), Value::None, Value::Bool(true)]);
    assert_eq!(interp.to_str(&list).unwrap(), "[1, 'a', None, True]");
    assert_eq!(interp.to_str(&Value::str("plain")).unwrap(), "plain");
}

#[test]
fn raised_exceptions_are_instances_of_their_class() {
    let interp = Interpreter::builder().build();
    let Flow::Raise(raised) = interp.raise("KeyError", "'x'", Span::DUMMY) else {
        panic!("expected an exception");
    };
    let Value::Instance(instance) = &raised.value else {
        panic!("expected an instance");
    };
    assert!(instance.class.is_a("LookupError"));
    assert!(instance.class.is_a("Exception"));
    assert_eq!(raised.message, "'x'");
}
