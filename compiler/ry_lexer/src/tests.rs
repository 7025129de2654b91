use pretty_assertions::assert_eq;

use super::*;

fn kinds(source: &str) -> Vec<TokenKind> {
    lex(source).unwrap().iter().map(|t| t.kind.clone()).collect()
}

fn err(source: &str) -> LexErrorKind {
    lex(source).unwrap_err().kind
}

#[test]
fn assignment_and_call() {
    assert_eq!(
        kinds("x = add(1, 2.5)"),
        vec![
            TokenKind::Ident("x".into()),
            TokenKind::Eq,
            TokenKind::Ident("add".into()),
            TokenKind::LParen,
            TokenKind::Int(1),
            TokenKind::Comma,
            TokenKind::Float(2.5),
            TokenKind::RParen,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn keywords_win_over_identifiers_only_on_exact_match() {
    assert_eq!(
        kinds("func funcs in int"),
        vec![
            TokenKind::Func,
            TokenKind::Ident("funcs".into()),
            TokenKind::In,
            TokenKind::Ident("int".into()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn multi_char_operators() {
    assert_eq!(
        kinds("a <=> b |> f >> g ... .. :: -> =>"),
        vec![
            TokenKind::Ident("a".into()),
            TokenKind::Spaceship,
            TokenKind::Ident("b".into()),
            TokenKind::PipeGt,
            TokenKind::Ident("f".into()),
            TokenKind::GtGt,
            TokenKind::Ident("g".into()),
            TokenKind::DotDotDot,
            TokenKind::DotDot,
            TokenKind::DoubleColon,
            TokenKind::Arrow,
            TokenKind::FatArrow,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn ranges_do_not_lex_as_floats() {
    assert_eq!(
        kinds("1..5"),
        vec![TokenKind::Int(1), TokenKind::DotDot, TokenKind::Int(5), TokenKind::Eof]
    );
}

#[test]
fn comments_are_dropped_and_newlines_flagged() {
    let tokens = lex("a // note\n(b)").unwrap();
    let slice = tokens.as_slice();
    assert_eq!(slice[0].kind, TokenKind::Ident("a".into()));
    assert!(!slice[0].newline_before);
    assert_eq!(slice[1].kind, TokenKind::LParen);
    assert!(slice[1].newline_before);
}

#[test]
fn string_escapes_and_braces() {
    assert_eq!(
        kinds(r#"print("a{b}\n", 'it\'s')"#),
        vec![
            TokenKind::Ident("print".into()),
            TokenKind::LParen,
            TokenKind::Str("a{b}\n".into()),
            TokenKind::Comma,
            TokenKind::Str("it's".into()),
            TokenKind::RParen,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn foreign_region_is_verbatim() {
    let interior = "\nx = {1: 2}; y = \"}\"\n  z = x  \n";
    let source = format!("#Python(start){interior}#Python(end: z)\nprint(z)");
    let tokens = lex(&source).unwrap();
    assert_eq!(
        tokens.as_slice()[0].kind,
        TokenKind::Foreign {
            lang: "Python".into(),
            code: interior.into(),
            result: "z".into(),
        }
    );
    assert_eq!(tokens.as_slice()[1].kind, TokenKind::Ident("print".into()));
    assert!(tokens.as_slice()[1].newline_before);
}

#[test]
fn foreign_region_without_end_marker() {
    assert_eq!(
        err("#Rust(start)\nfn main() {}\n"),
        LexErrorKind::UnterminatedForeign("Rust".into())
    );
}

#[test]
fn aggregate_skips_braces_in_strings() {
    let text = r#"<{ "a": {"b": "}>"}, "c": 1 }>"#;
    let source = format!("table t {text}");
    let tokens = lex(&source).unwrap();
    assert_eq!(tokens.as_slice()[2].kind, TokenKind::Aggregate(text.into()));
    assert_eq!(tokens.as_slice()[3].kind, TokenKind::Eof);
}

#[test]
fn unterminated_aggregate() {
    assert_eq!(err("t = <{ \"a\": 1 }"), LexErrorKind::UnterminatedAggregate);
}

#[test]
fn rejects_semicolons_and_forbidden_keywords() {
    assert_eq!(err("x = 1;"), LexErrorKind::Semicolon);
    assert_eq!(err("let x = 1"), LexErrorKind::ForbiddenKeyword("let".into()));
    assert_eq!(err("const y = 2"), LexErrorKind::ForbiddenKeyword("const".into()));
    // Only whole words are forbidden
    assert!(lex("variable = 1").is_ok());
}

#[test]
fn error_spans_point_at_offender() {
    let e = lex("x = 1\ny = \"open").unwrap_err();
    assert_eq!(e.kind, LexErrorKind::UnterminatedString);
    assert_eq!(e.span.start, 10);
    assert_eq!(err("a $ b"), LexErrorKind::InvalidChar('$'));
    assert!(matches!(err("x = 99999999999999999999"), LexErrorKind::InvalidNumber(_)));
}

#[test]
fn fingerprint_ignores_layout() {
    let a = "func main() {\n    x = 1 + 2\n    print(x)\n}\n";
    let b = "func main()   {\n\n\tx=1+2 // sum\n  print( x )\n}";
    let ta = lex(a).unwrap();
    let tb = lex(b).unwrap();
    assert_eq!(ta.fingerprint(a), tb.fingerprint(b));
}

#[test]
fn fingerprint_sees_content_and_call_breaks() {
    let a = "x = f(1)";
    let b = "x = f(2)";
    let c = "x = f\n(1)";
    let fa = lex(a).unwrap().fingerprint(a);
    assert_ne!(fa, lex(b).unwrap().fingerprint(b));
    assert_ne!(fa, lex(c).unwrap().fingerprint(c));
}

#[test]
fn fingerprint_sees_statement_breaks() {
    let joined = "return 1";
    let split = "return\n1";
    assert_ne!(
        lex(joined).unwrap().fingerprint(joined),
        lex(split).unwrap().fingerprint(split)
    );
    let two = "x = 1\ny = 2";
    let one_line = "x = 1 y = 2";
    assert_ne!(
        lex(two).unwrap().fingerprint(two),
        lex(one_line).unwrap().fingerprint(one_line)
    );
}
