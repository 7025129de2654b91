//! Raw Token Definition
//!
//! The `RawToken` enum is the logos-derived tokenizer output before
//! literal decoding and final token conversion.

use logos::{Lexer, Logos};

/// Raw token from logos (before conversion).
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\f]+")] // Skip horizontal whitespace
pub(crate) enum RawToken {
    #[regex(r"//[^\n]*")]
    LineComment,

    #[token("\n")]
    Newline,

    // Embedded regions, kept verbatim
    #[regex(r"#[A-Za-z][A-Za-z0-9_]*\(start\)", foreign_region)]
    Foreign,
    #[token("<{", aggregate)]
    Aggregate,

    // Reserved words that are rejected outright
    #[token("var")]
    #[token("let")]
    #[token("const")]
    Forbidden,
    #[token(";")]
    Semicolon,

    #[token("func")]
    Func,
    #[token("pack")]
    Pack,
    #[token("struct")]
    Struct,
    #[token("macro")]
    Macro,
    #[token("state_machine")]
    StateMachine,
    #[token("event")]
    Event,
    #[token("parallel")]
    Parallel,
    #[token("guard")]
    Guard,
    #[token("defer")]
    Defer,
    #[token("match")]
    Match,
    #[token("case")]
    Case,
    #[token("if")]
    If,
    #[token("elif")]
    Elif,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("for")]
    For,
    #[token("in")]
    In,
    #[token("try")]
    Try,
    #[token("elerr")]
    Elerr,
    #[token("as")]
    As,
    #[token("finally")]
    Finally,
    #[token("return")]
    Return,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("raise")]
    Raise,
    #[token("import")]
    Import,
    #[token("clib")]
    Clib,
    #[token("private")]
    Private,
    #[token("require")]
    Require,
    #[token("ensure")]
    Ensure,
    #[token("this")]
    This,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("None")]
    None,
    #[token("and")]
    And,
    #[token("or")]
    Or,
    #[token("not")]
    Not,
    #[token("pass")]
    Pass,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token("::")]
    DoubleColon,
    #[token(":")]
    Colon,
    #[token("...")]
    DotDotDot,
    #[token("..")]
    DotDot,
    #[token(".")]
    Dot,
    #[token("->")]
    Arrow,
    #[token("=>")]
    FatArrow,
    #[token("==")]
    EqEq,
    #[token("=")]
    Eq,
    #[token("!=")]
    NotEq,
    #[token("<=>")]
    Spaceship,
    #[token("<=")]
    LtEq,
    #[token("<")]
    Lt,
    #[token(">>")]
    GtGt,
    #[token(">=")]
    GtEq,
    #[token(">")]
    Gt,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("|>")]
    PipeGt,
    #[token("!")]
    Bang,

    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Int(i64),

    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Float(f64),

    // No unescaped newlines inside either quote style
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    #[regex(r"'([^'\\\n]|\\.)*'")]
    String,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,
}

/// Extend a `#Lang(start)` opener through its `#Lang(end: name)` marker.
///
/// Fails without consuming anything when the end marker is missing, so the
/// error points at the opener.
fn foreign_region(lex: &mut Lexer<'_, RawToken>) -> bool {
    let opener = lex.slice();
    let lang = &opener[1..opener.len() - "(start)".len()];
    let marker = format!("#{lang}(end:");
    let rest = lex.remainder();
    let Some(pos) = rest.find(&marker) else {
        return false;
    };
    let after = &rest[pos + marker.len()..];
    let Some(close) = after.find(')') else {
        return false;
    };
    if !is_identifier(after[..close].trim()) {
        return false;
    }
    lex.bump(pos + marker.len() + close + 1);
    true
}

/// Extend a `<{` opener through the matching `}>`.
///
/// Braces inside double-quoted strings do not count.
fn aggregate(lex: &mut Lexer<'_, RawToken>) -> bool {
    let rest = lex.remainder().as_bytes();
    let mut depth = 1usize;
    let mut in_string = false;
    let mut i = 0;
    while i < rest.len() {
        let b = rest[i];
        if in_string {
            match b {
                b'\\' => i += 1,
                b'"' => in_string = false,
                _ => {}
            }
        } else {
            match b {
                b'"' => in_string = true,
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        if rest.get(i + 1) == Some(&b'>') {
                            lex.bump(i + 2);
                            return true;
                        }
                        return false;
                    }
                }
                _ => {}
            }
        }
        i += 1;
    }
    false
}

pub(crate) fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
