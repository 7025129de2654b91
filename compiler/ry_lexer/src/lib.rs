//! Lexer for Ryton using logos.
//!
//! Produces a flat [`TokenList`]. Newlines are not tokens: each token
//! records whether a line break preceded it, which is all the parser needs
//! to keep `f\n(x)` from reading as a call. Foreign-language regions and
//! literal aggregates are single tokens whose text is kept byte-for-byte.

mod lex_error;
mod raw_token;
mod token;

use logos::Logos;
use ry_ir::Span;

use raw_token::RawToken;

pub use lex_error::{LexError, LexErrorKind};
pub use token::{Token, TokenKind, TokenList};

/// Lex source code into a `TokenList`.
pub fn lex(source: &str) -> Result<TokenList, LexError> {
    let Ok(eof_pos) = u32::try_from(source.len()) else {
        return Err(LexError::new(Span::DUMMY, LexErrorKind::TooLarge));
    };

    let mut result = TokenList::default();
    let mut logos = RawToken::lexer(source);
    let mut newline_before = false;

    while let Some(token_result) = logos.next() {
        let span = Span::from_range(logos.span());
        let slice = logos.slice();

        match token_result {
            Ok(RawToken::LineComment) => {}
            Ok(RawToken::Newline) => newline_before = true,
            Ok(RawToken::Semicolon) => {
                return Err(LexError::new(span, LexErrorKind::Semicolon));
            }
            Ok(RawToken::Forbidden) => {
                return Err(LexError::new(
                    span,
                    LexErrorKind::ForbiddenKeyword(slice.to_string()),
                ));
            }
            Ok(raw) => {
                result.push(Token {
                    kind: convert_token(raw, slice),
                    span,
                    newline_before,
                });
                newline_before = false;
            }
            Err(()) => return Err(LexError::new(span, classify_error(slice))),
        }
    }

    result.push(Token {
        kind: TokenKind::Eof,
        span: Span::point(eof_pos),
        newline_before: true,
    });
    Ok(result)
}

#[cold]
fn classify_error(slice: &str) -> LexErrorKind {
    let first = slice.chars().next().unwrap_or('\0');
    match first {
        '"' | '\'' => LexErrorKind::UnterminatedString,
        '#' if slice.ends_with("(start)") => {
            LexErrorKind::UnterminatedForeign(slice[1..slice.len() - "(start)".len()].to_string())
        }
        '<' if slice.starts_with("<{") => LexErrorKind::UnterminatedAggregate,
        c if c.is_ascii_digit() => LexErrorKind::InvalidNumber(slice.to_string()),
        c => LexErrorKind::InvalidChar(c),
    }
}

/// Convert a raw token to a `TokenKind`, decoding literals.
fn convert_token(raw: RawToken, slice: &str) -> TokenKind {
    match raw {
        RawToken::Int(n) => TokenKind::Int(n),
        RawToken::Float(f) => TokenKind::Float(f),
        RawToken::String => TokenKind::Str(unescape(&slice[1..slice.len() - 1])),
        RawToken::Ident => TokenKind::Ident(slice.to_string()),
        RawToken::Foreign => split_foreign(slice),
        RawToken::Aggregate => TokenKind::Aggregate(slice.to_string()),

        RawToken::Func => TokenKind::Func,
        RawToken::Pack => TokenKind::Pack,
        RawToken::Struct => TokenKind::Struct,
        RawToken::Macro => TokenKind::Macro,
        RawToken::StateMachine => TokenKind::StateMachine,
        RawToken::Event => TokenKind::Event,
        RawToken::Parallel => TokenKind::Parallel,
        RawToken::Guard => TokenKind::Guard,
        RawToken::Defer => TokenKind::Defer,
        RawToken::Match => TokenKind::Match,
        RawToken::Case => TokenKind::Case,
        RawToken::If => TokenKind::If,
        RawToken::Elif => TokenKind::Elif,
        RawToken::Else => TokenKind::Else,
        RawToken::While => TokenKind::While,
        RawToken::For => TokenKind::For,
        RawToken::In => TokenKind::In,
        RawToken::Try => TokenKind::Try,
        RawToken::Elerr => TokenKind::Elerr,
        RawToken::As => TokenKind::As,
        RawToken::Finally => TokenKind::Finally,
        RawToken::Return => TokenKind::Return,
        RawToken::Break => TokenKind::Break,
        RawToken::Continue => TokenKind::Continue,
        RawToken::Raise => TokenKind::Raise,
        RawToken::Import => TokenKind::Import,
        RawToken::Clib => TokenKind::Clib,
        RawToken::Private => TokenKind::Private,
        RawToken::Require => TokenKind::Require,
        RawToken::Ensure => TokenKind::Ensure,
        RawToken::This => TokenKind::This,
        RawToken::True => TokenKind::True,
        RawToken::False => TokenKind::False,
        RawToken::None => TokenKind::None,
        RawToken::And => TokenKind::And,
        RawToken::Or => TokenKind::Or,
        RawToken::Not => TokenKind::Not,
        RawToken::Pass => TokenKind::Pass,

        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::Comma => TokenKind::Comma,
        RawToken::DoubleColon => TokenKind::DoubleColon,
        RawToken::Colon => TokenKind::Colon,
        RawToken::DotDotDot => TokenKind::DotDotDot,
        RawToken::DotDot => TokenKind::DotDot,
        RawToken::Dot => TokenKind::Dot,
        RawToken::Arrow => TokenKind::Arrow,
        RawToken::FatArrow => TokenKind::FatArrow,
        RawToken::EqEq => TokenKind::EqEq,
        RawToken::Eq => TokenKind::Eq,
        RawToken::NotEq => TokenKind::NotEq,
        RawToken::Spaceship => TokenKind::Spaceship,
        RawToken::LtEq => TokenKind::LtEq,
        RawToken::Lt => TokenKind::Lt,
        RawToken::GtGt => TokenKind::GtGt,
        RawToken::GtEq => TokenKind::GtEq,
        RawToken::Gt => TokenKind::Gt,
        RawToken::PlusEq => TokenKind::PlusEq,
        RawToken::MinusEq => TokenKind::MinusEq,
        RawToken::StarEq => TokenKind::StarEq,
        RawToken::SlashEq => TokenKind::SlashEq,
        RawToken::Plus => TokenKind::Plus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Star => TokenKind::Star,
        RawToken::Slash => TokenKind::Slash,
        RawToken::Percent => TokenKind::Percent,
        RawToken::PipeGt => TokenKind::PipeGt,
        RawToken::Bang => TokenKind::Bang,

        // Filtered out by `lex` before conversion
        RawToken::LineComment | RawToken::Newline | RawToken::Forbidden | RawToken::Semicolon => {
            TokenKind::Eof
        }
    }
}

/// Split a matched foreign region into language, interior and result name.
fn split_foreign(slice: &str) -> TokenKind {
    let open_end = slice.find("(start)").map_or(0, |p| p + "(start)".len());
    let lang = &slice[1..open_end.saturating_sub("(start)".len()).max(1)];
    let marker = format!("#{lang}(end:");
    let close = slice.rfind(&marker).unwrap_or(slice.len());
    let result = slice
        .get(close + marker.len()..slice.len().saturating_sub(1))
        .unwrap_or("")
        .trim();
    TokenKind::Foreign {
        lang: lang.to_string(),
        code: slice.get(open_end..close).unwrap_or("").to_string(),
        result: result.to_string(),
    }
}

fn unescape(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut chars = content.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other @ ('\\' | '"' | '\'')) => out.push(other),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
