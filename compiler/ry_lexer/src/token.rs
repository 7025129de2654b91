//! Tokens handed to the parser.

use std::fmt;
use std::hash::Hasher;

use rustc_hash::FxHasher;
use ry_ir::{ContentHash, Span};

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    Int(i64),
    Float(f64),
    /// Decoded string literal.
    Str(String),
    Ident(String),
    /// `#Lang(start) ... #Lang(end: result)`; `code` is the exact interior.
    Foreign {
        lang: String,
        code: String,
        result: String,
    },
    /// `<{ ... }>`, exact text including the delimiters.
    Aggregate(String),

    // Keywords
    Func,
    Pack,
    Struct,
    Macro,
    StateMachine,
    Event,
    Parallel,
    Guard,
    Defer,
    Match,
    Case,
    If,
    Elif,
    Else,
    While,
    For,
    In,
    Try,
    Elerr,
    As,
    Finally,
    Return,
    Break,
    Continue,
    Raise,
    Import,
    Clib,
    Private,
    Require,
    Ensure,
    This,
    True,
    False,
    None,
    And,
    Or,
    Not,
    Pass,

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    DoubleColon,
    Colon,
    DotDotDot,
    DotDot,
    Dot,
    Arrow,
    FatArrow,
    EqEq,
    Eq,
    NotEq,
    Spaceship,
    LtEq,
    Lt,
    GtGt,
    GtEq,
    Gt,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    PipeGt,
    Bang,

    Eof,
}

impl TokenKind {
    /// The identifier text, if this is an identifier.
    pub fn ident(&self) -> Option<&str> {
        match self {
            TokenKind::Ident(name) => Some(name),
            _ => None,
        }
    }

    /// True if this is the identifier `word`. Used for contextual keywords
    /// such as `module`, `package`, `table`, `initial`, `init` and `body`.
    pub fn is_word(&self, word: &str) -> bool {
        self.ident() == Some(word)
    }

    pub fn describe(&self) -> String {
        match self {
            TokenKind::Int(n) => format!("integer `{n}`"),
            TokenKind::Float(f) => format!("float `{f}`"),
            TokenKind::Str(_) => "string literal".to_string(),
            TokenKind::Ident(name) => format!("identifier `{name}`"),
            TokenKind::Foreign { lang, .. } => format!("`#{lang}` foreign block"),
            TokenKind::Aggregate(_) => "literal aggregate".to_string(),
            TokenKind::Eof => "end of file".to_string(),
            other => format!("`{}`", other.symbol()),
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            TokenKind::Func => "func",
            TokenKind::Pack => "pack",
            TokenKind::Struct => "struct",
            TokenKind::Macro => "macro",
            TokenKind::StateMachine => "state_machine",
            TokenKind::Event => "event",
            TokenKind::Parallel => "parallel",
            TokenKind::Guard => "guard",
            TokenKind::Defer => "defer",
            TokenKind::Match => "match",
            TokenKind::Case => "case",
            TokenKind::If => "if",
            TokenKind::Elif => "elif",
            TokenKind::Else => "else",
            TokenKind::While => "while",
            TokenKind::For => "for",
            TokenKind::In => "in",
            TokenKind::Try => "try",
            TokenKind::Elerr => "elerr",
            TokenKind::As => "as",
            TokenKind::Finally => "finally",
            TokenKind::Return => "return",
            TokenKind::Break => "break",
            TokenKind::Continue => "continue",
            TokenKind::Raise => "raise",
            TokenKind::Import => "import",
            TokenKind::Clib => "clib",
            TokenKind::Private => "private",
            TokenKind::Require => "require",
            TokenKind::Ensure => "ensure",
            TokenKind::This => "this",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::None => "None",
            TokenKind::And => "and",
            TokenKind::Or => "or",
            TokenKind::Not => "not",
            TokenKind::Pass => "pass",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Comma => ",",
            TokenKind::DoubleColon => "::",
            TokenKind::Colon => ":",
            TokenKind::DotDotDot => "...",
            TokenKind::DotDot => "..",
            TokenKind::Dot => ".",
            TokenKind::Arrow => "->",
            TokenKind::FatArrow => "=>",
            TokenKind::EqEq => "==",
            TokenKind::Eq => "=",
            TokenKind::NotEq => "!=",
            TokenKind::Spaceship => "<=>",
            TokenKind::LtEq => "<=",
            TokenKind::Lt => "<",
            TokenKind::GtGt => ">>",
            TokenKind::GtEq => ">=",
            TokenKind::Gt => ">",
            TokenKind::PlusEq => "+=",
            TokenKind::MinusEq => "-=",
            TokenKind::StarEq => "*=",
            TokenKind::SlashEq => "/=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::PipeGt => "|>",
            TokenKind::Bang => "!",
            TokenKind::Int(_)
            | TokenKind::Float(_)
            | TokenKind::Str(_)
            | TokenKind::Ident(_)
            | TokenKind::Foreign { .. }
            | TokenKind::Aggregate(_)
            | TokenKind::Eof => "",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// At least one line break separates this token from the previous one.
    pub newline_before: bool,
}

/// Lexer output, always terminated by an `Eof` token.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TokenList {
    tokens: Vec<Token>,
}

impl TokenList {
    pub(crate) fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn as_slice(&self) -> &[Token] {
        &self.tokens
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    /// Hash of the token stream, ignoring layout.
    ///
    /// Spaces, indentation, blank lines and comments do not change the
    /// fingerprint. Whether a token starts a new line does, since line
    /// breaks end statements.
    pub fn fingerprint(&self, source: &str) -> ContentHash {
        let mut hasher = FxHasher::default();
        for token in &self.tokens {
            hasher.write(source.get(token.span.to_range()).unwrap_or("").as_bytes());
            hasher.write_u8(0xff);
            hasher.write_u8(u8::from(token.newline_before));
        }
        ContentHash::new(hasher.finish())
    }
}

impl<'a> IntoIterator for &'a TokenList {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}
