use serde::Serialize;

/// Token kinds produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    /// Plain template text.
    Literal,
    /// Escaped echo (`{{ ... }}`).
    Echo,
    /// Raw echo (`{!! ... !!}`).
    RawEcho,
    /// Echo escaped from compilation (`@{{ ... }}` or `\{{ ... }}`).
    EscapedEcho,
    /// Raw echo escaped from compilation (`@{!! ... !!}` or `\{!! ... !!}`).
    EscapedRawEcho,
    /// Comment (`{{-- ... --}}`).
    Comment,
    /// Directive (`@name` or `@name(...)`).
    Directive,
    /// Synthetic end-of-input marker with empty text.
    EndOfInput,
}

impl TokenKind {
    /// Short lowercase label, used by the CLI token dump.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Literal => "literal",
            Self::Echo => "echo",
            Self::RawEcho => "raw-echo",
            Self::EscapedEcho => "escaped-echo",
            Self::EscapedRawEcho => "escaped-raw-echo",
            Self::Comment => "comment",
            Self::Directive => "directive",
            Self::EndOfInput => "eof",
        }
    }
}

/// A single token with its kind, exact source text, and start line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub raw: String,
    pub line: usize,
}

impl Token {
    #[must_use]
    pub const fn eof(line: usize) -> Self {
        Self {
            kind: TokenKind::EndOfInput,
            raw: String::new(),
            line,
        }
    }

    #[must_use]
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::EndOfInput
    }
}
