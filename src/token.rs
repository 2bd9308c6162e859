// Token definitions shared by the tokenizer and the interpreter

use std::fmt;

use crate::error::TokenizeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Clone,
    Run,
    Extract,
    Set,
    As,
    String,
    Semicolon,
    Comment,
    /// A bare word that is not a keyword.
    Ident,
    EndOfInput,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Clone => "'clone'",
            TokenKind::Run => "'run'",
            TokenKind::Extract => "'extract'",
            TokenKind::Set => "'set'",
            TokenKind::As => "'as'",
            TokenKind::String => "string",
            TokenKind::Semicolon => "';'",
            TokenKind::Comment => "comment",
            TokenKind::Ident => "identifier",
            TokenKind::EndOfInput => "end of input",
        };
        f.write_str(name)
    }
}

/// Line and column of a token, both starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Moves the position past `text`.
    pub(crate) fn advance_over(&mut self, text: &str) {
        for ch in text.chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, position: Position) -> Self {
        Self {
            kind,
            text: text.into(),
            position,
        }
    }

    pub fn end_of_input(position: Position) -> Self {
        Self::new(TokenKind::EndOfInput, "", position)
    }
}

/// Anything that can hand out tokens one at a time.
///
/// End of input is reported as a token of kind [`TokenKind::EndOfInput`],
/// which keeps being returned on further calls. Scan failures are the only
/// `Err` case.
pub trait TokenSource {
    fn next_token(&mut self) -> Result<Token, TokenizeError>;
}
