use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use crate::token::{Position, TokenKind};

/// Raised by a token source when the text at `position` is not a token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TokenizeError {
    pub position: Position,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxErrorKind {
    #[error("found invalid token: {0}")]
    InvalidToken(String),
    #[error("expected token {expected}, got {found}")]
    UnexpectedToken { expected: TokenKind, found: TokenKind },
    #[error("expected two arguments but got {0}")]
    ExtractArguments(usize),
    #[error("expected two arguments separated by '=' but got {0}")]
    SetArguments(usize),
}

/// A syntax error without the file it occurred in.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}")]
pub struct SyntaxError {
    pub position: Position,
    pub kind: SyntaxErrorKind,
}

impl SyntaxError {
    pub fn new(position: Position, kind: SyntaxErrorKind) -> Self {
        Self { position, kind }
    }
}

impl From<TokenizeError> for SyntaxError {
    fn from(err: TokenizeError) -> Self {
        Self::new(err.position, SyntaxErrorKind::InvalidToken(err.message))
    }
}

/// The single fatal diagnostic of a failed interpretation, rendered as
/// `<filename>(<line>:<column>) <message>`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{filename}({position}) {kind}")]
pub struct ParseError {
    pub filename: String,
    pub position: Position,
    pub kind: SyntaxErrorKind,
}

impl ParseError {
    pub(crate) fn from_syntax(filename: &str, err: SyntaxError) -> Self {
        Self {
            filename: filename.to_string(),
            position: err.position,
            kind: err.kind,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Parse(#[from] ParseError),
    #[error("Error reading file '{}': {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("No Watchfile found. Pass a script path or create ./Watchfile.")]
    ScriptNotFound,
    #[error("Command failed with {status}: {command}")]
    CommandFailed { command: String, status: ExitStatus },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
