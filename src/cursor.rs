// One-token lookahead over a token source

use crate::error::{SyntaxError, SyntaxErrorKind};
use crate::token::{Token, TokenKind, TokenSource};

pub struct Cursor<S> {
    source: S,
    current: Token,
    previous: Option<Token>,
}

impl<S: TokenSource> Cursor<S> {
    /// Creates a cursor with the first token already loaded.
    pub fn new(mut source: S) -> Result<Self, SyntaxError> {
        let current = source.next_token()?;
        Ok(Self {
            source,
            current,
            previous: None,
        })
    }

    pub fn current(&self) -> &Token {
        &self.current
    }

    pub fn previous(&self) -> Option<&Token> {
        self.previous.as_ref()
    }

    /// Loads the next token and returns the one it replaced.
    pub fn advance(&mut self) -> Result<Token, SyntaxError> {
        let next = self.source.next_token()?;
        let consumed = std::mem::replace(&mut self.current, next);
        self.previous = Some(consumed.clone());
        Ok(consumed)
    }

    /// Consumes the next token, failing unless it is of `kind`.
    pub fn expect(&mut self, kind: TokenKind) -> Result<Token, SyntaxError> {
        self.skip_comments()?;
        let token = self.advance()?;
        if token.kind != kind {
            return Err(SyntaxError::new(
                token.position,
                SyntaxErrorKind::UnexpectedToken {
                    expected: kind,
                    found: token.kind,
                },
            ));
        }
        Ok(token)
    }

    /// Consumes the next token only if it is of `kind`.
    pub fn allow(&mut self, kind: TokenKind) -> Result<bool, SyntaxError> {
        if self.peek_kind()? == kind {
            self.advance()?;
            return Ok(true);
        }
        Ok(false)
    }

    pub fn peek_kind(&mut self) -> Result<TokenKind, SyntaxError> {
        self.skip_comments()?;
        Ok(self.current.kind)
    }

    fn skip_comments(&mut self) -> Result<(), SyntaxError> {
        while self.current.kind == TokenKind::Comment {
            self.advance()?;
        }
        Ok(())
    }
}
