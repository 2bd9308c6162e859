// Lazy tokenizer built on the pest grammar in grammar.pest

use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;

use crate::error::TokenizeError;
use crate::token::{Position, Token, TokenKind, TokenSource};

#[derive(Parser)]
#[grammar = "grammar.pest"]
struct TokenParser;

pub struct Tokenizer<'a> {
    source: &'a str,
    offset: usize,
    position: Position,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            offset: 0,
            position: Position::default(),
        }
    }

    fn rest(&self) -> &'a str {
        &self.source[self.offset..]
    }

    fn consume(&mut self, len: usize) {
        let text = &self.source[self.offset..self.offset + len];
        self.position.advance_over(text);
        self.offset += len;
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        let trimmed = rest.trim_start();
        self.consume(rest.len() - trimmed.len());
    }

    fn error(&self) -> TokenizeError {
        let message = match self.rest().chars().next() {
            Some('"') => "unterminated string literal".to_string(),
            Some(ch) => format!("unexpected character '{}'", ch),
            None => "unexpected end of input".to_string(),
        };
        TokenizeError {
            position: self.position,
            message,
        }
    }
}

impl TokenSource for Tokenizer<'_> {
    fn next_token(&mut self) -> Result<Token, TokenizeError> {
        self.skip_whitespace();
        let position = self.position;
        if self.rest().is_empty() {
            return Ok(Token::end_of_input(position));
        }

        let pair = TokenParser::parse(Rule::token, self.rest())
            .ok()
            .and_then(|mut pairs| pairs.next())
            .ok_or_else(|| self.error())?;
        let len = pair.as_str().len();
        let inner = pair.into_inner().next().ok_or_else(|| self.error())?;
        let token = make_token(inner, position);
        self.consume(len);

        log::trace!("token {} {:?} at {}", token.kind, token.text, position);
        Ok(token)
    }
}

fn make_token(pair: Pair<Rule>, position: Position) -> Token {
    let kind = match pair.as_rule() {
        Rule::kw_clone => TokenKind::Clone,
        Rule::kw_run => TokenKind::Run,
        Rule::kw_extract => TokenKind::Extract,
        Rule::kw_set => TokenKind::Set,
        Rule::kw_as => TokenKind::As,
        Rule::semicolon => TokenKind::Semicolon,
        Rule::comment => TokenKind::Comment,
        Rule::string => {
            let text = pair
                .into_inner()
                .next()
                .map(|inner| unescape(inner.as_str()))
                .unwrap_or_default();
            return Token::new(TokenKind::String, text, position);
        }
        _ => TokenKind::Ident,
    };
    Token::new(kind, pair.as_str(), position)
}

/// Resolves `\"` and `\\`. Other escapes reach the shell untouched.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some(next @ ('"' | '\\')) => out.push(next),
            Some(next) => {
                out.push('\\');
                out.push(next);
            }
            None => out.push('\\'),
        }
    }
    out
}
