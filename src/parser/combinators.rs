use std::rc::Rc;

use crate::lexer::Token;

use super::{ParseError, ParseResult, ParseState, Parser};

// === Boxed parser for type erasure ===

pub struct BoxedParser<T> {
    parser: Rc<dyn Fn(&mut ParseState) -> ParseResult<T>>,
}

impl<T> Clone for BoxedParser<T> {
    fn clone(&self) -> Self {
        BoxedParser {
            parser: Rc::clone(&self.parser),
        }
    }
}

impl<T: 'static> BoxedParser<T> {
    pub fn new<P: Parser<T> + 'static>(parser: P) -> Self {
        BoxedParser {
            parser: Rc::new(move |state| parser.parse(state)),
        }
    }

    /// Map: transform the result.
    pub fn map<U: 'static, F: Fn(T) -> U + 'static>(self, f: F) -> BoxedParser<U> {
        BoxedParser::new(move |state: &mut ParseState| {
            let a = self.parse(state)?;
            Ok(f(a))
        })
    }

    /// Choice: try self, backtrack and try other on failure.
    pub fn or(self, other: BoxedParser<T>) -> BoxedParser<T> {
        BoxedParser::new(move |state: &mut ParseState| {
            let pos = state.position();
            match self.parse(state) {
                Ok(a) => Ok(a),
                Err(_) => {
                    state.restore(pos);
                    other.parse(state)
                }
            }
        })
    }
}

impl<T> Parser<T> for BoxedParser<T> {
    fn parse(&self, state: &mut ParseState) -> ParseResult<T> {
        (self.parser)(state)
    }
}

// === Primitive parsers ===

/// Consume a token matching the predicate.
pub fn token<F: Fn(&Token) -> bool + 'static>(
    predicate: F,
    description: &'static str,
) -> BoxedParser<Token> {
    BoxedParser::new(move |state: &mut ParseState| match state.peek() {
        Some(tok) if predicate(tok) => Ok(state.advance().unwrap()),
        Some(tok) => {
            let err = ParseError::new("unexpected token")
                .expected(description)
                .found(tok.describe())
                .at(tok.pos());
            state.record_error(err.clone());
            Err(err)
        }
        None => {
            let err = ParseError::new("unexpected end of input").expected(description);
            state.record_error(err.clone());
            Err(err)
        }
    })
}

/// Parse an identifier, returning its inner payload.
pub fn ident() -> BoxedParser<crate::lexer::Ident> {
    BoxedParser::new(|state: &mut ParseState| match state.peek() {
        Some(Token::Ident(_)) => {
            if let Some(Token::Ident(id)) = state.advance() {
                Ok(id)
            } else {
                unreachable!()
            }
        }
        Some(tok) => {
            let err = ParseError::new("unexpected token")
                .expected("identifier")
                .found(tok.describe())
                .at(tok.pos());
            state.record_error(err.clone());
            Err(err)
        }
        None => {
            let err = ParseError::new("unexpected end of input").expected("identifier");
            state.record_error(err.clone());
            Err(err)
        }
    })
}

pub fn expect_in() -> BoxedParser<Token> {
    token(|t| matches!(t, Token::In(_)), "'in'")
}

pub fn expect_then() -> BoxedParser<Token> {
    token(|t| matches!(t, Token::Then(_)), "'then'")
}

pub fn expect_else() -> BoxedParser<Token> {
    token(|t| matches!(t, Token::Else(_)), "'else'")
}

pub fn expect_arrow() -> BoxedParser<Token> {
    token(|t| matches!(t, Token::Arrow(_)), "'->'")
}

pub fn expect_dot() -> BoxedParser<Token> {
    token(|t| matches!(t, Token::Dot(_)), "'.'")
}

pub fn expect_comma() -> BoxedParser<Token> {
    token(|t| matches!(t, Token::Comma(_)), "','")
}

pub fn expect_colon() -> BoxedParser<Token> {
    token(|t| matches!(t, Token::Colon(_)), "':'")
}

pub fn expect_equals() -> BoxedParser<Token> {
    token(|t| matches!(t, Token::Equals(_)), "'='")
}

pub fn expect_lparen() -> BoxedParser<Token> {
    token(|t| matches!(t, Token::LParen(_)), "'('")
}

pub fn expect_rparen() -> BoxedParser<Token> {
    token(|t| matches!(t, Token::RParen(_)), "')'")
}

pub fn expect_rbracket() -> BoxedParser<Token> {
    token(|t| matches!(t, Token::RBracket(_)), "']'")
}

pub fn expect_rbrace() -> BoxedParser<Token> {
    token(|t| matches!(t, Token::RBrace(_)), "'}'")
}

pub fn expect_rangle() -> BoxedParser<Token> {
    token(|t| matches!(t, Token::RAngle(_)), "'>'")
}

/// Parse zero or more occurrences.
pub fn many<T: 'static>(parser: BoxedParser<T>) -> BoxedParser<Vec<T>> {
    BoxedParser::new(move |state: &mut ParseState| {
        let mut results = Vec::new();
        loop {
            let pos = state.position();
            match parser.parse(state) {
                Ok(item) => results.push(item),
                Err(_) => {
                    state.restore(pos);
                    break;
                }
            }
        }
        Ok(results)
    })
}

/// Parse zero or one occurrence.
pub fn optional<T: 'static>(parser: BoxedParser<T>) -> BoxedParser<Option<T>> {
    BoxedParser::new(move |state: &mut ParseState| {
        let pos = state.position();
        match parser.parse(state) {
            Ok(item) => Ok(Some(item)),
            Err(_) => {
                state.restore(pos);
                Ok(None)
            }
        }
    })
}

/// Parse `item (separator item)*`; an empty sequence is fine.
pub fn separated<T: 'static, S: 'static>(
    item: BoxedParser<T>,
    separator: BoxedParser<S>,
) -> BoxedParser<Vec<T>> {
    BoxedParser::new(move |state: &mut ParseState| {
        let mut results = Vec::new();
        let pos = state.position();
        match item.parse(state) {
            Ok(first) => results.push(first),
            Err(_) => {
                state.restore(pos);
                return Ok(results);
            }
        }
        loop {
            let pos = state.position();
            if separator.parse(state).is_err() {
                state.restore(pos);
                break;
            }
            match item.parse(state) {
                Ok(next) => results.push(next),
                Err(err) => return Err(err),
            }
        }
        Ok(results)
    })
}
