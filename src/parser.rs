use crate::Span;
use crate::lexer::{LexerError, Token, TokenKind};
use crate::types::Node;
use std::iter::Peekable;
use std::vec::IntoIter; // To iterate over Vec<Token>
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Parse Error [at {0}]: unexpected ')'")]
    UnexpectedClose(Span),
    /// Input ran out. `open` is the unclosed `(` when inside a list.
    #[error("Parse Error: unexpected end of input")]
    UnexpectedEof { open: Option<Span> },
    #[error("Lexer Error during parse: {0}")]
    LexerError(#[from] LexerError),
}

// Result type alias for convenience
pub type ParseResult<T> = Result<T, ParseError>;

pub struct Parser {
    // We iterate over owned Tokens, consuming them front to back.
    tokens: Peekable<IntoIter<Token>>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens: tokens.into_iter().peekable(),
        }
    }

    pub fn is_exhausted(&mut self) -> bool {
        self.tokens.peek().is_none()
    }

    /// Reads one expression from the front of the token stream.
    pub fn read(&mut self) -> ParseResult<Node> {
        match self.tokens.next() {
            Some(Token {
                kind: TokenKind::LParen,
                span,
            }) => self.read_list(span),
            Some(Token {
                kind: TokenKind::RParen,
                span,
            }) => Err(ParseError::UnexpectedClose(span)),
            Some(Token {
                kind: TokenKind::Atom(text),
                span,
            }) => Ok(atom(&text, span)),
            None => Err(ParseError::UnexpectedEof { open: None }),
        }
    }

    /// Reads list elements after an opening `(` up to and including its `)`.
    fn read_list(&mut self, open: Span) -> ParseResult<Node> {
        let mut elements = Vec::new();
        loop {
            if let Some(close) = self.tokens.next_if(|t| t.kind == TokenKind::RParen) {
                return Ok(Node::new_list(elements, open.merge(close.span)));
            }
            if self.is_exhausted() {
                return Err(ParseError::UnexpectedEof { open: Some(open) });
            }
            elements.push(self.read()?);
        }
    }

    /// Parses the first expression. Tokens after it are ignored.
    pub fn parse(mut self) -> ParseResult<Node> {
        self.read()
    }

    /// Parses expressions until the token stream is exhausted.
    pub fn parse_all(mut self) -> ParseResult<Vec<Node>> {
        let mut expressions = Vec::new();
        while !self.is_exhausted() {
            expressions.push(self.read()?);
        }
        Ok(expressions)
    }
}

/// Converts an atom lexeme: integer if it parses as one, else float if it
/// parses as one, else a symbol. Integers that overflow `i64` become floats.
pub fn atom(text: &str, span: Span) -> Node {
    if let Ok(n) = text.parse::<i64>() {
        Node::new_integer(n, span)
    } else if let Ok(n) = text.parse::<f64>() {
        Node::new_float(n, span)
    } else {
        Node::new_symbol(text, span)
    }
}

// Helper function to lex and parse a string directly (useful for tests and REPL)
pub fn parse_str(input: &str) -> ParseResult<Node> {
    let tokens = crate::lexer::tokenize(input)?;
    Parser::new(tokens).parse()
}

/// Lexes and parses every top-level expression in `input`.
pub fn parse_program(input: &str) -> ParseResult<Vec<Node>> {
    let tokens = crate::lexer::tokenize(input)?;
    Parser::new(tokens).parse_all()
}
