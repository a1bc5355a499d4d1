//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure,
//! including error types, the token window, error recovery and the main parse
//! entry point.
//!
//! # Parser Architecture
//!
//! The Parser is recursive descent for statements and precedence climbing for
//! expressions:
//! - This module: Parser struct, helper methods, recovery and coordination
//! - `declarations`: line numbers, DATA, `*labels` and DIM
//! - `statements`: IF, ON, GOTO, GOSUB, RETURN, FOR, assignments and calls
//! - `expressions`: the precedence table and prefix/infix rules
//!
//! # Token window
//!
//! The parser sees exactly two tokens at a time, `cur` and `peek`, and pulls
//! the next one from the [`Lexer`] only when it advances. Statement parsers
//! start with `cur` on their first token and finish with `cur` on their last
//! one (a trailing `:` counts as part of the statement).
//!
//! # Error recovery
//!
//! Parsing never stops early. A failing statement parser returns a
//! [`ParseError`]; [`Parser::parse_statement`] records it and skips ahead to
//! the next `:` or line number before carrying on, so one pass reports as
//! many problems as possible.
//!
//! Statements and subexpressions may nest at most [`MAX_NESTING`] levels;
//! anything deeper is reported and skipped like any other error.

use crate::parser::ast::*;
use crate::parser::lexer::{Lexer, Token, TokenKind};
use log::debug;
use rustc_hash::FxHashMap;
use std::io::Read;
use thiserror::Error;

/// What went wrong while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("expected next token to be {expected}, got {found} instead")]
    UnexpectedToken {
        expected: TokenKind,
        found: TokenKind,
    },

    #[error("expected next token to be GOTO or GOSUB, got {found} instead")]
    ExpectedJumpKeyword { found: TokenKind },

    #[error("no prefix parse function for {kind} found")]
    NoPrefixParseFn { kind: TokenKind },

    #[error("could not parse {literal:?} as integer")]
    InvalidInteger { literal: String },

    #[error("could not parse call target as identifier")]
    NotCallable,

    #[error("invalid statement: {literal}")]
    InvalidStatement { literal: String },

    #[error("got invalid token: {literal}")]
    InvalidToken { literal: String },

    #[error("illegal token: {literal}")]
    IllegalToken { literal: String },

    #[error("nesting deeper than {limit} levels")]
    NestingTooDeep { limit: usize },
}

/// Parser error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub location: SourceLocation,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, location: SourceLocation) -> Self {
        Self { kind, location }
    }
}

/// Deepest allowed nesting of statements and subexpressions combined.
pub const MAX_NESTING: usize = 64;

/// Parse a complete source text, returning the program and every
/// diagnostic recorded along the way.
pub fn parse(source: &str) -> (Program, Vec<ParseError>) {
    let mut parser = Parser::new(Lexer::new(source.as_bytes()));
    let program = parser.parse_program();
    (program, parser.into_errors())
}

/// Recursive descent parser for line-numbered BASIC
pub struct Parser<R> {
    lexer: Lexer<R>,
    pub(crate) cur: Token,
    pub(crate) peek: Token,
    errors: Vec<ParseError>,
    depth: usize,
    /// Names declared by DIM so far, with their declaration site.
    pub(crate) arrays: FxHashMap<String, SourceLocation>,
}

impl<R: Read> Parser<R> {
    pub fn new(mut lexer: Lexer<R>) -> Self {
        let cur = lexer.next_token();
        let peek = lexer.next_token();
        Self {
            lexer,
            cur,
            peek,
            errors: Vec::new(),
            depth: 0,
            arrays: FxHashMap::default(),
        }
    }

    /// Diagnostics recorded so far, in source order.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ParseError> {
        self.errors
    }

    /// Parse the whole token stream.
    pub fn parse_program(&mut self) -> Program {
        self.parse_program_with(|_, _| {})
    }

    /// Parse the whole token stream, reporting each top-level statement to
    /// `on_statement` as soon as it is complete.
    ///
    /// The callback receives `None` for positions that produced no node (a
    /// REM, or a statement that failed to parse) and whether any diagnostic
    /// has been recorded so far.
    pub fn parse_program_with<F>(&mut self, mut on_statement: F) -> Program
    where
        F: FnMut(Option<&Statement>, bool),
    {
        let mut program = Program::new();

        while !self.cur_is(TokenKind::Eof) {
            let statement = self.parse_statement();
            let has_errors = !self.errors.is_empty();
            match statement {
                Some(statement) => {
                    on_statement(Some(&statement), has_errors);
                    program.statements.push(statement);
                }
                None => on_statement(None, has_errors),
            }
            self.next_token();
        }

        program
    }

    /// Parse the statement starting at `cur`. On failure the error is
    /// recorded, the parser resynchronizes and `None` is returned.
    pub(crate) fn parse_statement(&mut self) -> Option<Statement> {
        match self.nested(Self::statement) {
            Ok(statement) => {
                if let Some(statement) = &statement {
                    let loc = statement.location();
                    debug!("parsed statement at {}:{}", loc.line, loc.column);
                }
                statement
            }
            Err(err) => {
                debug!(
                    "recovering from `{}` at {}:{}",
                    err, err.location.line, err.location.column
                );
                self.errors.push(err);
                self.synchronize();
                None
            }
        }
    }

    /// Statement dispatch on the kind of `cur`.
    fn statement(&mut self) -> Result<Option<Statement>, ParseError> {
        let statement = match self.cur.kind {
            TokenKind::Rem => {
                self.skip_separator();
                return Ok(None);
            }
            // empty statement, e.g. `RETURN ::`
            TokenKind::Colon => return Ok(None),
            TokenKind::LineNo => self.parse_line_number()?,
            TokenKind::Asterisk => self.parse_label()?,
            TokenKind::Dim => self.parse_dim()?,
            TokenKind::If => self.parse_if()?,
            TokenKind::On => self.parse_on()?,
            TokenKind::Goto => self.parse_goto()?,
            TokenKind::Gosub => self.parse_gosub()?,
            TokenKind::Return => self.parse_return()?,
            TokenKind::For => self.parse_for()?,
            TokenKind::Next => {
                return Err(self.error_at_cur(ParseErrorKind::InvalidStatement {
                    literal: self.cur.literal.clone(),
                }));
            }
            TokenKind::Ident => {
                if self.peek_is(TokenKind::Eq) {
                    self.parse_let()?
                } else if self.arrays.contains_key(&self.cur.literal) {
                    self.parse_array_let()?
                } else {
                    self.parse_call_statement()?
                }
            }
            TokenKind::Illegal => {
                return Err(self.error_at_cur(ParseErrorKind::IllegalToken {
                    literal: self.cur.literal.clone(),
                }));
            }
            _ => {
                return Err(self.error_at_cur(ParseErrorKind::InvalidToken {
                    literal: self.cur.literal.clone(),
                }));
            }
        };
        Ok(Some(statement))
    }

    /// Skip to the next statement boundary (`:` or a line number), leaving a
    /// boundary `:` consumed and a line number as `peek`.
    fn synchronize(&mut self) {
        if self.cur_is(TokenKind::Colon) {
            return;
        }
        while !self.peek_is_terminator() {
            self.next_token();
        }
        self.skip_separator();
    }

    // ===== Helper methods =====

    /// Run `parse` one nesting level down, failing once [`MAX_NESTING`]
    /// levels are open.
    pub(crate) fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(self.error_at_cur(ParseErrorKind::NestingTooDeep { limit: MAX_NESTING }));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    pub(crate) fn next_token(&mut self) {
        let next = self.lexer.next_token();
        self.cur = std::mem::replace(&mut self.peek, next);
    }

    pub(crate) fn cur_is(&self, kind: TokenKind) -> bool {
        self.cur.kind == kind
    }

    pub(crate) fn peek_is(&self, kind: TokenKind) -> bool {
        self.peek.kind == kind
    }

    /// `:`, a new line number and end of input end any expression or
    /// statement, whatever precedence is pending.
    pub(crate) fn peek_is_terminator(&self) -> bool {
        matches!(
            self.peek.kind,
            TokenKind::Colon | TokenKind::LineNo | TokenKind::Eof
        )
    }

    /// Advance if `peek` is of the given kind, otherwise report it.
    pub(crate) fn expect_peek(&mut self, kind: TokenKind) -> Result<(), ParseError> {
        if self.peek_is(kind) {
            self.next_token();
            Ok(())
        } else {
            Err(self.peek_error(kind))
        }
    }

    /// Consume a `:` that ends the current statement, if there is one.
    pub(crate) fn skip_separator(&mut self) {
        if self.peek_is(TokenKind::Colon) {
            self.next_token();
        }
    }

    pub(crate) fn peek_error(&self, expected: TokenKind) -> ParseError {
        ParseError::new(
            ParseErrorKind::UnexpectedToken {
                expected,
                found: self.peek.kind,
            },
            self.peek.location,
        )
    }

    pub(crate) fn error_at_cur(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(kind, self.cur.location)
    }

    pub(crate) fn error_at_peek(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(kind, self.peek.location)
    }

    /// Integer literal from the text of `cur`.
    pub(crate) fn integer_literal(&self) -> Result<IntegerLiteral, ParseError> {
        let literal = self.cur.literal.clone();
        let value = literal.parse::<i64>().map_err(|_| {
            self.error_at_cur(ParseErrorKind::InvalidInteger {
                literal: literal.clone(),
            })
        })?;
        Ok(IntegerLiteral {
            value,
            literal,
            location: self.cur.location,
        })
    }
}
