//! Expression parsing implementation
//!
//! This module parses BASIC expressions with a Pratt (top-down operator
//! precedence) parser. Every token kind maps to at most one prefix rule and
//! at most one infix rule; binding power comes from [`precedence_of`].
//!
//! # Supported Expressions
//!
//! - Literals: integers, strings
//! - Identifiers, and array elements for names declared by DIM
//! - Binary operators: `+ - * /`, `= <> < >`, `AND`, `OR`
//! - Prefix operators: `-`, `LEN`, `ASC`, `CHR$`
//! - Calls: `F(a, b)`, `F()`, and the bare form `F a, b`
//! - Grouping: `( expr )`
//!
//! `:`, a line number and end of input end an expression no matter what
//! precedence is pending.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseError, ParseErrorKind, Parser};
use std::io::Read;

/// Binding power, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Precedence {
    Lowest,
    LogicOr,
    LogicAnd,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
}

pub(crate) fn precedence_of(kind: TokenKind) -> Precedence {
    match kind {
        TokenKind::Or => Precedence::LogicOr,
        TokenKind::And => Precedence::LogicAnd,
        TokenKind::Eq | TokenKind::NotEq => Precedence::Equals,
        TokenKind::Lt | TokenKind::Gt => Precedence::LessGreater,
        TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
        TokenKind::Asterisk | TokenKind::Slash => Precedence::Product,
        TokenKind::LParen => Precedence::Call,
        _ => Precedence::Lowest,
    }
}

#[derive(Debug, Clone, Copy)]
enum PrefixRule {
    Identifier,
    Integer,
    Str,
    Operator(PrefixOp),
    Grouped,
}

fn prefix_rule(kind: TokenKind) -> Option<PrefixRule> {
    match kind {
        TokenKind::Ident => Some(PrefixRule::Identifier),
        TokenKind::Num => Some(PrefixRule::Integer),
        TokenKind::Str => Some(PrefixRule::Str),
        TokenKind::Minus => Some(PrefixRule::Operator(PrefixOp::Neg)),
        TokenKind::Len => Some(PrefixRule::Operator(PrefixOp::Len)),
        TokenKind::Asc => Some(PrefixRule::Operator(PrefixOp::Asc)),
        TokenKind::ChrS => Some(PrefixRule::Operator(PrefixOp::ChrS)),
        TokenKind::LParen => Some(PrefixRule::Grouped),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy)]
enum InfixRule {
    Binary(InfixOp),
    Call,
}

fn infix_rule(kind: TokenKind) -> Option<InfixRule> {
    let op = match kind {
        TokenKind::Plus => InfixOp::Add,
        TokenKind::Minus => InfixOp::Sub,
        TokenKind::Asterisk => InfixOp::Mul,
        TokenKind::Slash => InfixOp::Div,
        TokenKind::Eq => InfixOp::Eq,
        TokenKind::NotEq => InfixOp::Ne,
        TokenKind::Lt => InfixOp::Lt,
        TokenKind::Gt => InfixOp::Gt,
        TokenKind::And => InfixOp::And,
        TokenKind::Or => InfixOp::Or,
        TokenKind::LParen => return Some(InfixRule::Call),
        _ => return None,
    };
    Some(InfixRule::Binary(op))
}

impl<R: Read> Parser<R> {
    /// Parse an expression starting at `cur`, binding operators tighter
    /// than `precedence`. Leaves `cur` on the last token of the expression.
    pub(crate) fn parse_expression(
        &mut self,
        precedence: Precedence,
    ) -> Result<Expression, ParseError> {
        self.nested(|parser| parser.expression(precedence))
    }

    fn expression(&mut self, precedence: Precedence) -> Result<Expression, ParseError> {
        let Some(rule) = prefix_rule(self.cur.kind) else {
            let kind = if self.cur_is(TokenKind::Illegal) {
                ParseErrorKind::IllegalToken {
                    literal: self.cur.literal.clone(),
                }
            } else {
                ParseErrorKind::NoPrefixParseFn {
                    kind: self.cur.kind,
                }
            };
            return Err(self.error_at_cur(kind));
        };

        let mut left = match rule {
            PrefixRule::Identifier => self.parse_identifier()?,
            PrefixRule::Integer => Expression::IntegerLiteral(self.integer_literal()?),
            PrefixRule::Str => {
                Expression::StringLiteral(self.cur.literal.clone(), self.cur.location)
            }
            PrefixRule::Operator(op) => self.parse_prefix(op)?,
            PrefixRule::Grouped => self.parse_grouped()?,
        };

        while !self.peek_is_terminator() && precedence < precedence_of(self.peek.kind) {
            let Some(rule) = infix_rule(self.peek.kind) else {
                break;
            };
            self.next_token();
            left = match rule {
                InfixRule::Binary(op) => self.parse_infix(op, left)?,
                InfixRule::Call => self.parse_call(left)?,
            };
        }

        Ok(left)
    }

    /// Move onto the token after `cur` and parse an expression there.
    ///
    /// A terminator in `peek` is reported without consuming it, so recovery
    /// never has to back up over a line number.
    pub(crate) fn next_expression(
        &mut self,
        precedence: Precedence,
    ) -> Result<Expression, ParseError> {
        if self.peek_is_terminator() {
            return Err(self.error_at_peek(ParseErrorKind::NoPrefixParseFn {
                kind: self.peek.kind,
            }));
        }
        self.next_token();
        self.parse_expression(precedence)
    }

    /// Identifier in expression position.
    ///
    /// Names declared by DIM are arrays and take an optional subscript list.
    /// Any other name directly followed by an identifier or number is a call
    /// with unparenthesized arguments (`RND 6`).
    fn parse_identifier(&mut self) -> Result<Expression, ParseError> {
        let name = self.cur.literal.clone();
        let location = self.cur.location;

        if self.arrays.contains_key(&name) {
            let indices = if self.peek_is(TokenKind::LParen) {
                self.next_token();
                self.parse_indices()?
            } else {
                Vec::new()
            };
            return Ok(Expression::Identifier(Identifier {
                name,
                indices,
                location,
            }));
        }

        if matches!(self.peek.kind, TokenKind::Ident | TokenKind::Num) {
            let arguments = self.parse_call_arguments(false)?;
            return Ok(Expression::Call(CallExpression {
                function: name,
                arguments,
                location,
            }));
        }

        Ok(Expression::Identifier(Identifier {
            name,
            indices: Vec::new(),
            location,
        }))
    }

    fn parse_prefix(&mut self, op: PrefixOp) -> Result<Expression, ParseError> {
        let location = self.cur.location;
        let operand = self.next_expression(Precedence::Prefix)?;
        Ok(Expression::Prefix {
            op,
            operand: Box::new(operand),
            location,
        })
    }

    fn parse_infix(&mut self, op: InfixOp, left: Expression) -> Result<Expression, ParseError> {
        let location = self.cur.location;
        let precedence = precedence_of(self.cur.kind);
        let right = self.next_expression(precedence)?;
        Ok(Expression::Infix {
            op,
            left: Box::new(left),
            right: Box::new(right),
            location,
        })
    }

    fn parse_grouped(&mut self) -> Result<Expression, ParseError> {
        let expression = self.next_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RParen)?;
        Ok(expression)
    }

    /// `(` following an expression: only a plain name can be called.
    fn parse_call(&mut self, function: Expression) -> Result<Expression, ParseError> {
        let (function, location) = match function {
            Expression::Identifier(Identifier {
                name,
                indices,
                location,
            }) if indices.is_empty() => (name, location),
            other => {
                return Err(ParseError::new(
                    ParseErrorKind::NotCallable,
                    *other.location(),
                ))
            }
        };
        let arguments = self.parse_call_arguments(true)?;
        Ok(Expression::Call(CallExpression {
            function,
            arguments,
            location,
        }))
    }

    /// Comma-separated argument list. With `parenthesized`, `cur` is the
    /// opening `(` and the list must be closed; otherwise `cur` is the name
    /// and the list runs to the first token that is not a `,`.
    pub(crate) fn parse_call_arguments(
        &mut self,
        parenthesized: bool,
    ) -> Result<Vec<Expression>, ParseError> {
        let mut arguments = Vec::new();

        if parenthesized && self.peek_is(TokenKind::RParen) {
            self.next_token();
            return Ok(arguments);
        }

        arguments.push(self.next_expression(Precedence::Lowest)?);
        while self.peek_is(TokenKind::Comma) {
            self.next_token();
            arguments.push(self.next_expression(Precedence::Lowest)?);
        }

        if parenthesized {
            self.expect_peek(TokenKind::RParen)?;
        }
        Ok(arguments)
    }

    /// Subscript list `(e1, e2, ...)` with `cur` on the opening `(`.
    pub(crate) fn parse_indices(&mut self) -> Result<Vec<Expression>, ParseError> {
        let mut indices = vec![self.next_expression(Precedence::Lowest)?];
        while self.peek_is(TokenKind::Comma) {
            self.next_token();
            indices.push(self.next_expression(Precedence::Lowest)?);
        }
        self.expect_peek(TokenKind::RParen)?;
        Ok(indices)
    }
}
