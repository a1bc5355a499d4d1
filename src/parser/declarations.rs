//! Declaration parsing implementation
//!
//! This module handles the statements that name things rather than do
//! things:
//!
//! - Line numbers, with the `DATA` payload that may follow them
//! - Labels: `*NAME`
//! - Array declarations: `DIM A(10, 10), B$(3)`
//!
//! # Grammar
//!
//! ```text
//! line_number ::= LINENO [ DATA ]
//! label       ::= "*" IDENT
//! dim         ::= "DIM" array { "," array }
//! array       ::= IDENT "(" NUM { "," NUM } ")"
//! ```
//!
//! DIM registers each name in the parser's symbol table as soon as its
//! declaration is read, so later statements see it as an array.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseError, Parser};
use log::{debug, warn};
use std::io::Read;

impl<R: Read> Parser<R> {
    pub(crate) fn parse_line_number(&mut self) -> Result<Statement, ParseError> {
        let name = self.cur.literal.clone();
        let location = self.cur.location;

        let data = if self.peek_is(TokenKind::Data) {
            self.next_token();
            Some(DataStatement {
                name: name.clone(),
                value: self.cur.literal.clone(),
                location: self.cur.location,
            })
        } else {
            None
        };
        if data.is_some() {
            self.skip_separator();
        }

        Ok(Statement::LineNumber {
            name,
            data,
            location,
        })
    }

    pub(crate) fn parse_label(&mut self) -> Result<Statement, ParseError> {
        let location = self.cur.location;
        self.expect_peek(TokenKind::Ident)?;
        let name = self.cur.literal.clone();
        self.skip_separator();
        Ok(Statement::Label { name, location })
    }

    pub(crate) fn parse_dim(&mut self) -> Result<Statement, ParseError> {
        let location = self.cur.location;
        let mut declarations = vec![self.parse_dim_declaration()?];
        while self.peek_is(TokenKind::Comma) {
            self.next_token();
            declarations.push(self.parse_dim_declaration()?);
        }
        self.skip_separator();
        Ok(Statement::Dim {
            declarations,
            location,
        })
    }

    /// One `NAME(n, ...)` entry; `cur` is on the token before the name.
    fn parse_dim_declaration(&mut self) -> Result<DimDeclaration, ParseError> {
        self.expect_peek(TokenKind::Ident)?;
        let name = self.cur.literal.clone();
        let location = self.cur.location;

        self.expect_peek(TokenKind::LParen)?;
        self.expect_peek(TokenKind::Num)?;
        let mut sizes = vec![self.integer_literal()?];
        while self.peek_is(TokenKind::Comma) {
            self.next_token();
            self.expect_peek(TokenKind::Num)?;
            sizes.push(self.integer_literal()?);
        }
        self.expect_peek(TokenKind::RParen)?;

        if let Some(previous) = self.arrays.insert(name.clone(), location) {
            warn!(
                "{} redeclared at {}:{} (first declared at {}:{})",
                name, location.line, location.column, previous.line, previous.column
            );
        } else {
            debug!("declared array {} with {} dimension(s)", name, sizes.len());
        }

        Ok(DimDeclaration {
            name,
            sizes,
            location,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::parse::parse;

    #[test]
    fn test_line_number_with_data() {
        let (program, errors) = parse("1000 DATA ThisIsData:' this is data\n1100 DATA \"0011\"");
        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(program.statements.len(), 2);

        match &program.statements[0] {
            Statement::LineNumber {
                name,
                data: Some(data),
                ..
            } => {
                assert_eq!(name, "1000");
                assert_eq!(data.name, "1000");
                assert_eq!(data.value, "ThisIsData");
            }
            other => panic!("Expected line number with data, got {:?}", other),
        }
        match &program.statements[1] {
            Statement::LineNumber { data: Some(data), .. } => assert_eq!(data.value, "\"0011\""),
            other => panic!("Expected line number with data, got {:?}", other),
        }
    }

    #[test]
    fn test_label() {
        let (program, errors) = parse("90 *GOGO:RETURN");
        assert!(errors.is_empty(), "{:?}", errors);
        assert!(matches!(
            &program.statements[1],
            Statement::Label { name, .. } if name == "GOGO"
        ));
        assert!(matches!(program.statements[2], Statement::Return { .. }));
    }

    #[test]
    fn test_label_needs_name() {
        let (_, errors) = parse("90 * 5");
        assert_eq!(
            errors[0].to_string(),
            "expected next token to be IDENT, got NUM instead"
        );
    }

    #[test]
    fn test_dim_declarations() {
        let (program, errors) = parse("10 DIM ADD(10,15),A$(3)");
        assert!(errors.is_empty(), "{:?}", errors);

        match &program.statements[1] {
            Statement::Dim { declarations, .. } => {
                let shapes: Vec<(&str, Vec<i64>)> = declarations
                    .iter()
                    .map(|d| (d.name.as_str(), d.sizes.iter().map(|s| s.value).collect()))
                    .collect();
                assert_eq!(shapes, vec![("ADD", vec![10, 15]), ("A$", vec![3])]);
            }
            other => panic!("Expected DIM, got {:?}", other),
        }
    }

    #[test]
    fn test_dim_needs_sizes() {
        let (_, errors) = parse("10 DIM A");
        assert_eq!(
            errors[0].to_string(),
            "expected next token to be (, got EOF instead"
        );

        let (_, errors) = parse("10 DIM A(N)");
        assert_eq!(
            errors[0].to_string(),
            "expected next token to be NUM, got IDENT instead"
        );
    }

    #[test]
    fn test_dim_registers_before_rest_of_line() {
        let (program, errors) = parse("10 DIM A(3) : A(1) = 2");
        assert!(errors.is_empty(), "{:?}", errors);
        match &program.statements[2] {
            Statement::Let { target, .. } => {
                assert_eq!(target.name, "A");
                assert_eq!(target.indices.len(), 1);
            }
            other => panic!("Expected array assignment, got {:?}", other),
        }
    }
}
