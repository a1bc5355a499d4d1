//! Statement parsing implementation
//!
//! This module handles parsing of executable BASIC statements:
//!
//! - Control flow: `IF ... THEN ... ELSE`, `ON ... GOTO/GOSUB`, `FOR ... NEXT`
//! - Jumps: `GOTO`, `GOSUB`, `RETURN`
//! - Assignments: `X = expr`, `A(i, j) = expr`
//! - Calls: `CLS`, `LOCATE 2, 3`, `PSET(X, Y)`
//!
//! Statement lists are parsed by [`Parser::parse_block`], which goes through
//! [`Parser::parse_statement`] for each element, so errors inside a THEN arm
//! or a FOR body are recovered from without abandoning the enclosing
//! statement.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::expressions::Precedence;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseError, ParseErrorKind, Parser};
use log::warn;
use std::io::Read;

impl<R: Read> Parser<R> {
    /// Parse statements until `peek` is `stop`, a line number (when
    /// `stop_at_line` is set) or end of input. The stop token is left in
    /// `peek`.
    pub(crate) fn parse_block(
        &mut self,
        stop: Option<TokenKind>,
        stop_at_line: bool,
    ) -> Vec<Statement> {
        let mut statements = Vec::new();
        loop {
            let kind = self.peek.kind;
            if kind == TokenKind::Eof
                || Some(kind) == stop
                || (stop_at_line && kind == TokenKind::LineNo)
            {
                break;
            }
            self.next_token();
            if let Some(statement) = self.parse_statement() {
                statements.push(statement);
            }
        }
        statements
    }

    pub(crate) fn parse_if(&mut self) -> Result<Statement, ParseError> {
        let location = self.cur.location;
        let condition = self.next_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::Then)?;

        let consequence = self.parse_branch(Some(TokenKind::Else))?;
        let alternative = if self.peek_is(TokenKind::Else) {
            self.next_token();
            Some(self.parse_branch(None)?)
        } else {
            None
        };

        Ok(Statement::If {
            condition,
            consequence,
            alternative,
            location,
        })
    }

    /// Arm of an IF with `cur` on THEN or ELSE. A line number or label right
    /// after the keyword is an implicit GOTO.
    fn parse_branch(&mut self, stop: Option<TokenKind>) -> Result<Branch, ParseError> {
        if !matches!(self.peek.kind, TokenKind::Num | TokenKind::Asterisk) {
            return Ok(Branch::Block(self.parse_block(stop, true)));
        }

        let location = self.cur.location;
        let target = self.parse_jump_target()?;
        self.skip_separator();

        let rest = self.parse_block(stop, true);
        if rest.is_empty() {
            return Ok(Branch::Goto(target));
        }
        let mut statements = Vec::with_capacity(rest.len() + 1);
        statements.push(Statement::Goto { target, location });
        statements.extend(rest);
        Ok(Branch::Block(statements))
    }

    pub(crate) fn parse_on(&mut self) -> Result<Statement, ParseError> {
        let location = self.cur.location;
        let value = self.next_expression(Precedence::Lowest)?;

        let kind = match self.peek.kind {
            TokenKind::Goto => JumpKind::Goto,
            TokenKind::Gosub => JumpKind::Gosub,
            found => return Err(self.error_at_peek(ParseErrorKind::ExpectedJumpKeyword { found })),
        };
        self.next_token();

        let mut targets = vec![self.parse_jump_target()?];
        while self.peek_is(TokenKind::Comma) {
            self.next_token();
            targets.push(self.parse_jump_target()?);
        }
        self.skip_separator();

        Ok(Statement::On {
            value,
            kind,
            targets,
            location,
        })
    }

    pub(crate) fn parse_goto(&mut self) -> Result<Statement, ParseError> {
        let location = self.cur.location;
        let target = self.parse_jump_target()?;
        self.skip_separator();
        Ok(Statement::Goto { target, location })
    }

    pub(crate) fn parse_gosub(&mut self) -> Result<Statement, ParseError> {
        let location = self.cur.location;
        let target = self.parse_jump_target()?;
        self.skip_separator();
        Ok(Statement::Gosub { target, location })
    }

    pub(crate) fn parse_return(&mut self) -> Result<Statement, ParseError> {
        let location = self.cur.location;
        self.skip_separator();
        Ok(Statement::Return { location })
    }

    /// Line number or `*label` in `peek`.
    fn parse_jump_target(&mut self) -> Result<JumpTarget, ParseError> {
        match self.peek.kind {
            TokenKind::Num => {
                self.next_token();
                Ok(JumpTarget {
                    name: self.cur.literal.clone(),
                    location: self.cur.location,
                })
            }
            TokenKind::Asterisk => {
                self.next_token();
                let location = self.cur.location;
                self.expect_peek(TokenKind::Ident)?;
                Ok(JumpTarget {
                    name: self.cur.literal.clone(),
                    location,
                })
            }
            _ => Err(self.peek_error(TokenKind::Num)),
        }
    }

    pub(crate) fn parse_for(&mut self) -> Result<Statement, ParseError> {
        let location = self.cur.location;

        self.expect_peek(TokenKind::Ident)?;
        let variable = self.cur.literal.clone();
        self.expect_peek(TokenKind::Eq)?;
        let begin = self.next_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::To)?;
        let end = self.next_expression(Precedence::Lowest)?;

        let step = if self.peek_is(TokenKind::Step) {
            self.next_token();
            self.next_expression(Precedence::Lowest)?
        } else {
            Expression::IntegerLiteral(IntegerLiteral {
                value: 1,
                literal: "1".to_string(),
                location,
            })
        };

        match self.peek.kind {
            TokenKind::Colon => self.next_token(),
            TokenKind::LineNo => {}
            _ => return Err(self.peek_error(TokenKind::Colon)),
        }

        let body = self.parse_block(Some(TokenKind::Next), false);
        self.expect_peek(TokenKind::Next)?;

        if self.peek_is(TokenKind::Ident) {
            self.next_token();
            if self.cur.literal != variable {
                warn!(
                    "NEXT {} at {}:{} closes the loop over {}",
                    self.cur.literal, self.cur.location.line, self.cur.location.column, variable
                );
            }
        }
        self.skip_separator();

        Ok(Statement::For {
            variable,
            begin,
            end,
            step,
            body,
            location,
        })
    }

    pub(crate) fn parse_let(&mut self) -> Result<Statement, ParseError> {
        let target = Identifier {
            name: self.cur.literal.clone(),
            indices: Vec::new(),
            location: self.cur.location,
        };
        self.expect_peek(TokenKind::Eq)?;
        self.finish_let(target)
    }

    pub(crate) fn parse_array_let(&mut self) -> Result<Statement, ParseError> {
        let name = self.cur.literal.clone();
        let location = self.cur.location;
        self.expect_peek(TokenKind::LParen)?;
        let indices = self.parse_indices()?;
        self.expect_peek(TokenKind::Eq)?;
        self.finish_let(Identifier {
            name,
            indices,
            location,
        })
    }

    /// Right-hand side of an assignment; `cur` is the `=`.
    fn finish_let(&mut self, target: Identifier) -> Result<Statement, ParseError> {
        let location = target.location;
        let value = self.next_expression(Precedence::Lowest)?;
        self.skip_separator();
        Ok(Statement::Let {
            target,
            value,
            location,
        })
    }

    /// Invocation of a name that is neither assigned to nor an array.
    pub(crate) fn parse_call_statement(&mut self) -> Result<Statement, ParseError> {
        let function = self.cur.literal.clone();
        let location = self.cur.location;

        let arguments = if self.peek_is_terminator() {
            Vec::new()
        } else if self.peek_is(TokenKind::LParen) {
            self.next_token();
            self.parse_call_arguments(true)?
        } else {
            self.parse_call_arguments(false)?
        };
        self.skip_separator();

        Ok(Statement::Call(CallExpression {
            function,
            arguments,
            location,
        }))
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::parse::parse;

    fn parse_ok(source: &str) -> Vec<Statement> {
        let (program, errors) = parse(source);
        assert!(errors.is_empty(), "{source}: {:?}", errors);
        program.statements
    }

    fn target_names(targets: &[JumpTarget]) -> Vec<&str> {
        targets.iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn test_if_implicit_goto_both_arms() {
        let statements = parse_ok("100 IF 5<10 THEN 30 ELSE *GOGO");
        match &statements[1] {
            Statement::If {
                consequence: Branch::Goto(then),
                alternative: Some(Branch::Goto(otherwise)),
                ..
            } => {
                assert_eq!(then.name, "30");
                assert_eq!(otherwise.name, "GOGO");
            }
            other => panic!("Expected IF with two jumps, got {:?}", other),
        }
    }

    #[test]
    fn test_if_blocks_stop_at_else_and_line() {
        let statements = parse_ok("10 IF A THEN X = 1 : Y = 2 ELSE GOSUB *SUB : Z = 3\n20 W = 4");
        match &statements[1] {
            Statement::If {
                consequence: Branch::Block(then),
                alternative: Some(Branch::Block(otherwise)),
                ..
            } => {
                assert_eq!(then.len(), 2);
                assert_eq!(otherwise.len(), 2);
                assert!(matches!(otherwise[0], Statement::Gosub { .. }));
            }
            other => panic!("Expected IF with blocks, got {:?}", other),
        }
        assert!(matches!(&statements[2], Statement::LineNumber { name, .. } if name == "20"));
        assert!(matches!(statements[3], Statement::Let { .. }));
    }

    #[test]
    fn test_if_jump_followed_by_statements() {
        let statements = parse_ok("10 IF A THEN 30 : X = 1");
        match &statements[1] {
            Statement::If {
                consequence: Branch::Block(then),
                alternative: None,
                ..
            } => {
                match &then[0] {
                    Statement::Goto { target, location } => {
                        assert_eq!(target.name, "30");
                        // the implicit GOTO sits at its THEN
                        assert_eq!(*location, SourceLocation::new(1, 9));
                    }
                    other => panic!("Expected goto, got {:?}", other),
                }
                assert!(matches!(then[1], Statement::Let { .. }));
            }
            other => panic!("Expected IF with block, got {:?}", other),
        }
    }

    #[test]
    fn test_if_requires_then() {
        let (_, errors) = parse("10 IF A GOTO 30");
        assert_eq!(
            errors[0].to_string(),
            "expected next token to be THEN, got GOTO instead"
        );
    }

    #[test]
    fn test_on_goto_and_gosub() {
        let statements = parse_ok("200 ON N GOTO 10, 20, *THIRD\n210 ON N GOSUB 100");
        match &statements[1] {
            Statement::On { kind, targets, .. } => {
                assert_eq!(*kind, JumpKind::Goto);
                assert_eq!(target_names(targets), vec!["10", "20", "THIRD"]);
            }
            other => panic!("Expected ON, got {:?}", other),
        }
        assert!(matches!(
            statements[3],
            Statement::On {
                kind: JumpKind::Gosub,
                ..
            }
        ));
    }

    #[test]
    fn test_on_requires_jump_keyword() {
        let (_, errors) = parse("200 ON N 10");
        // `N 10` reads as a call, so the keyword check sees end of input
        assert_eq!(
            errors[0].to_string(),
            "expected next token to be GOTO or GOSUB, got EOF instead"
        );
    }

    #[test]
    fn test_for_loop() {
        let statements = parse_ok("300 FOR I=10 TO 1 STEP -1: X = I: NEXT");
        match &statements[1] {
            Statement::For {
                variable,
                step,
                body,
                ..
            } => {
                assert_eq!(variable, "I");
                assert!(matches!(
                    step,
                    Expression::Prefix {
                        op: PrefixOp::Neg,
                        ..
                    }
                ));
                assert_eq!(body.len(), 1);
            }
            other => panic!("Expected FOR, got {:?}", other),
        }
    }

    #[test]
    fn test_for_default_step_and_multiline_body() {
        let statements = parse_ok("10 FOR I=1 TO 3\n20 X = I\n30 NEXT I\n40 END");
        match &statements[1] {
            Statement::For { step, body, .. } => {
                assert!(matches!(step, Expression::IntegerLiteral(lit) if lit.value == 1));
                // line 20, the assignment, line 30
                assert_eq!(body.len(), 3);
            }
            other => panic!("Expected FOR, got {:?}", other),
        }
        assert!(matches!(&statements[2], Statement::LineNumber { name, .. } if name == "40"));
    }

    #[test]
    fn test_for_empty_body() {
        let statements = parse_ok("10 FOR I=1 TO 3: NEXT");
        assert!(matches!(&statements[1], Statement::For { body, .. } if body.is_empty()));
    }

    #[test]
    fn test_for_without_next() {
        let (_, errors) = parse("10 FOR I=1 TO 3: X = I");
        assert_eq!(
            errors[0].to_string(),
            "expected next token to be NEXT, got EOF instead"
        );
    }

    #[test]
    fn test_goto_gosub_return() {
        let statements = parse_ok("10 GOTO 100 : GOSUB *SUB : RETURN");
        assert!(matches!(&statements[1], Statement::Goto { target, .. } if target.name == "100"));
        assert!(matches!(&statements[2], Statement::Gosub { target, .. } if target.name == "SUB"));
        assert!(matches!(statements[3], Statement::Return { .. }));
    }

    #[test]
    fn test_call_statements() {
        let statements = parse_ok("10 CLEAR : LOCATE 2,3 : PSET(X, Y) : CLS()");
        let calls: Vec<(&str, usize)> = statements
            .iter()
            .filter_map(|s| match s {
                Statement::Call(call) => Some((call.function.as_str(), call.arguments.len())),
                _ => None,
            })
            .collect();
        assert_eq!(
            calls,
            vec![("CLEAR", 0), ("LOCATE", 2), ("PSET", 2), ("CLS", 0)]
        );
    }

    #[test]
    fn test_array_assignment() {
        let statements = parse_ok("10 DIM B(4,4)\n20 B(1, I + 1) = 7");
        match &statements[3] {
            Statement::Let { target, value, .. } => {
                assert_eq!(target.name, "B");
                assert_eq!(target.indices.len(), 2);
                assert!(matches!(value, Expression::IntegerLiteral(lit) if lit.value == 7));
            }
            other => panic!("Expected array assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_error_inside_block_keeps_enclosing_statement() {
        let (program, errors) = parse("10 FOR I=1 TO 2: GOTO X: Y = 1: NEXT");
        assert_eq!(errors.len(), 1);
        match &program.statements[1] {
            Statement::For { body, .. } => {
                assert_eq!(body.len(), 1);
                assert!(matches!(body[0], Statement::Let { .. }));
            }
            other => panic!("Expected FOR, got {:?}", other),
        }
    }
}
