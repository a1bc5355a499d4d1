//! Line-numbered BASIC parser
//!
//! This module transforms BASIC source text into an Abstract Syntax Tree (AST):
//! - [`lexer`]: Tokenization (byte stream → tokens)
//! - [`parse`]: Parsing (tokens → AST), with error recovery
//! - [`ast`]: AST node definitions
//!
//! # Supported BASIC Subset
//!
//! - Line numbers, `*labels`, `REM`/`'` comments and `DATA` lines
//! - Statements: `DIM`, `IF/THEN/ELSE`, `ON GOTO/GOSUB`, `GOTO`, `GOSUB`,
//!   `RETURN`, `FOR/TO/STEP/NEXT`, assignments and calls
//! - Expressions: integer and string literals, arithmetic, comparison,
//!   `AND`/`OR`, `LEN`/`ASC`/`CHR$`, array elements and function calls
//!
//! Anything the parser does not know as a keyword is treated as a call to
//! an external routine, so dialect-specific commands (`PRINT`, `CLS`,
//! `LOCATE`) pass straight through.
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent for statements with a Pratt parser for
//! expressions. No external parser generator dependencies.

pub mod ast;
mod declarations;
mod expressions;
pub mod lexer;
pub mod parse;
mod statements;

pub use parse::{parse, ParseError, ParseErrorKind, Parser};
