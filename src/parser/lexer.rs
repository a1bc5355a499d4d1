//! Lexer (tokenizer) for line-numbered BASIC source
//!
//! Pulls bytes from any [`Read`] implementation one at a time and hands out
//! [`Token`]s on demand through [`Lexer::next_token`]. The parser never asks
//! for more than one token of lookahead, so the lexer never runs ahead of it.
//!
//! A few BASIC quirks are resolved here rather than in the parser:
//! - a numeral that opens a line is a [`TokenKind::LineNo`], anywhere else it
//!   is a [`TokenKind::Num`]
//! - `DATA` and `REM` swallow the rest of their statement as raw text
//! - `'` is shorthand for `REM`

use super::ast::SourceLocation;
use log::{trace, warn};
use std::fmt;
use std::io::{self, Read};

/// Every kind of token the lexer can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Illegal,
    Eof,

    // Identifiers + literals
    Str,
    Ident,
    Num,
    LineNo,

    // Operators
    Plus,
    Minus,
    Asterisk,
    Slash,
    Lt,
    Gt,
    Eq,
    NotEq,

    // Delimiters
    Semicolon,
    Comma,
    Colon,
    LParen,
    RParen,

    // Built-in prefix operators
    Len,
    Asc,
    ChrS,

    // Keywords
    Dim,
    If,
    Then,
    Else,
    On,
    Goto,
    Gosub,
    Return,
    For,
    To,
    Step,
    Next,
    Data,
    Rem,
    And,
    Or,
}

impl TokenKind {
    /// Name used for this kind in diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Illegal => "ILLEGAL",
            TokenKind::Eof => "EOF",
            TokenKind::Str => "STRING",
            TokenKind::Ident => "IDENT",
            TokenKind::Num => "NUM",
            TokenKind::LineNo => "LINENO",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Asterisk => "*",
            TokenKind::Slash => "/",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::Eq => "=",
            TokenKind::NotEq => "<>",
            TokenKind::Semicolon => ";",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::Len => "LEN",
            TokenKind::Asc => "ASC",
            TokenKind::ChrS => "CHR$",
            TokenKind::Dim => "DIM",
            TokenKind::If => "IF",
            TokenKind::Then => "THEN",
            TokenKind::Else => "ELSE",
            TokenKind::On => "ON",
            TokenKind::Goto => "GOTO",
            TokenKind::Gosub => "GOSUB",
            TokenKind::Return => "RETURN",
            TokenKind::For => "FOR",
            TokenKind::To => "TO",
            TokenKind::Step => "STEP",
            TokenKind::Next => "NEXT",
            TokenKind::Data => "DATA",
            TokenKind::Rem => "REM",
            TokenKind::And => "AND",
            TokenKind::Or => "OR",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve a word to its reserved keyword, or [`TokenKind::Ident`].
///
/// Keywords are case-sensitive, and the trailing `$` is part of the word
/// (so `CHR$` is a keyword while `CHR` is a plain identifier).
pub fn lookup_ident(word: &str) -> TokenKind {
    match word {
        "LEN" => TokenKind::Len,
        "ASC" => TokenKind::Asc,
        "CHR$" => TokenKind::ChrS,
        "DIM" => TokenKind::Dim,
        "IF" => TokenKind::If,
        "THEN" => TokenKind::Then,
        "ELSE" => TokenKind::Else,
        "ON" => TokenKind::On,
        "GOTO" => TokenKind::Goto,
        "GOSUB" => TokenKind::Gosub,
        "RETURN" => TokenKind::Return,
        "FOR" => TokenKind::For,
        "TO" => TokenKind::To,
        "STEP" => TokenKind::Step,
        "NEXT" => TokenKind::Next,
        "DATA" => TokenKind::Data,
        "REM" => TokenKind::Rem,
        "AND" => TokenKind::And,
        "OR" => TokenKind::Or,
        _ => TokenKind::Ident,
    }
}

/// A lexical token: its kind, the literal text it was read from, and where
/// it starts in the source.
///
/// For `DATA` and `REM` the literal is the raw payload, not the keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    pub location: SourceLocation,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            kind,
            literal: literal.into(),
            location,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.kind, self.literal)
    }
}

/// Pull-based lexer over a byte stream.
///
/// Holds the byte under examination and one byte of lookahead. `None` in
/// either slot marks the end of the stream; since source text is printable
/// ASCII plus line terminators it can never be confused with real input.
pub struct Lexer<R> {
    bytes: io::Bytes<R>,
    drained: bool,
    ch: Option<u8>,
    peek_ch: Option<u8>,
    at_stream_start: bool,
    line: usize,
    column: usize,
}

impl<R: Read> Lexer<R> {
    /// Create a lexer reading from `reader`.
    pub fn new(reader: R) -> Self {
        let mut lexer = Self {
            bytes: reader.bytes(),
            drained: false,
            ch: None,
            peek_ch: None,
            at_stream_start: true,
            line: 1,
            column: 1,
        };
        lexer.read_char();
        lexer.read_char();
        lexer
    }

    /// Return the next token, advancing past it.
    ///
    /// Once the input is exhausted every call returns an `Eof` token.
    pub fn next_token(&mut self) -> Token {
        let new_line = self.skip_whitespace() || self.at_stream_start;
        self.at_stream_start = false;

        let location = self.current_location();
        let Some(ch) = self.ch else {
            return Token::new(TokenKind::Eof, "", location);
        };

        let kind = match ch {
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Asterisk,
            b'/' => TokenKind::Slash,
            b'=' => TokenKind::Eq,
            b'>' => TokenKind::Gt,
            b';' => TokenKind::Semicolon,
            b',' => TokenKind::Comma,
            b':' => TokenKind::Colon,
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'<' => {
                if self.peek_ch == Some(b'>') {
                    self.read_char();
                    self.read_char();
                    return self.emit(TokenKind::NotEq, "<>".to_string(), location);
                }
                TokenKind::Lt
            }
            b'\'' => {
                self.read_char();
                let text = self.read_raw_text();
                return self.emit(TokenKind::Rem, text, location);
            }
            b'"' => return self.string_literal(location),
            c if is_letter(c) => return self.word(location),
            c if c.is_ascii_digit() => {
                return if new_line {
                    let digits = self.read_while(|c| c.is_ascii_digit());
                    self.emit(TokenKind::LineNo, digits, location)
                } else {
                    let number = self.number_literal();
                    self.emit(TokenKind::Num, number, location)
                };
            }
            _ => TokenKind::Illegal,
        };

        self.read_char();
        self.emit(kind, char::from(ch).to_string(), location)
    }

    /// Drain the lexer into a vector, up to and including the `Eof` token.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }
        tokens
    }

    fn emit(&self, kind: TokenKind, literal: String, location: SourceLocation) -> Token {
        trace!("token {} {:?} at {}:{}", kind, literal, location.line, location.column);
        Token::new(kind, literal, location)
    }

    /// Identifier or keyword. `DATA` and `REM` take the rest of the
    /// statement as their literal.
    fn word(&mut self, location: SourceLocation) -> Token {
        let mut word = self.read_while(|c| is_letter(c) || c.is_ascii_digit());
        if self.ch == Some(b'$') {
            word.push('$');
            self.read_char();
        }

        let kind = lookup_ident(&word);
        if matches!(kind, TokenKind::Data | TokenKind::Rem) {
            let text = self.read_raw_text();
            return self.emit(kind, text, location);
        }
        self.emit(kind, word, location)
    }

    /// String literal without its quotes. A string cut short by the end of
    /// the line becomes an illegal token holding what was read so far; the
    /// line break is left in place so the next line still starts cleanly.
    fn string_literal(&mut self, location: SourceLocation) -> Token {
        self.read_char(); // opening quote
        let text = self.read_while(|c| c != b'"' && !is_line_break(c));

        if self.ch == Some(b'"') {
            self.read_char();
            self.emit(TokenKind::Str, text, location)
        } else {
            self.emit(TokenKind::Illegal, format!("\"{text}"), location)
        }
    }

    /// Digits with at most one embedded decimal point.
    fn number_literal(&mut self) -> String {
        let mut seen_dot = false;
        self.read_while(|c| {
            if c == b'.' && !seen_dot {
                seen_dot = true;
                true
            } else {
                c.is_ascii_digit()
            }
        })
    }

    /// Raw payload of a `DATA`/`REM` statement: leading blanks dropped, then
    /// everything up to (not including) `:` or the end of the line.
    fn read_raw_text(&mut self) -> String {
        while matches!(self.ch, Some(c) if is_space(c)) {
            self.read_char();
        }
        self.read_while(|c| c != b':' && !is_line_break(c))
    }

    fn read_while(&mut self, mut accept: impl FnMut(u8) -> bool) -> String {
        let mut out = Vec::new();
        while let Some(c) = self.ch {
            if !accept(c) {
                break;
            }
            out.push(c);
            self.read_char();
        }
        String::from_utf8_lossy(&out).into_owned()
    }

    /// Skip blanks and line breaks, reporting whether a line break was seen.
    fn skip_whitespace(&mut self) -> bool {
        let mut new_line = false;
        while let Some(c) = self.ch {
            if is_line_break(c) {
                new_line = true;
            } else if !is_space(c) {
                break;
            }
            self.read_char();
        }
        new_line
    }

    fn read_char(&mut self) {
        match self.ch {
            Some(b'\n') => {
                self.line += 1;
                self.column = 1;
            }
            Some(_) => self.column += 1,
            None => {}
        }
        self.ch = self.peek_ch;
        self.peek_ch = self.pull_byte();
    }

    fn pull_byte(&mut self) -> Option<u8> {
        if self.drained {
            return None;
        }
        match self.bytes.next() {
            Some(Ok(byte)) => Some(byte),
            Some(Err(err)) => {
                warn!("read error treated as end of input: {err}");
                self.drained = true;
                None
            }
            None => {
                self.drained = true;
                None
            }
        }
    }

    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

fn is_space(c: u8) -> bool {
    c == b' ' || c == b'\t'
}

fn is_line_break(c: u8) -> bool {
    c == b'\n' || c == b'\r'
}

fn is_letter(c: u8) -> bool {
    c.is_ascii_alphabetic()
}
