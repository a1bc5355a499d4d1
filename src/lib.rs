//! # Introduction
//!
//! basic2c translates line-numbered BASIC into C source text. It never runs
//! the program; it lowers each statement to an equivalent C construct and
//! reports every syntax problem it finds in one pass.
//!
//! ## Translation pipeline
//!
//! ```text
//! Source → Lexer → Parser → AST → Renderer → C text
//! ```
//!
//! 1. [`parser`]: tokenizes the byte stream on demand and builds an AST,
//!    recording diagnostics instead of stopping at the first error.
//! 2. [`render`]: lowers the AST to C: labels for line numbers, `switch`
//!    for `ON`, `setjmp`/`longjmp` for `GOSUB`/`RETURN`.
//!
//! ## Example
//!
//! ```
//! use basic2c::{transpile, RenderOptions};
//!
//! let result = transpile("10 X = 5", &RenderOptions::default());
//! assert!(result.diagnostics.is_empty());
//! assert_eq!(result.output, "_10:;\nX = 5;\n");
//! ```

pub mod parser;
pub mod render;

use std::io::Read;

use parser::ast::Program;
use parser::lexer::Lexer;
use parser::{ParseError, Parser};

pub use render::{GosubStrategy, LoopBound, RenderOptions, Renderer};

/// Result of one translation pass.
#[derive(Debug, Clone)]
pub struct Transpilation {
    pub program: Program,
    /// Rendered C text. Produced even when diagnostics were recorded; the
    /// statements that failed to parse are simply missing from it.
    pub output: String,
    pub diagnostics: Vec<ParseError>,
}

impl Transpilation {
    pub fn is_ok(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Translate BASIC source held in memory.
pub fn transpile(source: &str, options: &RenderOptions) -> Transpilation {
    transpile_reader(source.as_bytes(), options)
}

/// Translate BASIC source read from `reader`, rendering each top-level
/// statement as soon as the parser completes it.
pub fn transpile_reader<R: Read>(reader: R, options: &RenderOptions) -> Transpilation {
    let renderer = Renderer::new(options.clone());
    let mut parser = Parser::new(Lexer::new(reader));

    let mut body = String::new();
    let program = parser.parse_program_with(|statement, _| {
        if let Some(statement) = statement {
            body.push_str(&renderer.render_statement(statement));
            body.push('\n');
        }
    });

    Transpilation {
        program,
        output: renderer.finish(&body),
        diagnostics: parser.into_errors(),
    }
}

/// Diagnostics as a C comment block, ready to be printed ahead of (or
/// instead of) the generated code.
pub fn format_diagnostics(diagnostics: &[ParseError]) -> String {
    let mut out = String::from("// ERR: ========== parser ==========\n");
    for err in diagnostics {
        out.push_str(&format!(
            "//  line {}:{}: {}\n",
            err.location.line, err.location.column, err
        ));
    }
    out.push('\n');
    out
}
