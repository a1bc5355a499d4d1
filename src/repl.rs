//! Interactive read-translate-print loop
//!
//! Each input line is translated on its own, with a fresh parser, so a DIM
//! typed on one line does not carry over to the next.

use std::io::{BufRead, Write};

use anyhow::Result;
use crossterm::style::Stylize;

use basic2c::{format_diagnostics, transpile, RenderOptions};

const BANNER: &str = "basic2c: a BASIC to C transpiler";
const PROMPT: &str = ">> ";

/// Run until `input` is exhausted. With `color`, diagnostics are printed
/// in red.
pub fn run<R, W>(input: R, mut out: W, options: &RenderOptions, color: bool) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    writeln!(out, "{BANNER}")?;

    let mut lines = input.lines();
    loop {
        write!(out, "{PROMPT}")?;
        out.flush()?;

        let Some(line) = lines.next() else {
            writeln!(out)?;
            return Ok(());
        };
        let result = transpile(&line?, options);

        if !result.is_ok() {
            let report = format_diagnostics(&result.diagnostics);
            if color {
                write!(out, "{}", report.red())?;
            } else {
                write!(out, "{report}")?;
            }
            continue;
        }
        write!(out, "{}", result.output)?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(input: &str) -> String {
        let mut out = Vec::new();
        run(input.as_bytes(), &mut out, &RenderOptions::default(), false).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_translates_each_line() {
        assert_eq!(
            session("10 X = 5\n20 GOTO 10\n"),
            "basic2c: a BASIC to C transpiler\n>> _10:;\nX = 5;\n>> _20:;\ngoto _10;\n>> \n"
        );
    }

    #[test]
    fn test_reports_errors_and_continues() {
        let out = session("10 GOTO\n20 CLS\n");
        assert!(out.contains(
            "// ERR: ========== parser ==========\n//  line 1:8: expected next token to be NUM, got EOF instead\n"
        ));
        assert!(out.ends_with(">> _20:;\nCLS();\n>> \n"));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(session(""), "basic2c: a BASIC to C transpiler\n>> \n");
    }
}
