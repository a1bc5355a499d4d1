// basic2c: line-numbered BASIC to C transpiler

mod repl;

use std::fs::{self, File};
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use crossterm::tty::IsTty;
use log::{info, LevelFilter};
use simple_logger::SimpleLogger;

use basic2c::{format_diagnostics, transpile_reader, GosubStrategy, LoopBound, RenderOptions};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// BASIC source file; an interactive session starts when omitted
    input: Option<PathBuf>,

    /// Write the generated C here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Emit a complete translation unit with `main`
    #[arg(long)]
    standalone: bool,

    /// Use a stack of jump buffers so GOSUBs can nest
    #[arg(long)]
    return_stack: bool,

    /// Stop FOR loops with `<=`/`>=` instead of `!=`
    #[arg(long)]
    relational_for: bool,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn render_options(&self) -> RenderOptions {
        RenderOptions {
            gosub: if self.return_stack {
                GosubStrategy::ReturnStack
            } else {
                GosubStrategy::SharedSlot
            },
            loop_bound: if self.relational_for {
                LoopBound::Relational
            } else {
                LoopBound::Exact
            },
            standalone: self.standalone,
            ..RenderOptions::default()
        }
    }

    fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    SimpleLogger::new()
        .with_level(args.log_level())
        .env()
        .init()
        .map_err(|err| anyhow!("failed to initialise logging: {err}"))?;

    let options = args.render_options();
    match &args.input {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
            let result = transpile_reader(BufReader::new(file), &options);
            info!(
                "{}: {} statement(s), {} diagnostic(s)",
                path.display(),
                result.program.statements.len(),
                result.diagnostics.len()
            );

            if !result.is_ok() {
                eprint!("{}", format_diagnostics(&result.diagnostics));
                return Ok(ExitCode::FAILURE);
            }

            match &args.output {
                Some(out) => fs::write(out, &result.output)
                    .with_context(|| format!("cannot write {}", out.display()))?,
                None => io::stdout()
                    .write_all(result.output.as_bytes())
                    .context("cannot write to stdout")?,
            }
            Ok(ExitCode::SUCCESS)
        }
        None => {
            let stdout = io::stdout();
            let color = stdout.is_tty();
            repl::run(io::stdin().lock(), stdout, &options, color)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
