use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug};
use while_core::{Compilation, EmitOptions, Syntax};

/// Destination value meaning "write to standard output".
const STDOUT: &str = "-";

/// Compiler and interpreter for the While language.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Input program
    input: PathBuf,

    #[arg(long, help = "Interpret the input program and print its result")]
    eval: bool,

    #[arg(
        long,
        value_name = "PATH",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = STDOUT,
        help = "Pretty-print the parsed program (before checking); '-' or no value for stdout",
    )]
    print: Option<String>,

    #[arg(
        long = "emit-c",
        value_name = "PATH",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = STDOUT,
        help = "Translate the program to C; '-' or no value for stdout",
    )]
    emit_c: Option<String>,

    #[arg(
        long = "emit-py",
        value_name = "PATH",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = STDOUT,
        help = "Translate the program to Python; '-' or no value for stdout",
    )]
    emit_py: Option<String>,

    #[arg(
        long,
        value_name = "N",
        help = "Indent emitted code with N spaces instead of a tab"
    )]
    indent: Option<usize>,

    #[arg(long = "log-level", value_name = "LEVEL", help = "Log level (overrides RUST_LOG)")]
    log_level: Option<LevelFilter>,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.log_level);
    execute(cli)
}

fn init_logging(level: Option<LevelFilter>) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(level) = level {
        builder.filter_level(level);
    }
    builder.init();
}

fn execute(cli: Cli) -> Result<ExitCode> {
    debug!("running with {cli:?}");
    let options = match cli.indent {
        Some(width) => EmitOptions::with_spaces(width),
        None => EmitOptions::default(),
    };

    let mut compilation = Compilation::from_path(&cli.input)?;

    // Printed before checking so that malformed programs can be inspected.
    if let Some(dest) = &cli.print {
        write_output(dest, &compilation.print(&options))?;
    }

    compilation.check();
    if !compilation.diagnostics().is_empty() {
        eprintln!("{}", compilation.render_diagnostics());
    }
    let errors = compilation.error_count();
    if errors > 0 {
        eprintln!("{errors} error(s) encountered");
        return Ok(ExitCode::FAILURE);
    }

    if cli.eval {
        let value = compilation.evaluate()?;
        println!("{value}");
    }

    if let Some(dest) = &cli.emit_c {
        let text = compilation.translate(Syntax::C, &options)?;
        write_output(dest, &text)?;
    }
    if let Some(dest) = &cli.emit_py {
        let text = compilation.translate(Syntax::Python, &options)?;
        write_output(dest, &text)?;
    }

    Ok(ExitCode::SUCCESS)
}

fn write_output(dest: &str, text: &str) -> Result<()> {
    if dest == STDOUT {
        let mut stdout = io::stdout().lock();
        stdout
            .write_all(text.as_bytes())
            .context("failed to write to stdout")?;
        return Ok(());
    }

    let path = Path::new(dest);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {parent:?}"))?;
        }
    }
    fs::write(path, text).with_context(|| format!("failed to write output file {dest}"))?;
    Ok(())
}
