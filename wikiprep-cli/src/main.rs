//! # process-template
//!
//! Renders a header/footer template with `NAME=value` variables and writes
//! the result to standard output.

mod commands;

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "process-template")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Template file to render
    template: Option<PathBuf>,

    /// Variable assignments (NAME=value); arguments without `=` are ignored.
    /// Options must come before the first assignment
    #[arg(allow_hyphen_values = true)]
    assignments: Vec<String>,

    /// YAML file with a `variables` mapping; command-line assignments win
    #[arg(long, env = "WIKIPREP_VARS_FILE")]
    vars_file: Option<PathBuf>,

    /// Set GENERATION_DATE to the current UTC time unless it is given
    #[arg(long)]
    now: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_cli() -> Cli {
    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version go to stdout and succeed; usage errors exit 1
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            std::process::exit(code);
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = parse_cli();

    // Logs go to stderr; stdout carries only the rendered template
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::WARN.into()
            }),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let Some(template) = cli.template else {
        anyhow::bail!("Usage: process-template <template_file> [VAR=value ...]");
    };

    let opts = commands::RenderOptions {
        assignments: cli.assignments,
        vars_file: cli.vars_file,
        stamp_date: cli.now,
    };
    commands::render_template(&template, opts)
}
