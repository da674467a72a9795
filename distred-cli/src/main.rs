//! `distred` entry point.
//!
//! Parses arguments with clap, runs the selected benchmark, renders the
//! per-run lines to stdout, and maps failures to a non-zero exit status.
//! Logging is initialised first so every later step can emit structured
//! diagnostics.

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use distred_cli::{
    cli::{Cli, CliError, render_execution, run_cli},
    logging::{self, LoggingError},
};
use tracing::{error, field};

fn try_main() -> Result<()> {
    let cli = Cli::parse();
    let execution = run_cli(cli).context("failed to execute benchmark")?;
    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    render_execution(&execution, &mut writer).context("failed to render report")?;
    writer.flush().context("failed to flush output")?;
    execution.verify()?;
    Ok(())
}

fn main() -> ExitCode {
    if let Err(err) = logging::init_logging() {
        report_logging_init_error(&err);
        return ExitCode::FAILURE;
    }

    if let Err(err) = try_main() {
        let (code, distance_code) = match err.downcast_ref::<CliError>() {
            Some(CliError::Core(core)) => (Some(core.code()), core.distance_code()),
            _ => (None, None),
        };

        error!(
            error = %format!("{err:#}"),
            code = code.map(|code| field::display(code.as_str())),
            distance_code = distance_code.map(|code| field::display(code.as_str())),
            "benchmark failed"
        );
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

#[expect(
    clippy::print_stderr,
    reason = "Emit one-off diagnostic before tracing is initialized"
)]
fn report_logging_init_error(err: &LoggingError) {
    eprintln!("failed to initialize logging: {err}");
}
