//! Builders shared across CLI tests.

use std::num::NonZeroUsize;

use super::{CliError, CommonArgs, ValuesArg, run_cli};
use super::{Cli, Execution};

pub(super) fn non_zero(value: usize) -> NonZeroUsize {
    match NonZeroUsize::new(value) {
        Some(count) => count,
        None => panic!("test counts must be non-zero"),
    }
}

/// Small, seeded, verified configuration that finishes quickly.
pub(super) fn common(length: usize) -> CommonArgs {
    CommonArgs {
        length: non_zero(length),
        runs: non_zero(3),
        seed: Some(42),
        values: ValuesArg::Unit,
        regenerate: false,
        no_verify: false,
        preview: None,
    }
}

pub(super) fn run_cli_expecting_success(cli: Cli) -> Execution {
    match run_cli(cli) {
        Ok(execution) => execution,
        Err(err) => panic!("command must succeed: {err}"),
    }
}

pub(super) fn run_cli_expecting_error(cli: Cli, panic_msg: &str) -> CliError {
    match run_cli(cli) {
        Ok(_) => panic!("{panic_msg}"),
        Err(err) => err,
    }
}

pub(super) fn render_to_string(execution: &Execution) -> String {
    let mut buffer = Vec::new();
    if let Err(err) = super::render_execution(execution, &mut buffer) {
        panic!("rendering into memory cannot fail: {err}");
    }
    match String::from_utf8(buffer) {
        Ok(text) => text,
        Err(err) => panic!("rendered output must be UTF-8: {err}"),
    }
}
