//! Command-line interface for benchmarking distance reducers.
//!
//! Each subcommand selects one execution strategy, generates the input
//! vectors once, and times the configured number of runs for every requested
//! worker count.

mod commands;

pub use commands::{
    Cli, CliError, Command, CommonArgs, DistributedArgs, Execution, LayoutArg, ModelArg,
    Preview, SequentialArgs, SharedArgs, ValuesArg, render_execution, run_cli,
};

#[cfg(test)]
mod test_helpers;
