//! ccrun - a minimal build-and-run driver for C++ projects
//!
//! Finds every source file under `src/`, compiles them with a single
//! compiler invocation into `build/`, and runs the result.
//!
//! ## Architecture
//!
//! ```text
//! cli → commands/ → orchestrator → sources / invocation / exec / artifact
//! ```

mod artifact;
mod cli;
mod commands;
mod config;
mod error;
mod exec;
mod invocation;
mod orchestrator;
mod sources;
mod utils;

use std::process::ExitCode;

use clap::Parser;

use cli::Cli;
use error::{BuildError, EXIT_FAILURE};
use utils::terminal::print_error;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(err),
    }
}

fn report(err: anyhow::Error) -> ExitCode {
    match err.downcast_ref::<BuildError>() {
        Some(build_err) => {
            build_err.display_with_hints();
            ExitCode::from(build_err.exit_code())
        }
        None => {
            print_error(&format!("{:#}", err));
            ExitCode::from(EXIT_FAILURE)
        }
    }
}
