//! Run command implementation
//!
//! Builds the project and runs the resulting executable on the local host.
//! This is also what `ccrun` does when no subcommand is given.

use anyhow::Result;
use clap::Args;

use crate::config::BuildConfig;
use crate::exec::SystemRunner;
use crate::orchestrator::Orchestrator;
use crate::utils::terminal::print_verbose;

/// Build and run the executable
#[derive(Args, Debug, Default)]
pub struct RunCommand {
    /// Arguments to pass to the executable
    #[arg(last = true)]
    pub args: Vec<String>,
}

impl RunCommand {
    /// Execute the run command
    pub fn execute(self, config: BuildConfig, verbose: bool) -> Result<()> {
        let runner = SystemRunner::with_timeout(config.timeout);
        let mut orchestrator = Orchestrator::new(config, runner).with_verbose(verbose);

        if let Err(e) = orchestrator.build_and_run(&self.args) {
            print_verbose(verbose, &format!("Stopped at stage: {}", orchestrator.stage()));
            return Err(e.into());
        }
        Ok(())
    }
}
