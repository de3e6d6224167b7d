//! Build command implementation

use anyhow::Result;
use clap::Args;

use crate::config::BuildConfig;
use crate::exec::SystemRunner;
use crate::orchestrator::Orchestrator;
use crate::utils::terminal::{print_info, print_verbose};

/// Compile the executable without running it
#[derive(Args, Debug)]
pub struct BuildCommand {
    /// Print only the artifact path on stdout once the build succeeds
    #[arg(long)]
    pub print_path: bool,
}

impl BuildCommand {
    /// Execute the build command
    pub fn execute(self, config: BuildConfig, verbose: bool) -> Result<()> {
        let runner = SystemRunner::with_timeout(config.timeout);
        let mut orchestrator = Orchestrator::new(config, runner).with_verbose(verbose);

        let artifact = match orchestrator.build() {
            Ok(artifact) => artifact,
            Err(e) => {
                print_verbose(verbose, &format!("Stopped at stage: {}", orchestrator.stage()));
                return Err(e.into());
            }
        };

        if self.print_path {
            println!("{}", artifact.display());
        } else {
            print_info(&format!("Run it with: {}", artifact.display()));
        }
        Ok(())
    }
}
