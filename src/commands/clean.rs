//! Clean command implementation

use anyhow::Result;
use clap::Args;

use crate::artifact::{format_size, CleanReport};
use crate::config::BuildConfig;
use crate::exec::SystemRunner;
use crate::orchestrator::Orchestrator;
use crate::utils::terminal::{print_info, print_success};

/// Remove the build directory
#[derive(Args, Debug)]
pub struct CleanCommand {
    /// Show what would be deleted
    #[arg(long)]
    pub dry_run: bool,
}

impl CleanCommand {
    /// Execute the clean command
    pub fn execute(self, config: BuildConfig, verbose: bool) -> Result<()> {
        // Cleaning never launches a process; the runner only satisfies the type.
        let mut orchestrator = Orchestrator::new(config, SystemRunner::new()).with_verbose(verbose);
        let build_dir = orchestrator.config().build_dir.display().to_string();

        match orchestrator.clean(self.dry_run)? {
            CleanReport::Absent => {
                print_info(&format!("{}/ does not exist, nothing to clean", build_dir));
            }
            CleanReport::WouldRemove { path, size } => {
                println!("[DRY RUN] Would remove: {} ({})", path.display(), format_size(size));
            }
            CleanReport::Removed { path, size } => {
                print_success(&format!("Removed {} ({})", path.display(), format_size(size)));
            }
        }
        Ok(())
    }
}
