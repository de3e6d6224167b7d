//! CLI argument parsing using clap derive macros

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands::{build::BuildCommand, clean::CleanCommand, run::RunCommand};
use crate::config::{normalize_extension, BuildConfig};
use crate::utils::paths::resolve_project_root;

/// ccrun - compile a C++ project with one compiler call and run it
///
/// Without a subcommand, every source file under the source directory is
/// compiled into a single executable, which is then run.
#[derive(Parser, Debug)]
#[command(name = "ccrun")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Project directory (defaults to the current directory)
    #[arg(short = 'C', long, global = true, value_name = "DIR")]
    pub project_dir: Option<PathBuf>,

    /// Compiler executable
    #[arg(long, global = true, value_name = "EXE")]
    pub compiler: Option<String>,

    /// Compiler flag; repeat to pass several (replaces the default flags)
    #[arg(long = "flag", global = true, value_name = "FLAG", allow_hyphen_values = true)]
    pub flags: Vec<String>,

    /// Source directory, relative to the project directory
    #[arg(long, global = true, value_name = "DIR")]
    pub src_dir: Option<PathBuf>,

    /// Build directory, relative to the project directory
    #[arg(long, global = true, value_name = "DIR")]
    pub build_dir: Option<PathBuf>,

    /// Name of the produced executable
    #[arg(long, global = true, value_name = "NAME")]
    pub target_name: Option<String>,

    /// Extension of source files to compile
    #[arg(long, global = true, value_name = "EXT")]
    pub extension: Option<String>,

    /// Kill the compiler or the program after this many seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile without running
    Build(BuildCommand),

    /// Compile and run, forwarding arguments after `--`
    Run(RunCommand),

    /// Remove the build directory
    Clean(CleanCommand),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        // Set up terminal colors
        if self.no_color {
            console::set_colors_enabled(false);
            console::set_colors_enabled_stderr(false);
        }

        let config = self.build_config()?;

        match self.command {
            None => RunCommand::default().execute(config, self.verbose),
            Some(Commands::Build(cmd)) => cmd.execute(config, self.verbose),
            Some(Commands::Run(cmd)) => cmd.execute(config, self.verbose),
            Some(Commands::Clean(cmd)) => cmd.execute(config, self.verbose),
        }
    }

    /// Defaults overridden by whatever was given on the command line
    pub fn build_config(&self) -> Result<BuildConfig> {
        let project_root = resolve_project_root(self.project_dir.as_deref())?;
        let mut config = BuildConfig::for_project(project_root);

        if let Some(compiler) = &self.compiler {
            config.compiler = compiler.clone();
        }
        if !self.flags.is_empty() {
            config.flags = self.flags.clone();
        }
        if let Some(dir) = &self.src_dir {
            config.source_dir = dir.clone();
        }
        if let Some(dir) = &self.build_dir {
            config.build_dir = dir.clone();
        }
        if let Some(name) = &self.target_name {
            config.target_name = name.clone();
        }
        if let Some(ext) = &self.extension {
            config.extension = normalize_extension(ext);
        }
        config.timeout = self.timeout.map(Duration::from_secs);

        config.validate()?;
        Ok(config)
    }
}
