//! Error types and helpers for user-friendly error messages
//!
//! Every failure in the build pipeline is terminal to the current flow. The
//! variants here map one-to-one onto the stages that can fail, and each one
//! carries a process exit code so operators can tell them apart in scripts.

use std::path::PathBuf;

use thiserror::Error;

use crate::exec::ExecutionStatus;

/// Exit code for filesystem and internal errors
pub const EXIT_FAILURE: u8 = 1;
/// Exit code when the source root holds no compilable files
pub const EXIT_NO_SOURCES: u8 = 2;
/// Exit code when the compiler or the artifact could not be started
pub const EXIT_LAUNCH: u8 = 3;
/// Exit code when the compiler reported failure
pub const EXIT_COMPILE_FAILED: u8 = 4;
/// Exit code when the built program reported failure
pub const EXIT_RUN_FAILED: u8 = 5;

/// Failures of the build-and-run pipeline
#[derive(Error, Debug)]
pub enum BuildError {
    /// Invalid configuration overrides
    #[error("Configuration error: {message}")]
    Config { message: String, hint: Option<String> },

    /// No file with the configured extension under the source root
    #[error("No '{extension}' source files found under {}", root.display())]
    NoSourcesFound { root: PathBuf, extension: String },

    /// Directory creation, removal or traversal failed
    #[error("Filesystem error on {}: {message}", path.display())]
    Filesystem {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// An external executable could not be located or started
    #[error("Failed to launch '{program}'")]
    Launch {
        program: String,
        #[source]
        source: Option<std::io::Error>,
        hint: Option<String>,
    },

    /// The compiler ran and reported failure
    #[error("Compilation failed ({status})")]
    CompileFailed { status: ExecutionStatus },

    /// The produced artifact ran and reported failure
    #[error("{} failed ({status})", artifact.display())]
    RunFailed { artifact: PathBuf, status: ExecutionStatus },
}

impl BuildError {
    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            hint: None,
        }
    }

    /// Create a configuration error with a hint
    pub fn config_error_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    /// Create a filesystem error from an I/O failure
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Create a filesystem error that has no underlying I/O error
    pub fn filesystem_message(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Filesystem {
            path: path.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a launch error
    pub fn launch(program: impl Into<String>, source: Option<std::io::Error>) -> Self {
        Self::Launch {
            program: program.into(),
            source,
            hint: None,
        }
    }

    /// Process exit code reported for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            BuildError::Config { .. } | BuildError::Filesystem { .. } => EXIT_FAILURE,
            BuildError::NoSourcesFound { .. } => EXIT_NO_SOURCES,
            BuildError::Launch { .. } => EXIT_LAUNCH,
            BuildError::CompileFailed { .. } => EXIT_COMPILE_FAILED,
            BuildError::RunFailed { .. } => EXIT_RUN_FAILED,
        }
    }

    fn hint(&self) -> Option<String> {
        match self {
            BuildError::Config { hint, .. } | BuildError::Launch { hint, .. } => hint.clone(),
            BuildError::NoSourcesFound { root, extension } => {
                Some(hints::no_sources(root, extension))
            }
            BuildError::CompileFailed { .. } => Some(hints::compile_failed().to_string()),
            BuildError::Filesystem { .. } | BuildError::RunFailed { .. } => None,
        }
    }

    /// Display error with formatting and hints
    pub fn display_with_hints(&self) {
        use console::style;

        eprintln!("\n{} {}", style("ERROR:").red().bold(), self);

        if let BuildError::Launch {
            source: Some(source),
            ..
        } = self
        {
            eprintln!("  {}", source);
        }

        if let Some(h) = self.hint() {
            eprintln!("\n{} {}", style("HINT:").yellow().bold(), h);
        }

        eprintln!();
    }
}

/// Common error hints
pub mod hints {
    use std::path::Path;

    /// Get hint for a compiler missing from PATH
    pub fn missing_compiler(compiler: &str) -> String {
        format!(
            "'{}' was not found in PATH. Install a C++ toolchain:\n\
             • macOS: xcode-select --install\n\
             • Ubuntu: sudo apt install g++\n\
             • Windows: winget install mingw-w64\n\
             \n\
             Or pick another compiler with --compiler <EXE>.",
            compiler
        )
    }

    /// Get hint for an empty source tree
    pub fn no_sources(root: &Path, extension: &str) -> String {
        format!(
            "Put at least one '{}' file under {} or point --src-dir at your sources.",
            extension,
            root.display()
        )
    }

    /// Get hint for a failed compilation
    pub fn compile_failed() -> &'static str {
        "Fix the compiler diagnostics above and run again."
    }

    /// Get hint for a build directory that clean could not safely remove
    pub fn build_dir() -> &'static str {
        "`ccrun clean` deletes the build directory recursively. Pick a dedicated \
         directory such as 'build' that holds neither the project nor its sources."
    }

    /// Get hint for an invalid target name
    pub fn target_name() -> &'static str {
        "The target name is a file name inside the build directory; it must not contain '/' or '\\'."
    }
}
