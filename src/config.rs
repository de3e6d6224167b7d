//! Build configuration
//!
//! The tool has no configuration file: every setting has a built-in default
//! and may be overridden on the command line. Once `BuildConfig` has been
//! validated it is passed by reference to the orchestrator and never changes.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use crate::error::{hints, BuildError};

/// Compiler executable
pub const DEFAULT_COMPILER: &str = "g++";
/// Flags placed before the source files
pub const DEFAULT_FLAGS: &[&str] = &["-std=c++17", "-g", "-Wall", "-Wextra", "-Isrc"];
/// Flag that designates the output file
pub const DEFAULT_OUTPUT_FLAG: &str = "-o";
/// Source root, relative to the project root
pub const DEFAULT_SOURCE_DIR: &str = "src";
/// Extension of compilable sources
pub const DEFAULT_EXTENSION: &str = ".cpp";
/// Build output directory, relative to the project root
pub const DEFAULT_BUILD_DIR: &str = "build";
/// Base name of the produced artifact
pub const DEFAULT_TARGET_NAME: &str = "manc";

/// Immutable settings for one build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Directory the compiler runs in; relative paths below resolve against it
    pub project_root: PathBuf,
    pub compiler: String,
    pub flags: Vec<String>,
    pub output_flag: String,
    pub source_dir: PathBuf,
    /// Always starts with '.'
    pub extension: String,
    pub build_dir: PathBuf,
    pub target_name: String,
    /// Deadline for each child process, none by default
    pub timeout: Option<Duration>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            compiler: DEFAULT_COMPILER.to_string(),
            flags: DEFAULT_FLAGS.iter().map(|f| f.to_string()).collect(),
            output_flag: DEFAULT_OUTPUT_FLAG.to_string(),
            source_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
            extension: DEFAULT_EXTENSION.to_string(),
            build_dir: PathBuf::from(DEFAULT_BUILD_DIR),
            target_name: DEFAULT_TARGET_NAME.to_string(),
            timeout: None,
        }
    }
}

impl BuildConfig {
    /// Default configuration rooted at `project_root`
    pub fn for_project(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            ..Self::default()
        }
    }

    /// Directory scanned for sources
    pub fn source_root(&self) -> PathBuf {
        self.project_root.join(&self.source_dir)
    }

    /// Directory the artifact is written to
    pub fn build_path(&self) -> PathBuf {
        self.project_root.join(&self.build_dir)
    }

    /// Reject settings that cannot produce a sensible command line
    pub fn validate(&self) -> Result<(), BuildError> {
        if self.compiler.trim().is_empty() {
            return Err(BuildError::config_error("compiler name is empty"));
        }
        if self.output_flag.trim().is_empty() {
            return Err(BuildError::config_error("output flag is empty"));
        }
        if self.extension.len() < 2 || !self.extension.starts_with('.') {
            return Err(BuildError::config_error_with_hint(
                format!("invalid source extension '{}'", self.extension),
                "Pass an extension such as '.cpp' or 'cc'.",
            ));
        }
        if self.target_name.is_empty() || is_dot_name(&self.target_name) {
            return Err(BuildError::config_error("target name is empty"));
        }
        if self.target_name.contains(['/', '\\']) {
            return Err(BuildError::config_error_with_hint(
                format!("invalid target name '{}'", self.target_name),
                hints::target_name(),
            ));
        }
        self.validate_build_dir()
    }

    /// `clean` removes the build directory recursively, so it must never be
    /// the project root, the source root, or an ancestor of either.
    fn validate_build_dir(&self) -> Result<(), BuildError> {
        let rejected = |reason: &str| -> Result<(), BuildError> {
            Err(BuildError::config_error_with_hint(
                format!(
                    "invalid build directory '{}': {}",
                    self.build_dir.display(),
                    reason
                ),
                hints::build_dir(),
            ))
        };

        if normalize_lexically(&self.build_dir).as_os_str().is_empty() {
            return rejected("it resolves to the project directory");
        }
        if self
            .build_dir
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return rejected("'..' segments are not allowed");
        }

        let build_path = normalize_lexically(&self.build_path());
        let project_root = normalize_lexically(&self.project_root);
        let source_root = normalize_lexically(&self.source_root());

        if project_root.starts_with(&build_path) {
            return rejected("it contains the project directory");
        }
        if source_root.starts_with(&build_path) {
            return rejected("cleaning it would delete the sources");
        }
        Ok(())
    }
}

/// Prefix a bare extension with '.'
pub fn normalize_extension(extension: &str) -> String {
    if extension.starts_with('.') {
        extension.to_string()
    } else {
        format!(".{}", extension)
    }
}

fn is_dot_name(name: &str) -> bool {
    name == "." || name == ".."
}

/// Drop `.` segments and fold `..` into its parent without touching the disk
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}
