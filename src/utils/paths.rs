//! Path utilities

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Absolute project root: `dir` if given, else the current directory
pub fn resolve_project_root(dir: Option<&Path>) -> Result<PathBuf> {
    let dir = match dir {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    dir.canonicalize()
        .with_context(|| format!("Project directory not found: {}", dir.display()))
}
