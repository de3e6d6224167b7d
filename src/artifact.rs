//! Build output directory management
//!
//! The build directory is owned entirely by this tool: it is created on
//! demand, holds the single produced artifact, and is removed wholesale by
//! `clean`. Artifact naming (including the platform execution suffix) is
//! decided here and nowhere else.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::BuildError;

/// Execution environment of the produced artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Executables carry no suffix
    Unix,
    /// Executables need `.exe`
    Windows,
}

impl Platform {
    /// The platform this binary was compiled for
    pub fn host() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }

    /// Extension required on runnable files, if any
    pub fn execution_suffix(self) -> Option<&'static str> {
        match self {
            Platform::Windows => Some("exe"),
            Platform::Unix => None,
        }
    }
}

/// Outcome of cleaning the build directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanReport {
    /// Nothing existed at the path
    Absent,
    /// The directory was deleted
    Removed { path: PathBuf, size: u64 },
    /// Dry run: the directory would have been deleted
    WouldRemove { path: PathBuf, size: u64 },
}

/// Create `dir` and any missing parents
pub fn ensure(dir: &Path) -> Result<(), BuildError> {
    if dir.is_dir() {
        return Ok(());
    }
    if dir.exists() {
        return Err(BuildError::filesystem_message(
            dir,
            "path exists and is not a directory",
        ));
    }
    fs::create_dir_all(dir).map_err(|e| BuildError::filesystem(dir, e))
}

/// Recursively remove `dir`; an absent directory is not an error
pub fn clean(dir: &Path, dry_run: bool) -> Result<CleanReport, BuildError> {
    let metadata = match fs::symlink_metadata(dir) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(CleanReport::Absent),
        Err(e) => return Err(BuildError::filesystem(dir, e)),
    };

    if !metadata.is_dir() {
        return Err(BuildError::filesystem_message(
            dir,
            "not a directory; refusing to remove it",
        ));
    }

    let size = get_dir_size(dir);
    let path = dir.to_path_buf();

    if dry_run {
        return Ok(CleanReport::WouldRemove { path, size });
    }

    fs::remove_dir_all(dir).map_err(|e| BuildError::filesystem(dir, e))?;
    Ok(CleanReport::Removed { path, size })
}

/// Path of the artifact named `base_name` inside `dir`
pub fn resolve_artifact_path(dir: &Path, base_name: &str, platform: Platform) -> PathBuf {
    match platform.execution_suffix() {
        // "manc.v2" becomes "manc.v2.exe"
        Some(suffix) => dir.join(format!("{}.{}", base_name, suffix)),
        None => dir.join(base_name),
    }
}

/// Total size in bytes of the regular files below `path`
pub fn get_dir_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.metadata().ok())
        .filter(|metadata| metadata.is_file())
        .map(|metadata| metadata.len())
        .sum()
}

/// Human-readable byte count
pub fn format_size(size_bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = size_bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_idx])
}
