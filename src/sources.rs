//! Source file discovery

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::BuildError;
use crate::utils::terminal::print_verbose;

/// Directory levels followed below the source root
pub const MAX_DEPTH: usize = 64;

/// Non-empty, ordered list of source files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSet {
    paths: Vec<PathBuf>,
}

impl SourceSet {
    /// Returns `None` for an empty list
    pub fn from_paths(paths: Vec<PathBuf>) -> Option<Self> {
        if paths.is_empty() {
            None
        } else {
            Some(Self { paths })
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
        self.paths.iter()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn as_slice(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Paths relative to `root` where possible, for display
    pub fn display_names(&self, root: &Path) -> Vec<String> {
        self.paths
            .iter()
            .map(|p| p.strip_prefix(root).unwrap_or(p).display().to_string())
            .collect()
    }
}

impl<'a> IntoIterator for &'a SourceSet {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}

/// Collect every file under `root` whose name ends with `extension`.
///
/// Entries are visited depth-first with siblings sorted by file name, so the
/// result is identical for an unchanged tree. Symlinks are followed; a link
/// leading back to one of its ancestors is skipped instead of walked again,
/// and so is a link whose target no longer exists.
pub fn discover(root: &Path, extension: &str, verbose: bool) -> Result<SourceSet, BuildError> {
    let no_sources = || BuildError::NoSourcesFound {
        root: root.to_path_buf(),
        extension: extension.to_string(),
    };

    if !root.is_dir() {
        return Err(no_sources());
    }

    let mut paths = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(true)
        .max_depth(MAX_DEPTH)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.loop_ancestor().is_some() => {
                if let Some(path) = e.path() {
                    print_verbose(verbose, &format!("Skipping symlink loop: {}", path.display()));
                }
                continue;
            }
            Err(e) if is_dangling_link(&e) => {
                if let Some(path) = e.path() {
                    print_verbose(verbose, &format!("Skipping broken symlink: {}", path.display()));
                }
                continue;
            }
            Err(e) => {
                let path = e.path().unwrap_or(root).to_path_buf();
                let message = e.to_string();
                return Err(match e.into_io_error() {
                    Some(io) => BuildError::filesystem(path, io),
                    None => BuildError::filesystem_message(path, message),
                });
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        if entry.file_name().to_string_lossy().ends_with(extension) {
            paths.push(entry.into_path());
        }
    }

    SourceSet::from_paths(paths).ok_or_else(no_sources)
}

fn is_dangling_link(err: &walkdir::Error) -> bool {
    let target_missing = err
        .io_error()
        .map_or(false, |io| io.kind() == ErrorKind::NotFound);
    target_missing
        && err
            .path()
            .and_then(|path| fs::symlink_metadata(path).ok())
            .map_or(false, |metadata| metadata.file_type().is_symlink())
}
