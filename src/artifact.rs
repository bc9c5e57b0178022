//! Release artifact description and executable resolution
//!
//! Upstream release archives have drifted in layout and naming over time, so
//! the executable is located by a fixed search order: exact expected name at
//! the extraction root, exact final name at the root, then a recursive search
//! for either name among executable files. A hit under the expected name is
//! renamed in place before being reported.
//!
//! The search order itself is a pure function over a directory listing, so it
//! is testable against synthetic trees without touching the filesystem.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Result, SetupError};

/// Container format of a release archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// Extracted flatly
    Zip,
    /// Extracted preserving internal directory structure
    TarGz,
}

/// One downloadable release archive
#[derive(Debug, Clone)]
pub struct RemoteArtifact {
    pub url: String,
    pub archive_name: String,
    pub format: ArchiveFormat,
}

/// One entry of an extraction-directory listing, path relative to the root
#[derive(Debug, Clone)]
pub struct ListingEntry {
    pub path: PathBuf,
    pub executable: bool,
}

impl ListingEntry {
    pub fn new(path: impl Into<PathBuf>, executable: bool) -> Self {
        Self {
            path: path.into(),
            executable,
        }
    }

    fn at_root(&self) -> bool {
        self.path.components().count() == 1
    }

    fn file_name_is(&self, name: &str) -> bool {
        self.path.file_name().is_some_and(|f| f == name)
    }
}

/// Outcome of the search: where the file is, and whether it still carries the
/// expected (pre-rename) name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    NeedsRename(PathBuf),
    Ready(PathBuf),
}

/// Apply the search order to a listing. First match wins.
pub fn resolve_in_listing(
    entries: &[ListingEntry],
    expected: &str,
    final_name: &str,
) -> Option<Resolution> {
    if let Some(e) = entries.iter().find(|e| e.at_root() && e.file_name_is(expected)) {
        return Some(Resolution::NeedsRename(e.path.clone()));
    }
    if let Some(e) = entries.iter().find(|e| e.at_root() && e.file_name_is(final_name)) {
        return Some(Resolution::Ready(e.path.clone()));
    }
    if let Some(e) = entries
        .iter()
        .find(|e| e.executable && e.file_name_is(expected))
    {
        return Some(Resolution::NeedsRename(e.path.clone()));
    }
    if let Some(e) = entries
        .iter()
        .find(|e| e.executable && e.file_name_is(final_name))
    {
        return Some(Resolution::Ready(e.path.clone()));
    }
    None
}

/// Resolve the streaming executable under an extraction directory, renaming a
/// hit under the expected name to the final name. No match is fatal.
pub fn resolve_executable(dir: &Path, expected: &str, final_name: &str) -> Result<PathBuf> {
    let listing = scan_dir(dir)?;
    match resolve_in_listing(&listing, expected, final_name) {
        Some(Resolution::NeedsRename(rel)) => {
            let from = dir.join(&rel);
            let to = from.with_file_name(final_name);
            fs::rename(&from, &to).map_err(|e| SetupError::write_failed(&to, &e))?;
            Ok(to)
        }
        Some(Resolution::Ready(rel)) => Ok(dir.join(rel)),
        None => Err(SetupError::ArtifactMissing {
            name: final_name.to_string(),
            dir: dir.display().to_string(),
        }),
    }
}

/// List all files under a directory, relative paths, stable order
fn scan_dir(dir: &Path) -> Result<Vec<ListingEntry>> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| SetupError::Io {
            message: e.to_string(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(dir)
            .map_err(|e| SetupError::Io {
                message: e.to_string(),
            })?
            .to_path_buf();
        let executable = entry
            .metadata()
            .map(|m| m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false);
        entries.push(ListingEntry::new(rel, executable));
    }
    Ok(entries)
}
