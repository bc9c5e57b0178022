//! Locating local deployment files and installing them to system paths
//!
//! Search order is fixed: the input directory itself, then its `config/`
//! subdirectory. A pre-existing destination is backed up to a timestamped
//! sibling before the overwrite is offered; declining keeps the existing file
//! and the run continues.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::confirm::Confirmer;
use crate::error::{Result, SetupError};

/// What happened to the destination file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Copied into place; carries the backup path when one was taken
    Installed { backup: Option<PathBuf> },
    /// Overwrite declined; existing destination left untouched
    KeptExisting,
}

/// Find a file by its fallback search order
pub fn locate(base: &Path, name: &str, fallback_subdir: &str) -> Option<PathBuf> {
    let direct = base.join(name);
    if direct.is_file() {
        return Some(direct);
    }
    let fallback = base.join(fallback_subdir).join(name);
    if fallback.is_file() {
        return Some(fallback);
    }
    None
}

/// Like [`locate`], but a miss is fatal for the run
pub fn locate_required(base: &Path, name: &str, fallback_subdir: &str) -> Result<PathBuf> {
    locate(base, name, fallback_subdir).ok_or_else(|| SetupError::ConfigFileMissing {
        name: name.to_string(),
        searched: format!(
            "{}, {}",
            base.join(name).display(),
            base.join(fallback_subdir).join(name).display()
        ),
    })
}

/// Copy a pre-existing file to a timestamped sibling path
pub fn backup_existing(path: &Path) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stamp = Local::now().format("%Y%m%d-%H%M%S");
    let backup = path.with_file_name(format!("{file_name}.bak.{stamp}"));
    fs::copy(path, &backup).map_err(|e| SetupError::write_failed(&backup, &e))?;
    Ok(backup)
}

/// Install a file to a system path with backup-and-confirm overwrite
/// semantics. A fresh destination is written unconditionally.
pub fn install_with_backup(
    source: &Path,
    dest: &Path,
    confirmer: &dyn Confirmer,
) -> Result<InstallOutcome> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| SetupError::write_failed(parent, &e))?;
    }

    if !dest.exists() {
        fs::copy(source, dest).map_err(|e| SetupError::write_failed(dest, &e))?;
        return Ok(InstallOutcome::Installed { backup: None });
    }

    let backup = backup_existing(dest)?;
    let question = format!(
        "{} already exists (backed up to {}). Overwrite?",
        dest.display(),
        backup.display()
    );
    if !confirmer.confirm(&question)? {
        return Ok(InstallOutcome::KeptExisting);
    }

    fs::copy(source, dest).map_err(|e| SetupError::write_failed(dest, &e))?;
    Ok(InstallOutcome::Installed {
        backup: Some(backup),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedConfirmer;

    #[test]
    fn test_locate_prefers_direct_hit() {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir_all(temp.path().join("config")).unwrap();
        fs::write(temp.path().join("picam.conf"), "direct").unwrap();
        fs::write(temp.path().join("config/picam.conf"), "fallback").unwrap();

        let found = locate(temp.path(), "picam.conf", "config").unwrap();
        assert_eq!(found, temp.path().join("picam.conf"));
    }

    #[test]
    fn test_locate_falls_back_to_subdir() {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir_all(temp.path().join("config")).unwrap();
        fs::write(temp.path().join("config/picam.conf"), "fallback").unwrap();

        let found = locate(temp.path(), "picam.conf", "config").unwrap();
        assert_eq!(found, temp.path().join("config/picam.conf"));
    }

    #[test]
    fn test_locate_required_reports_both_candidates() {
        let temp = tempfile::tempdir().unwrap();

        let err = locate_required(temp.path(), "picam.service", "config").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("picam.service"));
        assert!(msg.contains("config"));
    }

    #[test]
    fn test_fresh_destination_installed_without_backup() {
        let temp = tempfile::tempdir().unwrap();
        let source = temp.path().join("picam.conf");
        let dest = temp.path().join("etc/picam.conf");
        fs::write(&source, "server {}").unwrap();

        let confirmer = ScriptedConfirmer::new(&[]);
        let outcome = install_with_backup(&source, &dest, &confirmer).unwrap();

        assert_eq!(outcome, InstallOutcome::Installed { backup: None });
        assert_eq!(fs::read_to_string(&dest).unwrap(), "server {}");
    }

    #[test]
    fn test_existing_destination_backed_up_then_overwritten() {
        let temp = tempfile::tempdir().unwrap();
        let source = temp.path().join("picam.conf");
        let dest = temp.path().join("etc/picam.conf");
        fs::create_dir_all(dest.parent().unwrap()).unwrap();
        fs::write(&source, "new contents").unwrap();
        fs::write(&dest, "old contents").unwrap();

        let confirmer = ScriptedConfirmer::new(&[true]);
        let outcome = install_with_backup(&source, &dest, &confirmer).unwrap();

        let InstallOutcome::Installed {
            backup: Some(backup),
        } = outcome
        else {
            panic!("expected an install with backup, got {outcome:?}");
        };
        assert_eq!(fs::read_to_string(&dest).unwrap(), "new contents");
        assert_eq!(fs::read_to_string(&backup).unwrap(), "old contents");
        assert!(
            backup
                .file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with("picam.conf.bak.")
        );
    }

    #[test]
    fn test_declined_overwrite_keeps_existing() {
        let temp = tempfile::tempdir().unwrap();
        let source = temp.path().join("picam.conf");
        let dest = temp.path().join("etc/picam.conf");
        fs::create_dir_all(dest.parent().unwrap()).unwrap();
        fs::write(&source, "new contents").unwrap();
        fs::write(&dest, "old contents").unwrap();

        let confirmer = ScriptedConfirmer::new(&[false]);
        let outcome = install_with_backup(&source, &dest, &confirmer).unwrap();

        assert_eq!(outcome, InstallOutcome::KeptExisting);
        assert_eq!(fs::read_to_string(&dest).unwrap(), "old contents");
    }
}
