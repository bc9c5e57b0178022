//! Archive extraction via the host's unzip / tar
//!
//! Zip archives are extracted flatly; tar.gz archives keep their internal
//! directory structure with no component stripping. Failures surface as
//! `ArchiveFailed` with the tool's stderr attached.

use std::fs;
use std::path::Path;

use crate::artifact::ArchiveFormat;
use crate::error::{Result, SetupError};
use crate::exec::Cmd;

/// Capability for unpacking a downloaded archive
pub trait ArchiveExtractor {
    fn extract(&self, archive: &Path, dest: &Path, format: ArchiveFormat) -> Result<()>;
}

/// Production adapter shelling out to the host tools
pub struct CliExtractor;

impl ArchiveExtractor for CliExtractor {
    fn extract(&self, archive: &Path, dest: &Path, format: ArchiveFormat) -> Result<()> {
        let archive_error = |reason: String| SetupError::ArchiveFailed {
            archive: archive.display().to_string(),
            reason,
        };

        fs::create_dir_all(dest).map_err(|e| archive_error(e.to_string()))?;

        let result = match format {
            ArchiveFormat::Zip => Cmd::new("unzip")
                .args(["-o", "-q"])
                .arg_path(archive)
                .arg("-d")
                .arg_path(dest)
                .run(),
            ArchiveFormat::TarGz => Cmd::new("tar")
                .arg("-xzf")
                .arg_path(archive)
                .arg("-C")
                .arg_path(dest)
                .run(),
        };

        result.map_err(|e| archive_error(e.to_string()))
    }
}
