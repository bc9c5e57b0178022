//! Placement of extracted artifact contents into the canonical layout
//!
//! Browser assets go to the web root, everything else from the UI bundle to
//! the application directory, and the resolved streaming executable to its
//! fixed name with the executable bit set. Missing browser assets are the one
//! soft spot: the appliance still streams without its bundled UI.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use crate::error::{Result, SetupError};
use crate::settings::Settings;

/// Whether the optional browser assets were found and installed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiOutcome {
    Installed,
    AssetsMissing,
}

/// Copy a directory tree, creating the destination as needed
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    if !dst.exists() {
        fs::create_dir_all(dst)?;
    }

    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }

    Ok(())
}

/// Install the browser asset subdirectory into the web root
pub fn install_ui(extracted: &Path, settings: &Settings) -> Result<UiOutcome> {
    let assets = extracted.join(&settings.ui_asset_dir);
    if !assets.is_dir() {
        return Ok(UiOutcome::AssetsMissing);
    }

    copy_dir_recursive(&assets, &settings.web_root)
        .map_err(|e| SetupError::write_failed(&settings.web_root, &e))?;
    Ok(UiOutcome::Installed)
}

/// Install every top-level entry of the extraction directory except the
/// browser asset subdirectory into the application directory
pub fn install_app_files(extracted: &Path, settings: &Settings) -> Result<()> {
    fs::create_dir_all(&settings.app_dir)
        .map_err(|e| SetupError::write_failed(&settings.app_dir, &e))?;

    for entry in fs::read_dir(extracted).map_err(|e| SetupError::read_failed(extracted, &e))? {
        let entry = entry.map_err(|e| SetupError::read_failed(extracted, &e))?;
        if entry.file_name().to_str() == Some(settings.ui_asset_dir.as_str()) {
            continue;
        }

        let src_path = entry.path();
        let dst_path = settings.app_dir.join(entry.file_name());
        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)
                .map_err(|e| SetupError::write_failed(&dst_path, &e))?;
        } else {
            fs::copy(&src_path, &dst_path)
                .map_err(|e| SetupError::write_failed(&dst_path, &e))
                .map(|_| ())?;
        }
    }

    Ok(())
}

/// Install the resolved executable under its final name, mode 0755
pub fn install_executable(resolved: &Path, settings: &Settings) -> Result<PathBuf> {
    fs::create_dir_all(&settings.app_dir)
        .map_err(|e| SetupError::write_failed(&settings.app_dir, &e))?;

    let dest = settings.executable_dest();
    fs::copy(resolved, &dest).map_err(|e| SetupError::write_failed(&dest, &e))?;
    fs::set_permissions(&dest, fs::Permissions::from_mode(0o755))
        .map_err(|e| SetupError::write_failed(&dest, &e))?;
    Ok(dest)
}
