//! Package reconciliation against the dpkg database
//!
//! The declared package set is diffed against what is installed; only the
//! missing delta is installed, behind a confirmation. A separate confirmation
//! gates the optional index refresh + full upgrade, and declining that one
//! skips the upgrade without aborting the run.

use console::Style;

use crate::confirm::Confirmer;
use crate::error::{Result, SetupError};
use crate::exec::Cmd;
use crate::settings::Settings;

/// Capability for querying and mutating the OS package database
pub trait PackageManager {
    fn is_installed(&self, package: &str) -> Result<bool>;
    fn install(&self, packages: &[String]) -> Result<()>;
    fn refresh_index(&self) -> Result<()>;
    fn full_upgrade(&self) -> Result<()>;
}

/// Production adapter shelling out to apt-get / dpkg-query
pub struct Apt;

impl PackageManager for Apt {
    fn is_installed(&self, package: &str) -> Result<bool> {
        // dpkg-query exits nonzero for unknown packages; that is an answer,
        // not a failure
        let (ok, stdout) = Cmd::new("dpkg-query")
            .args(["-W", "-f", "${Status}"])
            .arg(package)
            .read()?;
        Ok(ok && stdout.contains("install ok installed"))
    }

    fn install(&self, packages: &[String]) -> Result<()> {
        Cmd::new("apt-get")
            .args(["install", "-y"])
            .args(packages.iter().cloned())
            .error_msg("package installation failed")
            .run_interactive()
    }

    fn refresh_index(&self) -> Result<()> {
        Cmd::new("apt-get").arg("update").run_interactive()
    }

    fn full_upgrade(&self) -> Result<()> {
        Cmd::new("apt-get")
            .args(["full-upgrade", "-y"])
            .run_interactive()
    }
}

/// Install exactly the missing subset of the declared package set
pub fn reconcile(
    settings: &Settings,
    manager: &dyn PackageManager,
    confirmer: &dyn Confirmer,
) -> Result<()> {
    let mut missing = Vec::new();
    for package in &settings.packages {
        if !manager.is_installed(package)? {
            missing.push(package.clone());
        }
    }

    if missing.is_empty() {
        println!(
            "All {} required packages already installed",
            settings.packages.len()
        );
    } else {
        println!("Missing packages:");
        for package in &missing {
            println!("  - {package}");
        }
        let question = format!("Install {} missing package(s)?", missing.len());
        if !confirmer.confirm(&question)? {
            return Err(SetupError::UserAborted {
                step: "package installation".to_string(),
            });
        }
        manager.install(&missing)?;
        println!(
            "{} Installed {} package(s)",
            Style::new().green().apply_to("ok:"),
            missing.len()
        );
    }

    if confirmer.confirm("Refresh the package index and apply a full system upgrade?")? {
        manager.refresh_index()?;
        manager.full_upgrade()?;
    } else {
        println!("Skipping system upgrade");
    }

    Ok(())
}
