//! Systemd unit installation and service control
//!
//! Before the unit file is installed, its content is checked for a reference
//! to the installed executable path; a mismatch is advisory and can be
//! overridden. The reload/enable/start sequence has no rollback: a failure
//! partway is recorded as a warning and shows up in the final report.

use std::fs;

use crate::confirm::Confirmer;
use crate::error::{Result, SetupError};
use crate::exec::Cmd;
use crate::materialize::{self, InstallOutcome};
use crate::report::Summary;
use crate::settings::Settings;

/// Capability for driving the service manager
pub trait ServiceController {
    fn daemon_reload(&self) -> Result<()>;
    fn enable(&self, unit: &str) -> Result<()>;
    fn start(&self, unit: &str) -> Result<()>;
    fn is_active(&self, unit: &str) -> Result<bool>;
    fn reboot(&self) -> Result<()>;
}

/// Production adapter shelling out to systemctl
pub struct Systemctl;

impl ServiceController for Systemctl {
    fn daemon_reload(&self) -> Result<()> {
        Cmd::new("systemctl").arg("daemon-reload").run()
    }

    fn enable(&self, unit: &str) -> Result<()> {
        Cmd::new("systemctl").arg("enable").arg(unit).run()
    }

    fn start(&self, unit: &str) -> Result<()> {
        Cmd::new("systemctl").arg("start").arg(unit).run()
    }

    fn is_active(&self, unit: &str) -> Result<bool> {
        Cmd::new("systemctl")
            .args(["is-active", "--quiet"])
            .arg(unit)
            .success()
    }

    fn reboot(&self) -> Result<()> {
        Cmd::new("systemctl").arg("reboot").run()
    }
}

/// Advisory check that the unit content references the executable path
pub fn unit_references_executable(unit_content: &str, settings: &Settings) -> bool {
    unit_content.contains(&settings.executable_dest().display().to_string())
}

/// Install the unit file, then reload, enable, and start it
pub fn register(
    settings: &Settings,
    unit_source: &std::path::Path,
    controller: &dyn ServiceController,
    confirmer: &dyn Confirmer,
    summary: &mut Summary,
) -> Result<()> {
    let content =
        fs::read_to_string(unit_source).map_err(|e| SetupError::read_failed(unit_source, &e))?;

    if !unit_references_executable(&content, settings) {
        summary.warn(format!(
            "{} does not reference {}",
            unit_source.display(),
            settings.executable_dest().display()
        ));
        if !confirmer.confirm("Unit file does not reference the installed executable. Install it anyway?")? {
            return Err(SetupError::UserAborted {
                step: "service unit installation".to_string(),
            });
        }
    }

    match materialize::install_with_backup(unit_source, &settings.unit_dest, confirmer)? {
        InstallOutcome::Installed { backup } => {
            println!("Installed unit file to {}", settings.unit_dest.display());
            if let Some(backup) = backup {
                println!("  previous unit saved at {}", backup.display());
            }
        }
        InstallOutcome::KeptExisting => {
            summary.warn(format!(
                "kept existing unit file at {}",
                settings.unit_dest.display()
            ));
        }
    }

    // No rollback between these; partial failure surfaces in the final report
    if let Err(e) = controller.daemon_reload() {
        summary.warn(format!("daemon-reload failed: {e}"));
    }
    if let Err(e) = controller.enable(&settings.unit_name) {
        summary.warn(format!("enable {} failed: {e}", settings.unit_name));
    }
    if let Err(e) = controller.start(&settings.unit_name) {
        summary.warn(format!("start {} failed: {e}", settings.unit_name));
    }

    Ok(())
}
