//! Preflight validation of the host before anything is mutated
//!
//! Checks run in order: privilege, platform identity, architecture, then the
//! required-command sweep. Command misses are aggregated into a single report
//! instead of failing on the first one, so the operator fixes the host in one
//! pass.

use std::fs;

use crate::error::{Result, SetupError};
use crate::settings::Settings;

/// Vendor marker expected in the device-tree model string
pub const MODEL_MARKER: &str = "Raspberry Pi";
/// Machine architecture the streaming executable is built for
pub const REQUIRED_ARCH: &str = "aarch64";

const MODEL_PATH: &str = "/proc/device-tree/model";

/// Host identity gathered once at startup
#[derive(Debug, Clone)]
pub struct HostFacts {
    pub euid: u32,
    /// Device-tree model string, empty when unreadable
    pub model: String,
    pub arch: String,
}

impl HostFacts {
    /// Probe the running host
    pub fn probe() -> Self {
        // SAFETY: geteuid has no preconditions and cannot fail
        let euid = unsafe { libc::geteuid() };
        let model = fs::read_to_string(MODEL_PATH)
            .map(|s| s.trim_matches('\0').trim().to_string())
            .unwrap_or_default();
        Self {
            euid,
            model,
            arch: std::env::consts::ARCH.to_string(),
        }
    }
}

/// Run every preflight check against the probed facts
pub fn verify(settings: &Settings, facts: &HostFacts) -> Result<()> {
    check_privilege(facts)?;
    check_platform(facts)?;
    check_commands(&settings.required_commands)?;
    Ok(())
}

fn check_privilege(facts: &HostFacts) -> Result<()> {
    if facts.euid == 0 {
        Ok(())
    } else {
        Err(SetupError::NotRoot { euid: facts.euid })
    }
}

fn check_platform(facts: &HostFacts) -> Result<()> {
    if !facts.model.contains(MODEL_MARKER) {
        let detail = if facts.model.is_empty() {
            "no device-tree model reported".to_string()
        } else {
            format!("device-tree model is '{}'", facts.model)
        };
        return Err(SetupError::UnsupportedPlatform { detail });
    }
    if facts.arch != REQUIRED_ARCH {
        return Err(SetupError::UnsupportedPlatform {
            detail: format!("architecture is '{}', need '{REQUIRED_ARCH}'", facts.arch),
        });
    }
    Ok(())
}

fn check_commands(required: &[String]) -> Result<()> {
    let missing: Vec<&str> = required
        .iter()
        .filter(|name| which::which(name.as_str()).is_err())
        .map(String::as_str)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(SetupError::MissingCommands {
            commands: missing.join(", "),
        })
    }
}
