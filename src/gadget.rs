//! Optional USB gadget-serial personality
//!
//! Two idempotent text mutations, each individually confirmed: the dwc2
//! overlay directive in the boot config, and the module-load tokens in the
//! kernel command line. Both need a reboot to take effect; offering that
//! reboot is the pipeline's job.
//!
//! The mutations themselves are pure string transforms returning `None` when
//! the file is already configured.

use std::fs;
use std::path::Path;

use crate::confirm::Confirmer;
use crate::error::{Result, SetupError};
use crate::materialize;
use crate::report::Summary;
use crate::settings::Settings;

pub const OVERLAY_DIRECTIVE: &str = "dtoverlay=dwc2";
pub const OVERLAY_SECTION: &str = "[all]";
pub const CMDLINE_TOKENS: &str = "modules-load=dwc2,g_serial";
pub const CMDLINE_ANCHOR: &str = "rootwait";

/// Insert the overlay directive after the `[all]` section header, appending a
/// new section when the header is absent. `None` when already present.
pub fn add_overlay_directive(content: &str) -> Option<String> {
    if content.lines().any(|l| l.trim() == OVERLAY_DIRECTIVE) {
        return None;
    }

    let mut lines: Vec<String> = Vec::new();
    let mut inserted = false;
    for line in content.lines() {
        lines.push(line.to_string());
        if !inserted && line.trim() == OVERLAY_SECTION {
            lines.push(OVERLAY_DIRECTIVE.to_string());
            inserted = true;
        }
    }
    if !inserted {
        lines.push(OVERLAY_SECTION.to_string());
        lines.push(OVERLAY_DIRECTIVE.to_string());
    }

    Some(lines.join("\n") + "\n")
}

/// Insert the module-load tokens immediately after the `rootwait` anchor in
/// the single command line, at the end when the anchor is absent. `None` when
/// already present.
pub fn add_cmdline_tokens(content: &str) -> Option<String> {
    if content.contains(CMDLINE_TOKENS) {
        return None;
    }

    let mut tokens: Vec<&str> = content.split_whitespace().collect();
    match tokens.iter().position(|t| *t == CMDLINE_ANCHOR) {
        Some(idx) => tokens.insert(idx + 1, CMDLINE_TOKENS),
        None => tokens.push(CMDLINE_TOKENS),
    }

    Some(tokens.join(" ") + "\n")
}

/// Apply both mutations behind their own confirmations; returns whether
/// anything changed (and a reboot is therefore pending)
pub fn apply(settings: &Settings, confirmer: &dyn Confirmer, summary: &mut Summary) -> Result<bool> {
    let overlay_changed = mutate_file(
        &settings.boot_config_path,
        add_overlay_directive,
        &format!(
            "Add '{OVERLAY_DIRECTIVE}' to {}?",
            settings.boot_config_path.display()
        ),
        confirmer,
        summary,
    )?;

    let cmdline_changed = mutate_file(
        &settings.boot_cmdline_path,
        add_cmdline_tokens,
        &format!(
            "Add '{CMDLINE_TOKENS}' to {}?",
            settings.boot_cmdline_path.display()
        ),
        confirmer,
        summary,
    )?;

    Ok(overlay_changed || cmdline_changed)
}

fn mutate_file(
    path: &Path,
    transform: fn(&str) -> Option<String>,
    question: &str,
    confirmer: &dyn Confirmer,
    summary: &mut Summary,
) -> Result<bool> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            summary.warn(format!("cannot read {}: {e}", path.display()));
            return Ok(false);
        }
    };

    let Some(updated) = transform(&content) else {
        println!("{} already configured", path.display());
        return Ok(false);
    };

    if !confirmer.confirm(question)? {
        println!("Leaving {} unchanged", path.display());
        return Ok(false);
    }

    let backup = materialize::backup_existing(path)?;
    fs::write(path, updated).map_err(|e| SetupError::write_failed(path, &e))?;
    println!(
        "Updated {} (previous contents at {})",
        path.display(),
        backup.display()
    );
    Ok(true)
}
