//! Warning accumulation and the final run summary
//!
//! Non-fatal conditions are printed as they happen and collected here, then
//! recapped together with the service liveness probes at the end of the run.
//! The summary is advisory only; a degraded probe never changes the exit
//! code.

use console::Style;

/// Result of one service liveness probe
#[derive(Debug, Clone)]
pub struct ServiceProbe {
    pub unit: String,
    pub active: bool,
}

/// Running tally of warnings and probe results for one provisioning pass
#[derive(Debug, Default)]
pub struct Summary {
    warnings: Vec<String>,
    probes: Vec<ServiceProbe>,
}

impl Summary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Print a styled warning now and keep it for the final recap
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        println!(
            "{} {message}",
            Style::new().yellow().bold().apply_to("warning:")
        );
        self.warnings.push(message);
    }

    pub fn record_probe(&mut self, unit: &str, active: bool) {
        self.probes.push(ServiceProbe {
            unit: unit.to_string(),
            active,
        });
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Full success: every probed service active and no warnings recorded
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && self.probes.iter().all(|p| p.active)
    }

    pub fn all_active(&self) -> bool {
        self.probes.iter().all(|p| p.active)
    }

    /// Print the final report
    pub fn print_final(&self) {
        let bold = Style::new().bold();
        println!();
        println!("{}", bold.apply_to("=== Provisioning summary ==="));

        for probe in &self.probes {
            if probe.active {
                println!(
                    "  {} {}",
                    Style::new().green().apply_to("[active]  "),
                    probe.unit
                );
            } else {
                println!(
                    "  {} {}   inspect with: journalctl -u {}",
                    Style::new().red().apply_to("[inactive]"),
                    probe.unit,
                    probe.unit
                );
            }
        }

        if !self.warnings.is_empty() {
            println!();
            println!("{}", bold.apply_to("Warnings:"));
            for warning in &self.warnings {
                println!("  - {warning}");
            }
        }

        println!();
        if self.is_clean() {
            println!(
                "{}",
                Style::new()
                    .green()
                    .bold()
                    .apply_to("Provisioning complete")
            );
        } else if self.all_active() {
            println!(
                "{}",
                Style::new()
                    .yellow()
                    .bold()
                    .apply_to("Provisioning complete with warnings")
            );
        } else {
            println!(
                "{}",
                Style::new()
                    .yellow()
                    .bold()
                    .apply_to("Provisioning finished, but not every service is running")
            );
        }
    }
}
