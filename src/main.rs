//! picam-setup - Raspberry Pi camera streaming appliance provisioner
//!
//! One linear pass that takes a fresh Raspberry Pi OS install to a running
//! camera streaming appliance: packages, release artifacts, TLS material,
//! reverse proxy config, and the systemd unit. Every mutation sits behind an
//! idempotence check, so re-running after a failure skips completed work.

use clap::Parser;

mod artifact;
mod cli;
mod confirm;
mod error;
mod exec;
mod extract;
mod fetch;
mod gadget;
mod layout;
mod materialize;
mod packages;
mod pipeline;
mod preflight;
mod report;
mod service;
mod settings;
#[cfg(test)]
mod test_support;
mod tls;

use cli::Cli;
use confirm::{AssumeYes, Confirmer, InteractiveConfirmer};
use error::Result;
use pipeline::{Capabilities, RunOptions};
use preflight::HostFacts;
use settings::Settings;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    settings.track_latest_streamer |= cli.latest;

    if cli.verbose {
        println!("Application directory: {}", settings.app_dir.display());
        println!("Web root:              {}", settings.web_root.display());
        println!("UI bundle:             {}", settings.ui_archive_url);
        println!("Streamer:              {}", settings.streamer_url());
    }

    let facts = HostFacts::probe();
    let confirmer: Box<dyn Confirmer> = if cli.yes {
        Box::new(AssumeYes)
    } else {
        Box::new(InteractiveConfirmer)
    };

    let manager = packages::Apt;
    let downloader = fetch::HttpDownloader;
    let extractor = extract::CliExtractor;
    let certificates = tls::OpensslGenerator;
    let services = service::Systemctl;

    let caps = Capabilities {
        packages: &manager,
        downloader: &downloader,
        extractor: &extractor,
        certificates: &certificates,
        services: &services,
        confirmer: confirmer.as_ref(),
    };
    let opts = RunOptions {
        assume_yes: cli.yes,
        gadget_serial: cli.gadget_serial,
    };

    let summary = pipeline::run(&settings, &facts, &caps, &opts)?;
    summary.print_final();

    Ok(())
}
