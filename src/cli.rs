//! CLI definition using clap derive API
//!
//! One top-to-bottom run, no subcommands; interactivity happens through the
//! confirmation prompts, and `--yes` substitutes the assume-yes confirmer
//! for unattended provisioning.

use clap::Parser;
use clap::builder::{Styles, styling::AnsiColor};
use std::path::PathBuf;

/// picam-setup - Raspberry Pi camera streaming appliance provisioner
#[derive(Parser, Debug)]
#[command(
    name = "picam-setup",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Provision a Raspberry Pi as a camera streaming appliance",
    long_about = "picam-setup installs the OS packages, web UI bundle, WebRTC streaming \
                  executable, TLS certificate, nginx reverse proxy config, and systemd unit \
                  that turn a Raspberry Pi into a camera streaming appliance. Run it as root \
                  from the directory containing the deployment files.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  sudo picam-setup                  \x1b[90m# Interactive provisioning run\x1b[0m\n   \
                  sudo picam-setup --yes            \x1b[90m# Unattended, answers yes everywhere\x1b[0m\n   \
                  sudo picam-setup --latest         \x1b[90m# Track the latest streamer release\x1b[0m\n   \
                  sudo picam-setup -c site.yaml     \x1b[90m# Override paths/URLs from a file\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Answer yes to every confirmation prompt (the reboot offer is never taken)
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Fetch the streaming executable from the latest upstream release instead
    /// of the pinned tag
    #[arg(long)]
    pub latest: bool,

    /// Apply the USB gadget-serial boot configuration even with --yes
    #[arg(long)]
    pub gadget_serial: bool,

    /// Settings overlay file (YAML)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short = 'v')]
    pub verbose: bool,
}
