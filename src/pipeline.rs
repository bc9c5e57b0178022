//! The provisioning pipeline
//!
//! One strictly sequential pass:
//! 1. Preflight checks and early resolution of the local input files
//! 2. Package reconciliation
//! 3. Artifact download and extraction into a scratch directory
//! 4. Layout installation (web root, app dir, executable)
//! 5. Reverse proxy config materialization
//! 6. TLS certificate provisioning
//! 7. Service registration
//! 8. Optional USB gadget-serial boot configuration
//! 9. Service liveness post-check
//!
//! A fatal error stops the run immediately; there is no rollback. Reruns
//! rely on each step's idempotence checks to skip completed work.

use std::path::{Path, PathBuf};

use console::Style;

use crate::artifact::{self, ArchiveFormat, RemoteArtifact};
use crate::confirm::Confirmer;
use crate::error::Result;
use crate::extract::ArchiveExtractor;
use crate::fetch::Downloader;
use crate::gadget;
use crate::layout::{self, UiOutcome};
use crate::materialize::{self, InstallOutcome};
use crate::packages::{self, PackageManager};
use crate::preflight::{self, HostFacts};
use crate::report::Summary;
use crate::service::{self, ServiceController};
use crate::settings::Settings;
use crate::tls::{self, CertOutcome, CertificateGenerator};

/// Everything the pipeline needs from the host, behind narrow interfaces
pub struct Capabilities<'a> {
    pub packages: &'a dyn PackageManager,
    pub downloader: &'a dyn Downloader,
    pub extractor: &'a dyn ArchiveExtractor,
    pub certificates: &'a dyn CertificateGenerator,
    pub services: &'a dyn ServiceController,
    pub confirmer: &'a dyn Confirmer,
}

pub struct RunOptions {
    pub assume_yes: bool,
    /// Apply the gadget-serial step even in assume-yes mode
    pub gadget_serial: bool,
}

/// Run the whole pipeline, returning the summary for the final report
pub fn run(
    settings: &Settings,
    facts: &HostFacts,
    caps: &Capabilities<'_>,
    opts: &RunOptions,
) -> Result<Summary> {
    let mut summary = Summary::new();

    banner("Preflight");
    preflight::verify(settings, facts)?;
    let nginx_source = materialize::locate_required(
        &settings.input_dir,
        &settings.nginx_conf_name,
        &settings.config_fallback_dir,
    )?;
    let unit_source = materialize::locate_required(
        &settings.input_dir,
        &settings.unit_name,
        &settings.config_fallback_dir,
    )?;
    println!("Host checks passed");
    println!("Using {}", nginx_source.display());
    println!("Using {}", unit_source.display());

    banner("Packages");
    packages::reconcile(settings, caps.packages, caps.confirmer)?;

    banner("Artifacts");
    let scratch = tempfile::Builder::new()
        .prefix("picam-setup.")
        .tempdir()?;
    let ui = RemoteArtifact {
        url: settings.ui_archive_url.clone(),
        archive_name: settings.ui_archive_name.clone(),
        format: ArchiveFormat::Zip,
    };
    let streamer = RemoteArtifact {
        url: settings.streamer_url().to_string(),
        archive_name: settings.streamer_archive_name.clone(),
        format: ArchiveFormat::TarGz,
    };
    let ui_dir = fetch_and_extract(&ui, scratch.path(), "ui", caps)?;
    let streamer_dir = fetch_and_extract(&streamer, scratch.path(), "streamer", caps)?;

    banner("Layout");
    match layout::install_ui(&ui_dir, settings)? {
        UiOutcome::Installed => {
            println!("Browser assets installed to {}", settings.web_root.display());
        }
        UiOutcome::AssetsMissing => summary.warn(format!(
            "no '{}' directory in the UI bundle; web root left unchanged",
            settings.ui_asset_dir
        )),
    }
    layout::install_app_files(&ui_dir, settings)?;
    let resolved = artifact::resolve_executable(
        &streamer_dir,
        &settings.streamer_expected_name,
        &settings.streamer_final_name,
    )?;
    let exec_dest = layout::install_executable(&resolved, settings)?;
    println!("Installed {}", exec_dest.display());

    banner("Reverse proxy config");
    match materialize::install_with_backup(&nginx_source, &settings.nginx_conf_dest, caps.confirmer)?
    {
        InstallOutcome::Installed { backup } => {
            println!("Installed {}", settings.nginx_conf_dest.display());
            if let Some(backup) = backup {
                println!("  previous config saved at {}", backup.display());
            }
        }
        InstallOutcome::KeptExisting => summary.warn(format!(
            "kept existing nginx config at {}",
            settings.nginx_conf_dest.display()
        )),
    }

    banner("TLS certificate");
    match tls::ensure_certificate(settings, caps.certificates)? {
        CertOutcome::AlreadyPresent => println!("Existing key and certificate found, keeping them"),
        CertOutcome::Generated => println!(
            "Generated {} and {}",
            settings.tls_key_path.display(),
            settings.tls_cert_path.display()
        ),
    }

    banner("Service");
    service::register(
        settings,
        &unit_source,
        caps.services,
        caps.confirmer,
        &mut summary,
    )?;

    if !opts.assume_yes || opts.gadget_serial {
        banner("USB gadget serial (optional)");
        let changed = gadget::apply(settings, caps.confirmer, &mut summary)?;
        if changed {
            println!("A reboot is required for the gadget-serial changes to take effect");
            if !opts.assume_yes && caps.confirmer.confirm("Reboot now?")? {
                caps.services.reboot()?;
            }
        }
    }

    banner("Post-check");
    for unit in [settings.unit_name.as_str(), settings.proxy_service.as_str()] {
        let active = match caps.services.is_active(unit) {
            Ok(active) => active,
            Err(e) => {
                summary.warn(format!("could not probe {unit}: {e}"));
                false
            }
        };
        summary.record_probe(unit, active);
    }

    Ok(summary)
}

fn fetch_and_extract(
    artifact: &RemoteArtifact,
    scratch: &Path,
    label: &str,
    caps: &Capabilities<'_>,
) -> Result<PathBuf> {
    let archive_path = scratch.join(&artifact.archive_name);
    let extract_dir = scratch.join(label);

    println!("Downloading {}", artifact.url);
    caps.downloader.fetch(&artifact.url, &archive_path)?;
    caps.extractor
        .extract(&archive_path, &extract_dir, artifact.format)?;
    Ok(extract_dir)
}

fn banner(title: &str) {
    println!();
    println!("{}", Style::new().bold().apply_to(format!("=== {title} ===")));
}
