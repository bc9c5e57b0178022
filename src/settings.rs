//! Run configuration: every path, URL, name, and package the provisioner touches
//!
//! One immutable [`Settings`] value is built at startup and passed by reference
//! to every component; nothing reads ambient global state after that. All
//! fields can be overridden from a YAML file passed with `--config`, which
//! keeps the release pinning an explicit choice instead of something baked
//! into the code.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SetupError};

/// Complete run configuration for one provisioning pass
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Directory searched for local deployment files (nginx config, unit file)
    pub input_dir: PathBuf,
    /// Subdirectory of `input_dir` searched when a file is not at the top level
    pub config_fallback_dir: String,

    /// Runtime packages the streaming executable and proxy need
    pub packages: Vec<String>,
    /// Host commands that must resolve on PATH before anything runs
    pub required_commands: Vec<String>,

    /// Web UI release archive (zip, extracted flatly)
    pub ui_archive_url: String,
    pub ui_archive_name: String,
    /// Subdirectory of the UI archive holding the browser assets
    pub ui_asset_dir: String,

    /// Streaming executable release archive (tar.gz, structure preserved)
    pub streamer_archive_url: String,
    /// Upstream "latest" redirect for the streamer archive
    pub streamer_latest_url: String,
    pub streamer_archive_name: String,
    /// Follow the latest redirect instead of the pinned tag
    pub track_latest_streamer: bool,
    /// Name the executable carries inside the release archive
    pub streamer_expected_name: String,
    /// Name the executable is installed under
    pub streamer_final_name: String,

    /// Application directory receiving the executable and support files
    pub app_dir: PathBuf,
    /// Web root receiving the browser assets
    pub web_root: PathBuf,

    pub tls_key_path: PathBuf,
    pub tls_cert_path: PathBuf,
    pub cert_country: String,
    pub cert_state: String,
    pub cert_org: String,
    pub cert_org_unit: String,
    /// Host name used for the certificate common name (`<hostname>.local`)
    pub hostname: String,

    pub nginx_conf_name: String,
    pub nginx_conf_dest: PathBuf,
    pub unit_name: String,
    pub unit_dest: PathBuf,
    /// Reverse proxy service probed in the final report
    pub proxy_service: String,

    pub boot_config_path: PathBuf,
    pub boot_cmdline_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            config_fallback_dir: "config".to_string(),
            packages: vec![
                "nginx".to_string(),
                "libcamera0.2".to_string(),
                "libmosquitto1".to_string(),
                "pulseaudio".to_string(),
                "libavformat59".to_string(),
            ],
            required_commands: vec![
                "apt-get".to_string(),
                "dpkg-query".to_string(),
                "systemctl".to_string(),
                "openssl".to_string(),
                "tar".to_string(),
                "unzip".to_string(),
            ],
            ui_archive_url:
                "https://github.com/picam-project/picam-ui/releases/download/v0.9.2/picam-ui.zip"
                    .to_string(),
            ui_archive_name: "picam-ui.zip".to_string(),
            ui_asset_dir: "browser".to_string(),
            streamer_archive_url: "https://github.com/picam-project/pi-webrtc/releases/download/v1.0.4/pi-webrtc-v1.0.4_raspios-bookworm-arm64.tar.gz".to_string(),
            streamer_latest_url: "https://github.com/picam-project/pi-webrtc/releases/latest/download/pi-webrtc-raspios-bookworm-arm64.tar.gz".to_string(),
            streamer_archive_name: "pi-webrtc.tar.gz".to_string(),
            track_latest_streamer: false,
            streamer_expected_name: "pi_webrtc".to_string(),
            streamer_final_name: "pi-webrtc".to_string(),
            app_dir: PathBuf::from("/opt/picam"),
            web_root: PathBuf::from("/var/www/picam"),
            tls_key_path: PathBuf::from("/etc/ssl/private/picam.key"),
            tls_cert_path: PathBuf::from("/etc/ssl/certs/picam.crt"),
            cert_country: "US".to_string(),
            cert_state: "California".to_string(),
            cert_org: "Picam".to_string(),
            cert_org_unit: "Appliance".to_string(),
            hostname: detect_hostname(),
            nginx_conf_name: "picam.conf".to_string(),
            nginx_conf_dest: PathBuf::from("/etc/nginx/conf.d/picam.conf"),
            unit_name: "picam.service".to_string(),
            unit_dest: PathBuf::from("/etc/systemd/system/picam.service"),
            proxy_service: "nginx".to_string(),
            boot_config_path: PathBuf::from("/boot/firmware/config.txt"),
            boot_cmdline_path: PathBuf::from("/boot/firmware/cmdline.txt"),
        }
    }
}

impl Settings {
    /// Load settings, applying a YAML overlay file when one is given
    pub fn load(overlay: Option<&Path>) -> Result<Self> {
        match overlay {
            None => Ok(Self::default()),
            Some(path) => {
                let content =
                    fs::read_to_string(path).map_err(|e| SetupError::read_failed(path, &e))?;
                serde_yaml::from_str(&content).map_err(|e| SetupError::SettingsInvalid {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }

    /// URL the streamer archive is fetched from, honoring the pinning choice
    pub fn streamer_url(&self) -> &str {
        if self.track_latest_streamer {
            &self.streamer_latest_url
        } else {
            &self.streamer_archive_url
        }
    }

    /// Certificate common name, `<hostname>.local`
    pub fn common_name(&self) -> String {
        format!("{}.local", self.hostname)
    }

    /// Final installed path of the streaming executable
    pub fn executable_dest(&self) -> PathBuf {
        self.app_dir.join(&self.streamer_final_name)
    }
}

/// Best-effort host name lookup, falling back to the Raspberry Pi OS default
fn detect_hostname() -> String {
    fs::read_to_string("/etc/hostname")
        .map(|s| s.trim().to_string())
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "raspberrypi".to_string())
}
