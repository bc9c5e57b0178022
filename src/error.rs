//! Error types and handling for picam-setup
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//! Every variant is a fatal condition that stops the run with exit code 1;
//! recoverable conditions are reported as warnings instead (see `report`).

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for provisioning operations
#[derive(Error, Diagnostic, Debug)]
pub enum SetupError {
    // Preflight errors
    #[error("This tool must run as root (current effective uid: {euid})")]
    #[diagnostic(
        code(picam_setup::preflight::not_root),
        help("Re-run with: sudo picam-setup")
    )]
    NotRoot { euid: u32 },

    #[error("Unsupported platform: {detail}")]
    #[diagnostic(
        code(picam_setup::preflight::unsupported_platform),
        help("picam-setup targets 64-bit Raspberry Pi OS on Raspberry Pi hardware")
    )]
    UnsupportedPlatform { detail: String },

    #[error("Required command(s) not found on PATH: {commands}")]
    #[diagnostic(
        code(picam_setup::preflight::missing_commands),
        help("Install the missing tools with apt-get, then re-run")
    )]
    MissingCommands { commands: String },

    // Operator aborts
    #[error("Aborted by operator during {step}")]
    #[diagnostic(code(picam_setup::run::user_aborted))]
    UserAborted { step: String },

    // Artifact fetch errors
    #[error("Failed to download {url}: {reason}")]
    #[diagnostic(
        code(picam_setup::fetch::download_failed),
        help("Check network connectivity and that the release URL is still published")
    )]
    DownloadFailed { url: String, reason: String },

    #[error("Failed to extract archive {archive}: {reason}")]
    #[diagnostic(code(picam_setup::fetch::archive_failed))]
    ArchiveFailed { archive: String, reason: String },

    #[error("Required file '{name}' not found anywhere under {dir}")]
    #[diagnostic(
        code(picam_setup::layout::artifact_missing),
        help("The release archive layout may have changed upstream; inspect the extracted contents")
    )]
    ArtifactMissing { name: String, dir: String },

    // Local input errors
    #[error("Required config file '{name}' not found (searched: {searched})")]
    #[diagnostic(
        code(picam_setup::materialize::config_missing),
        help("Run picam-setup from the directory containing the deployment files")
    )]
    ConfigFileMissing { name: String, searched: String },

    // TLS errors
    #[error("TLS material is inconsistent: {present} exists but {missing} does not")]
    #[diagnostic(
        code(picam_setup::tls::material_inconsistent),
        help("Restore the missing file, or delete the surviving one to regenerate both")
    )]
    TlsMaterialInconsistent { present: String, missing: String },

    #[error("Certificate generation failed: {reason}")]
    #[diagnostic(code(picam_setup::tls::generation_failed))]
    CertificateGenerationFailed { reason: String },

    // External tool errors
    #[error("Command '{command}' failed: {reason}")]
    #[diagnostic(code(picam_setup::exec::command_failed))]
    CommandFailed { command: String, reason: String },

    // File system errors
    #[error("Failed to read file: {path}")]
    #[diagnostic(code(picam_setup::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file: {path}")]
    #[diagnostic(code(picam_setup::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(picam_setup::fs::io_error))]
    Io { message: String },

    // Settings errors
    #[error("Failed to parse settings file: {path}")]
    #[diagnostic(code(picam_setup::settings::invalid))]
    SettingsInvalid { path: String, reason: String },
}

impl SetupError {
    /// Shorthand for a read failure at a path
    pub fn read_failed(path: &std::path::Path, err: &std::io::Error) -> Self {
        SetupError::FileReadFailed {
            path: path.display().to_string(),
            reason: err.to_string(),
        }
    }

    /// Shorthand for a write failure at a path
    pub fn write_failed(path: &std::path::Path, err: &std::io::Error) -> Self {
        SetupError::FileWriteFailed {
            path: path.display().to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<std::io::Error> for SetupError {
    fn from(err: std::io::Error) -> Self {
        SetupError::Io {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for SetupError {
    fn from(err: serde_yaml::Error) -> Self {
        SetupError::SettingsInvalid {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, SetupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SetupError::NotRoot { euid: 1000 };
        assert_eq!(
            err.to_string(),
            "This tool must run as root (current effective uid: 1000)"
        );
    }

    #[test]
    fn test_error_code() {
        let err = SetupError::NotRoot { euid: 1000 };
        assert_eq!(
            err.code().map(|c| c.to_string()),
            Some("picam_setup::preflight::not_root".to_string())
        );
    }

    #[test]
    fn test_missing_commands_lists_all() {
        let err = SetupError::MissingCommands {
            commands: "unzip, openssl".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("unzip"));
        assert!(msg.contains("openssl"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SetupError = io_err.into();
        assert!(matches!(err, SetupError::Io { .. }));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_str = "invalid: yaml: content: [unclosed";
        let parse_result: std::result::Result<serde_yaml::Value, _> =
            serde_yaml::from_str(yaml_str);
        let yaml_err = parse_result.unwrap_err();
        let err: SetupError = yaml_err.into();
        assert!(matches!(err, SetupError::SettingsInvalid { .. }));
    }

    #[test]
    fn test_tls_inconsistent_names_both_files() {
        let err = SetupError::TlsMaterialInconsistent {
            present: "/etc/ssl/private/picam.key".to_string(),
            missing: "/etc/ssl/certs/picam.crt".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("picam.key"));
        assert!(msg.contains("picam.crt"));
    }

    #[test]
    fn test_user_aborted_names_step() {
        let err = SetupError::UserAborted {
            step: "package installation".to_string(),
        };
        assert!(err.to_string().contains("package installation"));
    }
}
