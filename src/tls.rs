//! Self-signed TLS material for the reverse proxy
//!
//! Key and certificate are generated in one external invocation. Both files
//! present means nothing to do; exactly one present is fatal rather than
//! silently regenerated, since another service may already reference the
//! survivor.

use std::fs;
use std::path::Path;

use crate::error::{Result, SetupError};
use crate::exec::Cmd;
use crate::settings::Settings;

const VALIDITY_DAYS: &str = "36500";

/// Subject fields for the generated certificate
#[derive(Debug, Clone)]
pub struct CertSubject {
    pub country: String,
    pub state: String,
    pub org: String,
    pub org_unit: String,
    pub common_name: String,
}

impl CertSubject {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            country: settings.cert_country.clone(),
            state: settings.cert_state.clone(),
            org: settings.cert_org.clone(),
            org_unit: settings.cert_org_unit.clone(),
            common_name: settings.common_name(),
        }
    }

    /// Subject line in openssl `-subj` form
    pub fn subj_line(&self) -> String {
        format!(
            "/C={}/ST={}/O={}/OU={}/CN={}",
            self.country, self.state, self.org, self.org_unit, self.common_name
        )
    }

    /// Subject-alternative-name extension: the mDNS name plus loopback
    pub fn san_line(&self) -> String {
        format!("subjectAltName=DNS:{},IP:127.0.0.1", self.common_name)
    }
}

/// What `ensure_certificate` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertOutcome {
    AlreadyPresent,
    Generated,
}

/// Capability for generating the key/certificate pair
pub trait CertificateGenerator {
    fn generate(&self, key: &Path, cert: &Path, subject: &CertSubject) -> Result<()>;
}

/// Production adapter invoking openssl once for key + self-signed cert
pub struct OpensslGenerator;

impl CertificateGenerator for OpensslGenerator {
    fn generate(&self, key: &Path, cert: &Path, subject: &CertSubject) -> Result<()> {
        for path in [key, cert] {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|e| SetupError::write_failed(parent, &e))?;
            }
        }

        Cmd::new("openssl")
            .args([
                "req", "-x509", "-nodes", "-newkey", "rsa:4096", "-sha256", "-days",
                VALIDITY_DAYS,
            ])
            .arg("-keyout")
            .arg_path(key)
            .arg("-out")
            .arg_path(cert)
            .arg("-subj")
            .arg(subject.subj_line())
            .arg("-addext")
            .arg(subject.san_line())
            .run()
            .map_err(|e| SetupError::CertificateGenerationFailed {
                reason: e.to_string(),
            })
    }
}

/// Generate the pair only when both files are absent
pub fn ensure_certificate(
    settings: &Settings,
    generator: &dyn CertificateGenerator,
) -> Result<CertOutcome> {
    let key = &settings.tls_key_path;
    let cert = &settings.tls_cert_path;

    match (key.exists(), cert.exists()) {
        (true, true) => Ok(CertOutcome::AlreadyPresent),
        (false, false) => {
            let subject = CertSubject::from_settings(settings);
            generator.generate(key, cert, &subject)?;
            Ok(CertOutcome::Generated)
        }
        (true, false) => Err(SetupError::TlsMaterialInconsistent {
            present: key.display().to_string(),
            missing: cert.display().to_string(),
        }),
        (false, true) => Err(SetupError::TlsMaterialInconsistent {
            present: cert.display().to_string(),
            missing: key.display().to_string(),
        }),
    }
}
