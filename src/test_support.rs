//! Shared test fixtures: fake capability adapters
//!
//! Each fake records the calls it receives so tests can assert on exactly
//! what a component asked the host to do, without a real package database,
//! network, or service manager.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

use crate::artifact::ArchiveFormat;
use crate::confirm::Confirmer;
use crate::error::{Result, SetupError};
use crate::extract::ArchiveExtractor;
use crate::fetch::Downloader;
use crate::layout;
use crate::packages::PackageManager;
use crate::service::ServiceController;
use crate::tls::{CertSubject, CertificateGenerator};

/// Confirmer answering from a fixed script; panics when a test asks more
/// questions than it scripted
pub struct ScriptedConfirmer {
    answers: RefCell<VecDeque<bool>>,
}

impl ScriptedConfirmer {
    pub fn new(answers: &[bool]) -> Self {
        Self {
            answers: RefCell::new(answers.iter().copied().collect()),
        }
    }

    pub fn assert_exhausted(&self) {
        assert!(
            self.answers.borrow().is_empty(),
            "not every scripted answer was consumed"
        );
    }
}

impl Confirmer for ScriptedConfirmer {
    fn confirm(&self, question: &str) -> Result<bool> {
        match self.answers.borrow_mut().pop_front() {
            Some(answer) => Ok(answer),
            None => panic!("unscripted confirmation: {question}"),
        }
    }
}

/// In-memory package database
pub struct FakePackages {
    installed: RefCell<HashSet<String>>,
    install_calls: RefCell<Vec<Vec<String>>>,
    refreshes: Cell<u32>,
    upgrades: Cell<u32>,
}

impl FakePackages {
    pub fn with_installed(packages: &[&str]) -> Self {
        Self {
            installed: RefCell::new(packages.iter().map(ToString::to_string).collect()),
            install_calls: RefCell::new(Vec::new()),
            refreshes: Cell::new(0),
            upgrades: Cell::new(0),
        }
    }

    pub fn install_calls(&self) -> Vec<Vec<String>> {
        self.install_calls.borrow().clone()
    }

    pub fn refresh_count(&self) -> u32 {
        self.refreshes.get()
    }

    pub fn upgrade_count(&self) -> u32 {
        self.upgrades.get()
    }
}

impl PackageManager for FakePackages {
    fn is_installed(&self, package: &str) -> Result<bool> {
        Ok(self.installed.borrow().contains(package))
    }

    fn install(&self, packages: &[String]) -> Result<()> {
        self.install_calls.borrow_mut().push(packages.to_vec());
        self.installed
            .borrow_mut()
            .extend(packages.iter().cloned());
        Ok(())
    }

    fn refresh_index(&self) -> Result<()> {
        self.refreshes.set(self.refreshes.get() + 1);
        Ok(())
    }

    fn full_upgrade(&self) -> Result<()> {
        self.upgrades.set(self.upgrades.get() + 1);
        Ok(())
    }
}

/// Downloader that records URLs and writes a placeholder archive
pub struct FakeDownloader {
    fetched: RefCell<Vec<String>>,
}

impl FakeDownloader {
    pub fn new() -> Self {
        Self {
            fetched: RefCell::new(Vec::new()),
        }
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.borrow().clone()
    }
}

impl Downloader for FakeDownloader {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        self.fetched.borrow_mut().push(url.to_string());
        fs::write(dest, b"archive").map_err(|e| SetupError::write_failed(dest, &e))
    }
}

/// Extractor that materializes a prepared tree instead of unpacking
pub struct FakeExtractor {
    trees: HashMap<String, PathBuf>,
}

impl FakeExtractor {
    pub fn new() -> Self {
        Self {
            trees: HashMap::new(),
        }
    }

    pub fn with_tree(mut self, archive_name: &str, tree: &Path) -> Self {
        self.trees
            .insert(archive_name.to_string(), tree.to_path_buf());
        self
    }
}

impl ArchiveExtractor for FakeExtractor {
    fn extract(&self, archive: &Path, dest: &Path, _format: ArchiveFormat) -> Result<()> {
        let name = archive
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        let tree = self
            .trees
            .get(&name)
            .ok_or_else(|| SetupError::ArchiveFailed {
                archive: archive.display().to_string(),
                reason: "no fixture tree registered".to_string(),
            })?;
        layout::copy_dir_recursive(tree, dest).map_err(|e| SetupError::ArchiveFailed {
            archive: archive.display().to_string(),
            reason: e.to_string(),
        })
    }
}

/// Certificate generator that writes placeholder files and counts calls
pub struct CountingCertGen {
    calls: Cell<u32>,
}

impl CountingCertGen {
    pub fn new() -> Self {
        Self { calls: Cell::new(0) }
    }

    pub fn calls(&self) -> u32 {
        self.calls.get()
    }
}

impl CertificateGenerator for CountingCertGen {
    fn generate(&self, key: &Path, cert: &Path, _subject: &CertSubject) -> Result<()> {
        self.calls.set(self.calls.get() + 1);
        for (path, content) in [(key, "key"), (cert, "cert")] {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|e| SetupError::write_failed(parent, &e))?;
            }
            fs::write(path, content).map_err(|e| SetupError::write_failed(path, &e))?;
        }
        Ok(())
    }
}

/// Service manager remembering what was reloaded, enabled, and started
pub struct FakeServices {
    active_preset: HashSet<String>,
    reloads: Cell<u32>,
    enabled: RefCell<Vec<String>>,
    started: RefCell<Vec<String>>,
    reboots: Cell<u32>,
    fail_start: bool,
}

impl FakeServices {
    pub fn new(active: &[&str]) -> Self {
        Self {
            active_preset: active.iter().map(ToString::to_string).collect(),
            reloads: Cell::new(0),
            enabled: RefCell::new(Vec::new()),
            started: RefCell::new(Vec::new()),
            reboots: Cell::new(0),
            fail_start: false,
        }
    }

    pub fn failing_start(active: &[&str]) -> Self {
        Self {
            fail_start: true,
            ..Self::new(active)
        }
    }

    pub fn reload_count(&self) -> u32 {
        self.reloads.get()
    }

    pub fn enabled(&self) -> Vec<String> {
        self.enabled.borrow().clone()
    }

    pub fn started(&self) -> Vec<String> {
        self.started.borrow().clone()
    }

    pub fn reboot_count(&self) -> u32 {
        self.reboots.get()
    }
}

impl ServiceController for FakeServices {
    fn daemon_reload(&self) -> Result<()> {
        self.reloads.set(self.reloads.get() + 1);
        Ok(())
    }

    fn enable(&self, unit: &str) -> Result<()> {
        self.enabled.borrow_mut().push(unit.to_string());
        Ok(())
    }

    fn start(&self, unit: &str) -> Result<()> {
        if self.fail_start {
            return Err(SetupError::CommandFailed {
                command: format!("systemctl start {unit}"),
                reason: "unit failed to start".to_string(),
            });
        }
        self.started.borrow_mut().push(unit.to_string());
        Ok(())
    }

    fn is_active(&self, unit: &str) -> Result<bool> {
        Ok(self.active_preset.contains(unit) || self.started.borrow().iter().any(|u| u == unit))
    }

    fn reboot(&self) -> Result<()> {
        self.reboots.set(self.reboots.get() + 1);
        Ok(())
    }
}
