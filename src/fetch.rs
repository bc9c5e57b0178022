//! Release archive downloads
//!
//! Blocking HTTP GET straight to a file, with a progress bar when the server
//! reports a length. A non-2xx status or any transfer failure maps to
//! `DownloadFailed`; nothing is retried.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};

use crate::error::{Result, SetupError};

/// Capability for fetching a remote artifact to a local path
pub trait Downloader {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()>;
}

/// Production adapter using blocking HTTP
pub struct HttpDownloader;

impl Downloader for HttpDownloader {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        let download_error = |reason: String| SetupError::DownloadFailed {
            url: url.to_string(),
            reason,
        };

        let response = ureq::get(url)
            .call()
            .map_err(|e| download_error(e.to_string()))?;

        let total: Option<u64> = response
            .header("Content-Length")
            .and_then(|v| v.parse().ok());
        let progress = match total {
            Some(len) => {
                let bar = ProgressBar::new(len);
                bar.set_style(
                    ProgressStyle::default_bar()
                        .template("  [{bar:40.cyan/blue}] {bytes}/{total_bytes}")
                        .unwrap()
                        .progress_chars("#>-"),
                );
                bar
            }
            None => ProgressBar::new_spinner(),
        };

        let mut reader = response.into_reader();
        let mut file = File::create(dest).map_err(|e| SetupError::write_failed(dest, &e))?;
        let mut buf = [0u8; 64 * 1024];
        loop {
            let n = reader
                .read(&mut buf)
                .map_err(|e| download_error(e.to_string()))?;
            if n == 0 {
                break;
            }
            file.write_all(&buf[..n])
                .map_err(|e| SetupError::write_failed(dest, &e))?;
            progress.inc(n as u64);
        }
        progress.finish_and_clear();

        Ok(())
    }
}
