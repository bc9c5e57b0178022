//! External command invocation with typed failures
//!
//! Every production adapter funnels through [`Cmd`], so a nonzero exit from
//! any external tool surfaces as one `CommandFailed` error carrying the
//! command line and captured stderr.

use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::{Result, SetupError};

/// Builder for one external command invocation
pub struct Cmd {
    program: String,
    args: Vec<OsString>,
    error_msg: Option<String>,
}

impl Cmd {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            error_msg: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn arg_path(mut self, path: &Path) -> Self {
        self.args.push(path.as_os_str().to_os_string());
        self
    }

    /// Extra context prepended to the failure reason
    pub fn error_msg(mut self, msg: impl Into<String>) -> Self {
        self.error_msg = Some(msg.into());
        self
    }

    fn display_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }

    fn failure(&self, reason: String) -> SetupError {
        let reason = match &self.error_msg {
            Some(msg) => format!("{msg}: {reason}"),
            None => reason,
        };
        SetupError::CommandFailed {
            command: self.display_line(),
            reason,
        }
    }

    /// Run with stdout/stderr attached to the terminal; error on nonzero exit.
    /// Suits long-running interactive tools (apt-get and friends).
    pub fn run_interactive(self) -> Result<()> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .status()
            .map_err(|e| self.failure(e.to_string()))?;

        if status.success() {
            Ok(())
        } else {
            Err(self.failure(format!("exit status {status}")))
        }
    }

    /// Run silently, capturing stderr into the error on nonzero exit
    pub fn run(self) -> Result<()> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| self.failure(e.to_string()))?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            let reason = if stderr.is_empty() {
                format!("exit status {}", output.status)
            } else {
                stderr.to_string()
            };
            Err(self.failure(reason))
        }
    }

    /// Run silently and report only whether the command exited zero.
    /// Suits probes where a nonzero exit is an answer, not an error.
    pub fn success(self) -> Result<bool> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| self.failure(e.to_string()))?;
        Ok(output.status.success())
    }

    /// Run silently and return exit success plus captured stdout, without
    /// treating a nonzero exit as an error
    pub fn read(self) -> Result<(bool, String)> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| self.failure(e.to_string()))?;
        Ok((
            output.status.success(),
            String::from_utf8_lossy(&output.stdout).into_owned(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_success() {
        let result = Cmd::new("sh").args(["-c", "exit 0"]).run();
        assert!(result.is_ok());
    }

    #[test]
    fn test_run_nonzero_exit_fails() {
        let result = Cmd::new("sh").args(["-c", "exit 3"]).run();
        assert!(matches!(
            result.unwrap_err(),
            SetupError::CommandFailed { .. }
        ));
    }

    #[test]
    fn test_run_captures_stderr() {
        let err = Cmd::new("sh")
            .args(["-c", "echo boom >&2; exit 1"])
            .run()
            .unwrap_err();
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_run_missing_program_fails() {
        let result = Cmd::new("definitely-not-a-real-command").run();
        assert!(result.is_err());
    }

    #[test]
    fn test_success_reports_exit_state() {
        assert!(Cmd::new("sh").args(["-c", "exit 0"]).success().unwrap());
        assert!(!Cmd::new("sh").args(["-c", "exit 1"]).success().unwrap());
    }

    #[test]
    fn test_read_returns_stdout_on_failure_too() {
        let (ok, out) = Cmd::new("sh")
            .args(["-c", "echo partial; exit 1"])
            .read()
            .unwrap();
        assert!(!ok);
        assert_eq!(out.trim(), "partial");
    }

    #[test]
    fn test_error_msg_prefixes_reason() {
        let err = Cmd::new("sh")
            .args(["-c", "exit 1"])
            .error_msg("context here")
            .run()
            .unwrap_err();
        assert!(err.to_string().contains("context here"));
    }
}
