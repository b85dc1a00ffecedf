//! Control tool abstraction.
//!
//! The [`ControlTool`] trait decouples the authenticator and applier from the
//! actual `keiji-ctl` process. Tests use scripted tools that record
//! invocations and return canned responses without spawning anything.

use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, instrument};

use crate::core::invocation::Invocation;
use crate::core::types::ControlToolPath;
use crate::io::config::SeedConfig;
use crate::io::process::run_with_timeout;

/// What the control tool reported for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResponse {
    /// True when the process exited with status zero.
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

impl ToolResponse {
    /// One-line description of a failed response, for reports.
    ///
    /// keiji-ctl prints request errors on stdout, so the last non-empty line of
    /// stderr is preferred, then stdout.
    pub fn failure_reason(&self) -> String {
        if self.timed_out {
            return "control tool timed out".to_string();
        }
        let status = match self.exit_code {
            Some(code) => format!("exit status {code}"),
            None => "terminated by signal".to_string(),
        };
        match last_line(&self.stderr).or_else(|| last_line(&self.stdout)) {
            Some(line) => format!("{status}: {line}"),
            None => status,
        }
    }
}

fn last_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).rfind(|line| !line.is_empty())
}

/// Something that can run control tool invocations.
pub trait ControlTool {
    /// Run one invocation to completion.
    ///
    /// `Err` means the tool could not be launched or waited on; a tool that
    /// ran and failed returns `Ok` with `success == false`.
    fn invoke(&self, invocation: &Invocation) -> Result<ToolResponse>;
}

/// The real `keiji-ctl` process.
#[derive(Debug, Clone)]
pub struct KeijiCtl {
    path: ControlToolPath,
    timeout: Duration,
    output_limit_bytes: usize,
}

impl KeijiCtl {
    pub fn new(path: ControlToolPath, timeout: Duration, output_limit_bytes: usize) -> Self {
        Self {
            path,
            timeout,
            output_limit_bytes,
        }
    }

    pub fn from_config(path: ControlToolPath, config: &SeedConfig) -> Self {
        Self::new(path, config.invocation_timeout(), config.output_limit_bytes)
    }
}

impl ControlTool for KeijiCtl {
    #[instrument(skip_all, fields(mode = %invocation.mode))]
    fn invoke(&self, invocation: &Invocation) -> Result<ToolResponse> {
        debug!(args = ?invocation.redacted_args(), "invoking control tool");
        let mut cmd = Command::new(self.path.as_path());
        cmd.args(&invocation.args);

        let output = run_with_timeout(cmd, self.timeout, self.output_limit_bytes)
            .with_context(|| format!("run {} {}", self.path, invocation.mode))?;

        Ok(ToolResponse {
            success: output.status.success() && !output.timed_out,
            exit_code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
            timed_out: output.timed_out,
        })
    }
}
