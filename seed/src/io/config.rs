//! Seeder configuration, read from `keiji-seed.toml`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "keiji-seed.toml";

/// What to do when a record fails to apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Keep applying the remaining records and report failures at the end.
    #[default]
    BestEffort,
    /// Stop at the first failure; remaining records are reported as skipped.
    FailFast,
}

/// What to do when `auth` produces an empty token.
///
/// The legacy seed script passed an empty token straight through; `Accept`
/// keeps that behaviour. `Reject` is the default because keiji-ctl refuses an
/// empty cookie anyway, so every mutation would fail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmptyTokenPolicy {
    /// Abort the run before any mutation.
    #[default]
    Reject,
    /// Warn and pass the empty token along.
    Accept,
}

/// Seeder configuration (TOML). Missing fields take defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SeedConfig {
    /// File name of the control tool searched for on `PATH`.
    pub tool_name: String,

    /// Explicit control tool path; skips the `PATH` search when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_path: Option<PathBuf>,

    /// Environment variable holding the target address.
    pub address_env: String,

    /// Wall-clock limit for each control tool invocation.
    pub invocation_timeout_secs: u64,

    /// Keep at most this many bytes of each child output stream.
    pub output_limit_bytes: usize,

    pub failure_policy: FailurePolicy,

    pub empty_token: EmptyTokenPolicy,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            tool_name: "keiji-ctl".to_string(),
            tool_path: None,
            address_env: "SITE_URL".to_string(),
            invocation_timeout_secs: 60,
            output_limit_bytes: 100_000,
            failure_policy: FailurePolicy::default(),
            empty_token: EmptyTokenPolicy::default(),
        }
    }
}

impl SeedConfig {
    pub fn validate(&self) -> Result<()> {
        if self.tool_name.trim().is_empty() {
            return Err(anyhow!("tool_name must be non-empty"));
        }
        if self.tool_name.chars().any(std::path::is_separator) {
            return Err(anyhow!(
                "tool_name must be a bare file name, got {:?}",
                self.tool_name
            ));
        }
        if self.address_env.trim().is_empty() {
            return Err(anyhow!("address_env must be non-empty"));
        }
        if self.invocation_timeout_secs == 0 {
            return Err(anyhow!("invocation_timeout_secs must be > 0"));
        }
        if self.output_limit_bytes == 0 {
            return Err(anyhow!("output_limit_bytes must be > 0"));
        }
        Ok(())
    }

    pub fn invocation_timeout(&self) -> Duration {
        Duration::from_secs(self.invocation_timeout_secs)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `SeedConfig::default()`.
pub fn load_config(path: &Path) -> Result<SeedConfig> {
    if !path.exists() {
        let cfg = SeedConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: SeedConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}

/// Render config as TOML with a trailing newline.
pub fn render_config(cfg: &SeedConfig) -> Result<String> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    Ok(buf)
}
