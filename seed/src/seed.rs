//! Orchestration for `keiji-seed run`: locate, authenticate, apply.

use tracing::info;

use crate::apply::apply_all;
use crate::auth::authenticate;
use crate::core::manifest::SeedManifest;
use crate::core::report::ApplyReport;
use crate::core::types::TargetAddress;
use crate::error::SeedError;
use crate::io::config::{EmptyTokenPolicy, FailurePolicy, SeedConfig};
use crate::io::control::{ControlTool, KeijiCtl};
use crate::io::locate::resolve_tool;

/// Policies applied to one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedOptions {
    pub failure_policy: FailurePolicy,
    pub empty_token: EmptyTokenPolicy,
}

impl From<&SeedConfig> for SeedOptions {
    fn from(config: &SeedConfig) -> Self {
        Self {
            failure_policy: config.failure_policy,
            empty_token: config.empty_token,
        }
    }
}

/// Pick the target address: a non-empty `explicit` value wins over the
/// environment value. Blank values count as unset.
pub fn choose_address(
    explicit: Option<&str>,
    env_value: Option<String>,
    env_var: &str,
) -> Result<TargetAddress, SeedError> {
    explicit
        .map(str::to_string)
        .filter(|value| !value.trim().is_empty())
        .or_else(|| env_value.filter(|value| !value.trim().is_empty()))
        .map(TargetAddress::new)
        .ok_or_else(|| SeedError::MissingAddress {
            var: env_var.to_string(),
        })
}

/// [`choose_address`] reading `env_var` from the process environment.
pub fn resolve_address(explicit: Option<&str>, env_var: &str) -> Result<TargetAddress, SeedError> {
    choose_address(explicit, std::env::var(env_var).ok(), env_var)
}

/// Authenticate with `tool`, then apply `manifest`.
///
/// Authentication errors abort before any mutation is attempted.
pub fn seed_with<T: ControlTool + ?Sized>(
    tool: &T,
    manifest: &SeedManifest,
    address: &TargetAddress,
    options: SeedOptions,
) -> Result<ApplyReport, SeedError> {
    let token = authenticate(tool, address, options.empty_token)?;
    Ok(apply_all(
        tool,
        manifest,
        address,
        &token,
        options.failure_policy,
    ))
}

/// Full run against the real control tool.
///
/// The tool is located first, so a missing tool fails before the address is
/// even consulted.
pub fn run_seed(
    config: &SeedConfig,
    manifest: &SeedManifest,
    address_override: Option<&str>,
) -> Result<ApplyReport, SeedError> {
    let tool_path = resolve_tool(config)?;
    let address = resolve_address(address_override, &config.address_env)?;
    info!(tool = %tool_path, address = %address, records = manifest.len(), "starting seed run");

    let tool = KeijiCtl::from_config(tool_path, config);
    seed_with(&tool, manifest, &address, SeedOptions::from(config))
}
