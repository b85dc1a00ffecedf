//! `keiji-seed`: apply a seed manifest to a keiji site through `keiji-ctl`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::warn;

use keiji_seed::apply::plan;
use keiji_seed::core::report::{ApplyReport, OutcomeStatus};
use keiji_seed::core::types::TargetAddress;
use keiji_seed::exit_codes;
use keiji_seed::io::config::{
    DEFAULT_CONFIG_PATH, EmptyTokenPolicy, FailurePolicy, SeedConfig, load_config, render_config,
};
use keiji_seed::io::locate::resolve_tool;
use keiji_seed::io::manifest_store::{
    DEFAULT_MANIFEST, DEFAULT_MANIFEST_PATH, load_manifest, resolve_manifest_path,
};
use keiji_seed::logging;
use keiji_seed::seed::{resolve_address, run_seed};

#[derive(Parser)]
#[command(
    name = "keiji-seed",
    version,
    about = "Seed a keiji site with assets, navbar, menu and admin links"
)]
struct Cli {
    /// Seeder config file. Missing file means defaults.
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Seed manifest. Defaults to ./manifest.toml if present, else the manifest
    /// built into the binary.
    #[arg(short, long, global = true)]
    manifest: Option<PathBuf>,

    /// Log progress to stderr (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Authenticate and apply every record in the manifest.
    Run {
        /// Target address; overrides the address environment variable.
        #[arg(long)]
        address: Option<String>,
        /// Control tool path; skips the PATH search.
        #[arg(long)]
        tool: Option<PathBuf>,
        /// Stop at the first failed record.
        #[arg(long)]
        fail_fast: bool,
        /// Continue when auth returns an empty token.
        #[arg(long)]
        accept_empty_token: bool,
        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print the control tool calls a run would make, without running them.
    Plan {
        #[arg(long)]
        address: Option<String>,
        /// Print the plan as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Check the manifest and config without contacting anything.
    Validate,
    /// Print the resolved control tool path.
    Locate,
    /// Write the default config and manifest if missing.
    Init {
        /// Overwrite existing files.
        #[arg(short, long)]
        force: bool,
    },
}

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::FATAL);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let manifest = resolve_manifest_path(cli.manifest.as_deref(), Path::new("."));

    match cli.command {
        Command::Init { force } => cmd_init(&cli.config, cli.manifest.as_deref(), force),
        Command::Validate => cmd_validate(&cli.config, manifest.as_deref()),
        Command::Locate => cmd_locate(&cli.config),
        Command::Plan { address, json } => {
            cmd_plan(&cli.config, manifest.as_deref(), address.as_deref(), json)
        }
        Command::Run {
            address,
            tool,
            fail_fast,
            accept_empty_token,
            json,
        } => {
            let mut config = load_config(&cli.config)?;
            if let Some(tool) = tool {
                config.tool_path = Some(tool);
            }
            if fail_fast {
                config.failure_policy = FailurePolicy::FailFast;
            }
            if accept_empty_token {
                config.empty_token = EmptyTokenPolicy::Accept;
            }
            cmd_run(&config, manifest.as_deref(), address.as_deref(), json)
        }
    }
}

fn cmd_run(
    config: &SeedConfig,
    manifest_path: Option<&Path>,
    address: Option<&str>,
    json: bool,
) -> Result<i32> {
    let manifest = load_manifest(manifest_path)?;
    let report = run_seed(config, &manifest, address)?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("serialize report")?
        );
    } else {
        print_report(&report);
    }

    if report.is_success() {
        Ok(exit_codes::OK)
    } else {
        Ok(exit_codes::PARTIAL)
    }
}

fn print_report(report: &ApplyReport) {
    println!(
        "seed: applied={} failed={} skipped={}",
        report.applied(),
        report.failed(),
        report.skipped()
    );
    for outcome in report.failures() {
        if let OutcomeStatus::Failed { reason } = &outcome.status {
            println!(
                "failed: #{} {}: {}",
                outcome.index,
                outcome.record.label(),
                reason
            );
        }
    }
}

fn cmd_plan(
    config_path: &Path,
    manifest_path: Option<&Path>,
    address: Option<&str>,
    json: bool,
) -> Result<i32> {
    let config = load_config(config_path)?;
    let manifest = load_manifest(manifest_path)?;
    let address = match resolve_address(address, &config.address_env) {
        Ok(address) => address,
        Err(err) => {
            warn!(err = %err, "planning with a placeholder address");
            TargetAddress::new(format!("${}", config.address_env))
        }
    };

    let invocations = plan(&manifest, &address);
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&invocations).context("serialize plan")?
        );
    } else {
        for invocation in &invocations {
            println!("{}", invocation.command_line(&config.tool_name));
        }
    }
    Ok(exit_codes::OK)
}

fn cmd_validate(config_path: &Path, manifest_path: Option<&Path>) -> Result<i32> {
    load_config(config_path)?;
    let manifest = load_manifest(manifest_path)?;
    let admin: usize = manifest.admin.iter().map(|group| group.entries.len()).sum();
    println!(
        "manifest ok: records={} assets={} navbar={} menu={} admin={}",
        manifest.len(),
        manifest.assets.len(),
        manifest.navbar.len(),
        manifest.menu.len(),
        admin
    );
    Ok(exit_codes::OK)
}

fn cmd_locate(config_path: &Path) -> Result<i32> {
    let config = load_config(config_path)?;
    let tool = resolve_tool(&config)?;
    println!("{tool}");
    Ok(exit_codes::OK)
}

fn cmd_init(config_path: &Path, manifest_path: Option<&Path>, force: bool) -> Result<i32> {
    let manifest_path = manifest_path.unwrap_or(Path::new(DEFAULT_MANIFEST_PATH));
    let config = render_config(&SeedConfig::default())?;
    write_if_missing_or_force(config_path, &config, force)?;
    write_if_missing_or_force(manifest_path, DEFAULT_MANIFEST, force)?;
    println!(
        "init: config={} manifest={}",
        config_path.display(),
        manifest_path.display()
    );
    Ok(exit_codes::OK)
}

fn write_if_missing_or_force(path: &Path, contents: &str, force: bool) -> Result<()> {
    if !force && path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
