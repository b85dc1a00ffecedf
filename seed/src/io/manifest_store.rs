//! Loading the seed manifest from disk or the embedded default.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::core::manifest::SeedManifest;

/// Manifest compiled into the binary, used when no manifest file is found.
pub const DEFAULT_MANIFEST: &str = include_str!("../../manifest/default.toml");

/// Manifest file picked up from the working directory (and written by `init`).
pub const DEFAULT_MANIFEST_PATH: &str = "manifest.toml";

/// Which manifest file to load: `explicit` if given, else [`DEFAULT_MANIFEST_PATH`]
/// under `dir` when it is a file. `None` means the embedded manifest.
pub fn resolve_manifest_path(explicit: Option<&Path>, dir: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = dir.join(DEFAULT_MANIFEST_PATH);
    fs::metadata(&local)
        .is_ok_and(|meta| meta.is_file())
        .then_some(local)
}

/// Parse and validate a manifest document.
pub fn parse_manifest(contents: &str) -> Result<SeedManifest> {
    let manifest: SeedManifest = toml::from_str(contents).context("parse manifest toml")?;
    manifest.validate()?;
    Ok(manifest)
}

/// Load the manifest at `path`, or the embedded default when `path` is `None`.
pub fn load_manifest(path: Option<&Path>) -> Result<SeedManifest> {
    let manifest = match path {
        Some(path) => {
            let contents =
                fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
            parse_manifest(&contents).with_context(|| format!("load {}", path.display()))?
        }
        None => parse_manifest(DEFAULT_MANIFEST).context("load embedded manifest")?,
    };
    debug!(records = manifest.len(), "manifest loaded");
    Ok(manifest)
}
