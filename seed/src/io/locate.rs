//! Control tool lookup on the search path.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::core::types::ControlToolPath;
use crate::error::SeedError;
use crate::io::config::SeedConfig;

/// Find `name` in `search_path`. The first directory holding a regular file
/// with that name wins, so earlier directories shadow later ones.
///
/// Directories that cannot be inspected (missing, permission denied, dangling
/// symlink) are treated as holding no match.
pub fn locate(name: &str, search_path: &[PathBuf]) -> Result<ControlToolPath, SeedError> {
    if name.is_empty() || name.chars().any(std::path::is_separator) {
        return Err(SeedError::InvalidToolName {
            name: name.to_string(),
        });
    }

    for dir in search_path {
        let candidate = dir.join(name);
        if !is_regular_file(&candidate) {
            continue;
        }
        let absolute = std::path::absolute(&candidate).unwrap_or(candidate);
        debug!(path = %absolute.display(), "control tool found");
        return Ok(ControlToolPath::new(absolute));
    }

    Err(SeedError::ToolNotFound {
        name: name.to_string(),
    })
}

/// Split `PATH` into its directories, in order. Unset `PATH` yields nothing.
pub fn search_path_from_env() -> Vec<PathBuf> {
    std::env::var_os("PATH")
        .map(|raw| std::env::split_paths(&raw).collect())
        .unwrap_or_default()
}

/// Resolve the control tool for a run: the configured `tool_path` when set,
/// otherwise a `PATH` search for `tool_name`.
pub fn resolve_tool(config: &SeedConfig) -> Result<ControlToolPath, SeedError> {
    let resolved = match &config.tool_path {
        Some(path) => {
            if !is_regular_file(path) {
                return Err(SeedError::ToolNotFound {
                    name: path.display().to_string(),
                });
            }
            let absolute = std::path::absolute(path).unwrap_or_else(|_| path.clone());
            ControlToolPath::new(absolute)
        }
        None => locate(&config.tool_name, &search_path_from_env())?,
    };
    info!(tool = %resolved, "using control tool");
    Ok(resolved)
}

fn is_regular_file(path: &Path) -> bool {
    fs::metadata(path).is_ok_and(|meta| meta.is_file())
}
