//! Shared deterministic types for seeding.
//!
//! These types carry no I/O. The locator and authenticator produce them; the
//! applier and planner only read them.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Absolute path to the control executable, resolved once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlToolPath(PathBuf);

impl ControlToolPath {
    /// Wrap an already-checked path. Lookup and checking live in `io::locate`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for ControlToolPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Base address of the remote administrative service.
///
/// Opaque: it is handed to the control tool verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TargetAddress(String);

impl TargetAddress {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Session credential returned by `auth` mode.
///
/// `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Build a token from raw `auth` stdout, stripping trailing newlines.
    pub fn from_output(raw: &str) -> Self {
        Self(normalize_token(raw).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionToken(<redacted>, len={})", self.0.len())
    }
}

/// Strip trailing `\n` / `\r` characters. Anything else is part of the token.
pub fn normalize_token(raw: &str) -> &str {
    raw.trim_end_matches(|c| c == '\n' || c == '\r')
}

/// Control tool mode, passed as `-cmd <mode>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolMode {
    Auth,
    Asset,
    Nav,
    Menu,
    Admin,
}

impl ToolMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ToolMode::Auth => "auth",
            ToolMode::Asset => "asset",
            ToolMode::Nav => "nav",
            ToolMode::Menu => "menu",
            ToolMode::Admin => "admin",
        }
    }
}

impl fmt::Display for ToolMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One remote mutation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ConfigurationRecord {
    /// Upload an image asset.
    Asset { image: String },
    /// Navbar icon linking to `redirect`.
    Navbar { image: String, redirect: String },
    /// Menu link.
    Menu { text: String, redirect: String },
    /// Admin panel shortcut, grouped under `category` (e.g. `new`, `modify`).
    Admin {
        category: String,
        text: String,
        redirect: String,
    },
}

impl ConfigurationRecord {
    pub fn mode(&self) -> ToolMode {
        match self {
            ConfigurationRecord::Asset { .. } => ToolMode::Asset,
            ConfigurationRecord::Navbar { .. } => ToolMode::Nav,
            ConfigurationRecord::Menu { .. } => ToolMode::Menu,
            ConfigurationRecord::Admin { .. } => ToolMode::Admin,
        }
    }

    /// Short human-readable label for logs and reports.
    pub fn label(&self) -> String {
        match self {
            ConfigurationRecord::Asset { image } => format!("asset {image}"),
            ConfigurationRecord::Navbar { image, redirect } => {
                format!("nav {image} -> {redirect}")
            }
            ConfigurationRecord::Menu { text, redirect } => format!("menu {text} -> {redirect}"),
            ConfigurationRecord::Admin {
                category,
                text,
                redirect,
            } => format!("admin [{category}] {text} -> {redirect}"),
        }
    }
}
