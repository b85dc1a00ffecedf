//! Test-only helpers: manifests, scripted control tools and an on-disk fake
//! `keiji-ctl`.

use std::cell::RefCell;
use std::collections::VecDeque;

use anyhow::{Result, anyhow};

use crate::core::invocation::Invocation;
use crate::core::manifest::{AdminCategory, LinkEntry, NavbarEntry, SeedManifest};
use crate::core::types::ToolMode;
use crate::io::control::{ControlTool, ToolResponse};

/// Link entry shorthand.
pub fn link(text: &str, redirect: &str) -> LinkEntry {
    LinkEntry {
        text: text.to_string(),
        redirect: redirect.to_string(),
    }
}

/// Two assets, one navbar entry, no menu entries and admin links
/// `new: x -> /a`, `modify: y -> /b`.
pub fn sample_manifest() -> SeedManifest {
    SeedManifest {
        assets: vec!["./assets/menu.png".to_string(), "./assets/git.png".to_string()],
        navbar: vec![NavbarEntry {
            image: "./assets/git.png".to_string(),
            redirect: "https://git.example.test".to_string(),
        }],
        menu: Vec::new(),
        admin: vec![
            AdminCategory {
                category: "new".to_string(),
                entries: vec![link("x", "/a")],
            },
            AdminCategory {
                category: "modify".to_string(),
                entries: vec![link("y", "/b")],
            },
        ],
    }
}

/// Canned behaviour for one scripted invocation.
#[derive(Debug, Clone)]
pub enum Scripted {
    Respond(ToolResponse),
    LaunchError(String),
}

/// Successful exit with the given stdout.
pub fn ok(stdout: &str) -> Scripted {
    Scripted::Respond(success_response(stdout))
}

fn success_response(stdout: &str) -> ToolResponse {
    ToolResponse {
        success: true,
        exit_code: Some(0),
        stdout: stdout.to_string(),
        stderr: String::new(),
        timed_out: false,
    }
}

/// Non-zero exit with the given stderr.
pub fn exit(code: i32, stderr: &str) -> Scripted {
    Scripted::Respond(ToolResponse {
        success: false,
        exit_code: Some(code),
        stdout: String::new(),
        stderr: stderr.to_string(),
        timed_out: false,
    })
}

pub fn timed_out() -> Scripted {
    Scripted::Respond(ToolResponse {
        success: false,
        exit_code: None,
        stdout: String::new(),
        stderr: String::new(),
        timed_out: true,
    })
}

pub fn launch_error(message: &str) -> Scripted {
    Scripted::LaunchError(message.to_string())
}

/// Control tool that replays queued responses and records every invocation.
///
/// Once the queue is empty every call succeeds with empty output.
#[derive(Debug, Default)]
pub struct ScriptedControlTool {
    responses: RefCell<VecDeque<Scripted>>,
    calls: RefCell<Vec<Invocation>>,
}

impl ScriptedControlTool {
    pub fn new(responses: Vec<Scripted>) -> Self {
        Self {
            responses: RefCell::new(responses.into()),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }

    pub fn modes(&self) -> Vec<ToolMode> {
        self.calls.borrow().iter().map(|call| call.mode).collect()
    }
}

impl ControlTool for ScriptedControlTool {
    fn invoke(&self, invocation: &Invocation) -> Result<ToolResponse> {
        self.calls.borrow_mut().push(invocation.clone());
        match self.responses.borrow_mut().pop_front() {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::LaunchError(message)) => Err(anyhow!(message)),
            None => Ok(success_response("")),
        }
    }
}

#[cfg(unix)]
pub use fake_tool::FakeTool;

#[cfg(unix)]
mod fake_tool {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};

    use anyhow::{Context, Result};

    use crate::core::types::ControlToolPath;

    /// Shell-script stand-in for `keiji-ctl` living in its own temp directory.
    ///
    /// Every call appends its arguments (space-joined) to `calls.log`. `auth`
    /// prints the configured token; the configured failing mode writes
    /// `<mode> rejected` to stderr and exits 3; everything else exits 0.
    pub struct FakeTool {
        dir: tempfile::TempDir,
        log_path: PathBuf,
    }

    impl FakeTool {
        pub fn new(token: &str) -> Result<Self> {
            Self::build(token, "")
        }

        pub fn failing_on(token: &str, mode: &str) -> Result<Self> {
            Self::build(token, mode)
        }

        fn build(token: &str, failing_mode: &str) -> Result<Self> {
            let dir = tempfile::tempdir().context("create fake tool dir")?;
            let log_path = dir.path().join("calls.log");
            let script = format!(
                r#"#!/bin/sh
mode=""
prev=""
for arg in "$@"; do
  if [ "$prev" = "-cmd" ]; then mode="$arg"; fi
  prev="$arg"
done
printf '%s\n' "$*" >> '{log}'
if [ "$mode" = "auth" ]; then
  printf '%s\n' '{token}'
  exit 0
fi
if [ -n '{failing}' ] && [ "$mode" = '{failing}' ]; then
  echo "$mode rejected" >&2
  exit 3
fi
exit 0
"#,
                log = log_path.display(),
                token = token,
                failing = failing_mode,
            );
            let tool_path = dir.path().join("keiji-ctl");
            fs::write(&tool_path, script).context("write fake tool")?;
            let mut perms = fs::metadata(&tool_path)
                .context("stat fake tool")?
                .permissions();
            perms.set_mode(0o755);
            fs::set_permissions(&tool_path, perms).context("chmod fake tool")?;
            Ok(Self { dir, log_path })
        }

        /// Directory holding the tool, suitable as a `PATH` entry.
        pub fn dir(&self) -> &Path {
            self.dir.path()
        }

        pub fn path(&self) -> ControlToolPath {
            ControlToolPath::new(self.dir.path().join("keiji-ctl"))
        }

        /// Recorded calls, one space-joined argument line each.
        pub fn calls(&self) -> Result<Vec<String>> {
            if !self.log_path.exists() {
                return Ok(Vec::new());
            }
            let contents = fs::read_to_string(&self.log_path).context("read calls log")?;
            Ok(contents.lines().map(str::to_string).collect())
        }
    }
}
