//! Argument construction for control tool calls.
//!
//! Pure functions of their inputs: the same record, address and token always
//! produce the same argument vector.

use serde::Serialize;

use crate::core::types::{ConfigurationRecord, TargetAddress, ToolMode};

/// Stand-in for the session token in plans and logs.
pub const TOKEN_PLACEHOLDER: &str = "<session-token>";

const COOKIE_FLAG: &str = "-cookie";

/// Position of the token in every record invocation built by [`Invocation::for_record`].
const TOKEN_SLOT: usize = 3;

/// A single control tool call (arguments only, program path excluded).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
    pub mode: ToolMode,
    pub args: Vec<String>,
}

impl Invocation {
    /// `-cmd auth -address <address>`
    pub fn auth(address: &TargetAddress) -> Self {
        Self {
            mode: ToolMode::Auth,
            args: vec![
                "-cmd".to_string(),
                ToolMode::Auth.as_str().to_string(),
                "-address".to_string(),
                address.as_str().to_string(),
            ],
        }
    }

    /// Arguments applying `record` with the given session token.
    pub fn for_record(record: &ConfigurationRecord, address: &TargetAddress, token: &str) -> Self {
        let mode = record.mode();
        let mut args = vec![
            "-address".to_string(),
            address.as_str().to_string(),
            COOKIE_FLAG.to_string(),
            token.to_string(),
            "-cmd".to_string(),
            mode.as_str().to_string(),
        ];
        match record {
            ConfigurationRecord::Asset { image } => {
                push_flag(&mut args, "-png", image);
            }
            ConfigurationRecord::Navbar { image, redirect } => {
                push_flag(&mut args, "-png", image);
                push_flag(&mut args, "-redirect", redirect);
            }
            ConfigurationRecord::Menu { text, redirect } => {
                push_flag(&mut args, "-text", text);
                push_flag(&mut args, "-redirect", redirect);
            }
            ConfigurationRecord::Admin {
                category,
                text,
                redirect,
            } => {
                push_flag(&mut args, "-text", text);
                push_flag(&mut args, "-redirect", redirect);
                push_flag(&mut args, "-col", category);
            }
        }
        Self { mode, args }
    }

    /// Arguments with the session token replaced by [`TOKEN_PLACEHOLDER`].
    ///
    /// `auth` carries no token and is returned unchanged.
    pub fn redacted_args(&self) -> Vec<String> {
        let mut redacted = self.args.clone();
        if self.mode != ToolMode::Auth
            && let Some(value) = redacted.get_mut(TOKEN_SLOT)
        {
            *value = TOKEN_PLACEHOLDER.to_string();
        }
        redacted
    }

    /// Redacted call rendered as a shell command line for `program`.
    pub fn command_line(&self, program: &str) -> String {
        std::iter::once(program.to_string())
            .chain(self.redacted_args())
            .map(|arg| shell_quote(&arg))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Single-quote `arg` when a POSIX shell would split or expand it.
fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@%+,".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

fn push_flag(args: &mut Vec<String>, flag: &str, value: &str) {
    args.push(flag.to_string());
    args.push(value.to_string());
}
