//! Error taxonomy for seeding operations.
//!
//! Per-record mutation failures are not errors here: they are captured as
//! failed outcomes in the apply report.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("invalid control tool name {name:?}: expected a bare file name")]
    InvalidToolName { name: String },

    #[error("the {name} binary could not be found in the system path")]
    ToolNotFound { name: String },

    #[error("target address is not set (export {var} or pass --address)")]
    MissingAddress { var: String },

    #[error("authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("authentication returned an empty session token")]
    EmptyToken,

    #[error("invalid manifest:\n- {}", .problems.join("\n- "))]
    InvalidManifest { problems: Vec<String> },
}
