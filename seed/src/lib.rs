//! One-shot seeding orchestrator for a keiji site.
//!
//! Locates the `keiji-ctl` control tool, obtains a session token through its
//! `auth` mode, then applies a seed manifest (assets, navbar links, menu
//! links, admin panel links) with one tool call per record.
//!
//! - **[`core`]**: Pure, deterministic logic (record ordering, argument
//!   construction, reporting). No I/O.
//! - **[`io`]**: Side-effecting operations (config and manifest files, `PATH`
//!   lookup, child processes).
//!
//! [`auth`], [`apply`] and [`seed`] combine the two into the CLI commands.

pub mod apply;
pub mod auth;
pub mod core;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod seed;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use error::SeedError;
