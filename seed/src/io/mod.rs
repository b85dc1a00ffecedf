//! I/O for the seeder: config and manifest files, tool lookup and child
//! processes.

pub mod config;
pub mod control;
pub mod locate;
pub mod manifest_store;
pub mod process;
