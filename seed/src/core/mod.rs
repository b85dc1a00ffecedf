//! Deterministic seeding logic: record types, manifest ordering, argument
//! construction and reporting. No I/O.

pub mod invocation;
pub mod manifest;
pub mod report;
pub mod types;
