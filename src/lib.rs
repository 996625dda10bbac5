//! crash-analyzer - crash dump triage for CI jobs
//!
//! Caches CI job artifacts, maps a job to the debug symbols of the build it
//! tested and prepares dump and symbol files for external debuggers.

pub mod archive;
pub mod ci;
pub mod cli;
pub mod config;
pub mod debugger;
pub mod error;
pub mod remote;
pub mod resolve;
pub mod session;
pub mod store;
pub mod ui;

pub use error::{CrashError, CrashResult};
