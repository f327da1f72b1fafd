//! Core types for the kompile compilation test harness.
//!
//! This crate provides the value types shared by the configuration layer,
//! the pipeline and the CLI.

mod file;
mod source;
mod status;
mod version;

// File operations
pub use file::{File, Overwrite, WriteResult};
// Sources
pub use source::{Language, SourceUnit};
// Stage outcomes
pub use status::ExitCode;
pub use version::JavaVersion;
