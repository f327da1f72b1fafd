// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

//! Configuration for the kompile test harness.
//!
//! A [`Compilation`] is the flat record of options governing one compile
//! call. It can be built in code or read from a `kompile.toml` file through
//! [`KompileToml`].

mod compilation;
mod error;
mod manifest;

pub use compilation::{Compilation, JVM_TARGETS, OPTION_KAPT_KOTLIN_GENERATED};
pub use error::{Error, Result, SourceContext};
pub use manifest::{KompileToml, Manifest, SourceRoots, load_sources, parse_manifest};
