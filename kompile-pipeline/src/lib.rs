//! Compilation pipeline for the kompile test harness.
//!
//! A [`KotlinCompilation`] stages in-memory sources into a workspace and
//! compiles them in up to three stages: annotation processing (kapt), Kotlin
//! compilation and Java compilation. The outcome is a [`CompilationResult`].
//!
//! # Module Organization
//!
//! - [`resolve`] - Configuration finalized against the host toolchain
//! - [`pipeline`] - Stage orchestration (Pipeline, Stage, StageHook)
//! - [`frontend`] - The Kotlin compiler front end
//! - [`kapt`] - Annotation processors and their registration
//! - [`javac`] - Java compilation strategies
//! - [`result`] - Compilation results and class loading
//! - [`testing`] - Toolchain test doubles (feature-gated)

pub mod classpath;
mod compilation;
pub mod diagnostic;
pub mod frontend;
pub mod handoff;
pub mod host;
pub mod javac;
pub mod kapt;
pub mod materialize;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod properties;
pub mod resolve;
pub mod result;
pub mod workspace;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use compilation::KotlinCompilation;
pub use kompile_config::Compilation;
pub use kompile_core::{ExitCode, Language, SourceUnit};
pub use result::{ClassLoadError, ClassLoader, CompilationResult, LoadedClass};
