//! The staged compilation pipeline.
//!
//! A [`Pipeline`] runs its stages in order against one
//! [`CompilationContext`]:
//!
//! - kapt: stubs and annotation processing (only with processors)
//! - kotlin: Kotlin compilation (only with Kotlin sources)
//! - java: Java compilation (only with Java sources)
//!
//! The first stage that doesn't report [`ExitCode::Ok`] stops the pipeline.
//! [`StageHook`]s are called around every stage that runs.
//!
//! [`ExitCode::Ok`]: kompile_core::ExitCode::Ok

mod context;
mod hook;
mod runner;
mod stage;
pub mod stages;

pub use context::{CompilationContext, StageOutcome, StageRecord};
pub use hook::StageHook;
pub use runner::Pipeline;
pub use stage::Stage;
