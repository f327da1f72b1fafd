//! Pipeline stage trait.

use eyre::Result;
use kompile_core::ExitCode;

use super::CompilationContext;

/// A stage of the compilation pipeline.
///
/// Stages report compiler failures as a non-`Ok` [`ExitCode`]; an error
/// aborts the compile call without a result.
pub trait Stage: Send + Sync {
    /// The name of this stage (used in logs and hooks).
    fn name(&self) -> &'static str;

    /// A human-readable description of what this stage does.
    fn description(&self) -> &'static str;

    /// Whether the stage has anything to do. A stage that doesn't is skipped
    /// and counts as successful.
    fn is_needed(&self, ctx: &CompilationContext<'_>) -> bool;

    /// Whether the stage runs the Kotlin front end, which needs the
    /// front-end system properties set while it runs.
    fn uses_kotlin_frontend(&self) -> bool {
        false
    }

    /// Run this stage.
    ///
    /// # Errors
    ///
    /// Returns an error if the harness itself fails (I/O on the workspace,
    /// an unexpected compiler service failure).
    fn run(&self, ctx: &mut CompilationContext<'_>) -> Result<ExitCode>;
}
