//! Stage lifecycle hooks.

use eyre::Result;
use kompile_core::ExitCode;

use super::CompilationContext;

/// Receives callbacks around every stage that runs. Skipped stages produce
/// no callbacks.
///
/// # Example
///
/// ```ignore
/// struct Timing(Mutex<Option<Instant>>);
///
/// impl StageHook for Timing {
///     fn name(&self) -> &'static str { "timing" }
///
///     fn on_before_stage(&self, _stage: &str, _ctx: &mut CompilationContext<'_>) -> Result<()> {
///         *self.0.lock().unwrap() = Some(Instant::now());
///         Ok(())
///     }
///
///     fn on_after_stage(&self, stage: &str, _code: ExitCode, _ctx: &mut CompilationContext<'_>) -> Result<()> {
///         if let Some(start) = *self.0.lock().unwrap() {
///             eprintln!("{} took {:?}", stage, start.elapsed());
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait StageHook: Send + Sync {
    /// The name of this hook (for debugging and logging).
    fn name(&self) -> &'static str;

    /// Called before a stage runs.
    ///
    /// # Errors
    ///
    /// Return an error to abort the compile call.
    #[allow(unused_variables)]
    fn on_before_stage(&self, stage: &str, ctx: &mut CompilationContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Called after a stage ran, whatever its exit code.
    ///
    /// # Errors
    ///
    /// Return an error to abort the compile call.
    #[allow(unused_variables)]
    fn on_after_stage(
        &self,
        stage: &str,
        code: ExitCode,
        ctx: &mut CompilationContext<'_>,
    ) -> Result<()> {
        Ok(())
    }
}
