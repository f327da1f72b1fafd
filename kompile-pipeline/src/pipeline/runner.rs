//! Pipeline orchestrator.

use std::sync::Arc;

use eyre::{Context, Result};
use kompile_core::ExitCode;
use tracing::debug;

use super::{
    CompilationContext, Stage, StageHook, StageOutcome,
    stages::{JavaStage, KaptStage, KotlinStage},
};
use crate::{
    frontend::KotlinFrontend,
    javac::JavacStrategy,
    kapt::GenerationRegistration,
    properties::{NATIVE_FS_FOR_WIN, ScopedProperty},
};

/// The compilation pipeline orchestrator.
///
/// Runs stages in order, calling hooks around each stage that runs, and
/// stops at the first stage that reports anything but [`ExitCode::Ok`].
///
/// # Example
///
/// ```ignore
/// let pipeline = Pipeline::standard(frontend, registration, javac)
///     .hook(Arc::new(MyHook));
///
/// let code = pipeline.run(&mut ctx)?;
/// ```
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
    hooks: Vec<Arc<dyn StageHook>>,
}

impl Pipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self {
            stages: Vec::new(),
            hooks: Vec::new(),
        }
    }

    /// kapt, then Kotlin, then Java.
    pub fn standard(
        frontend: Arc<dyn KotlinFrontend>,
        registration: Option<Arc<GenerationRegistration>>,
        javac: Box<dyn JavacStrategy>,
    ) -> Self {
        Self::new()
            .stage(KaptStage::new(frontend.clone(), registration))
            .stage(KotlinStage::new(frontend))
            .stage(JavaStage::new(javac))
    }

    /// Append a stage.
    pub fn stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Add a hook to receive stage lifecycle callbacks.
    pub fn hook(mut self, hook: Arc<dyn StageHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn hooks(mut self, hooks: impl IntoIterator<Item = Arc<dyn StageHook>>) -> Self {
        self.hooks.extend(hooks);
        self
    }

    /// Run every stage. Returns the exit code of the first stage that didn't
    /// succeed, or `Ok` when all of them did (or were skipped).
    ///
    /// Front-end system properties are set for consecutive stages that use
    /// the Kotlin front end and restored before any other stage runs and on
    /// every exit path.
    ///
    /// # Errors
    ///
    /// Returns an error if a stage or hook fails.
    pub fn run(&self, ctx: &mut CompilationContext<'_>) -> Result<ExitCode> {
        let mut frontend_properties: Option<ScopedProperty> = None;

        for stage in &self.stages {
            let name = stage.name();
            if !stage.is_needed(ctx) {
                debug!(stage = name, "skipping stage");
                ctx.record(name, StageOutcome::Skipped);
                continue;
            }

            if stage.uses_kotlin_frontend() {
                frontend_properties
                    .get_or_insert_with(|| ScopedProperty::set(NATIVE_FS_FOR_WIN, "false"));
            } else {
                frontend_properties = None;
            }

            let code = self.run_stage(stage.as_ref(), ctx)?;
            if !code.is_ok() {
                debug!(stage = name, %code, "stage failed, stopping");
                return Ok(code);
            }
        }

        Ok(ExitCode::Ok)
    }

    /// Run a single stage with hooks.
    fn run_stage(&self, stage: &dyn Stage, ctx: &mut CompilationContext<'_>) -> Result<ExitCode> {
        let name = stage.name();

        for hook in &self.hooks {
            hook.on_before_stage(name, ctx)
                .wrap_err_with(|| format!("hook {} failed before {}", hook.name(), name))?;
        }

        debug!(stage = name, description = stage.description(), "running stage");
        let code = stage
            .run(ctx)
            .wrap_err_with(|| format!("{} stage failed", name))?;
        ctx.record(name, StageOutcome::Ran(code));
        debug!(stage = name, %code, "stage finished");

        for hook in &self.hooks {
            hook.on_after_stage(name, code, ctx)
                .wrap_err_with(|| format!("hook {} failed after {}", hook.name(), name))?;
        }

        Ok(code)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    use kompile_config::Compilation;
    use tempfile::TempDir;

    use super::*;
    use crate::{
        output::MessageStream,
        pipeline::StageRecord,
        properties,
        resolve::ResolvedCompilation,
        testing::{self, StaticHost},
    };

    /// Returns a fixed code and records the native-fs property it saw.
    struct FixedStage {
        name: &'static str,
        needed: bool,
        frontend: bool,
        code: ExitCode,
        seen: Seen,
    }

    impl Stage for FixedStage {
        fn name(&self) -> &'static str {
            self.name
        }

        fn description(&self) -> &'static str {
            "returns a fixed exit code"
        }

        fn is_needed(&self, _ctx: &CompilationContext<'_>) -> bool {
            self.needed
        }

        fn uses_kotlin_frontend(&self) -> bool {
            self.frontend
        }

        fn run(&self, _ctx: &mut CompilationContext<'_>) -> Result<ExitCode> {
            self.seen
                .lock()
                .unwrap()
                .push((self.name, properties::property(NATIVE_FS_FOR_WIN)));
            Ok(self.code)
        }
    }

    struct CountingHook {
        before: AtomicUsize,
        after: AtomicUsize,
    }

    impl StageHook for CountingHook {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn on_before_stage(&self, _stage: &str, _ctx: &mut CompilationContext<'_>) -> Result<()> {
            self.before.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn on_after_stage(
            &self,
            _stage: &str,
            _code: ExitCode,
            _ctx: &mut CompilationContext<'_>,
        ) -> Result<()> {
            self.after.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    type Seen = Arc<Mutex<Vec<(&'static str, Option<String>)>>>;

    fn stage(
        name: &'static str,
        needed: bool,
        frontend: bool,
        code: ExitCode,
        seen: &Seen,
    ) -> FixedStage {
        FixedStage {
            name,
            needed,
            frontend,
            code,
            seen: seen.clone(),
        }
    }

    fn run(pipeline: &Pipeline) -> (ExitCode, Vec<StageRecord>) {
        let temp = TempDir::new().unwrap();
        let resolved = ResolvedCompilation::resolve(
            Compilation::new().working_dir(temp.path()),
            &StaticHost::default(),
            false,
        )
        .unwrap();
        let mut sink = Vec::new();
        let mut ctx =
            CompilationContext::new(resolved, Vec::new(), MessageStream::new(&mut sink));
        let code = pipeline.run(&mut ctx).unwrap();
        (code, ctx.records)
    }

    #[test]
    fn test_stops_at_first_failure() {
        let _serial = testing::serial();
        let seen = Seen::default();
        let hook = Arc::new(CountingHook {
            before: AtomicUsize::new(0),
            after: AtomicUsize::new(0),
        });
        let pipeline = Pipeline::new()
            .stage(stage("a", false, true, ExitCode::Ok, &seen))
            .stage(stage("b", true, true, ExitCode::CompilationError, &seen))
            .stage(stage("c", true, false, ExitCode::Ok, &seen))
            .hook(hook.clone());

        let (code, records) = run(&pipeline);

        assert_eq!(code, ExitCode::CompilationError);
        assert_eq!(
            records.iter().map(|r| (r.stage, r.outcome)).collect::<Vec<_>>(),
            vec![
                ("a", StageOutcome::Skipped),
                ("b", StageOutcome::Ran(ExitCode::CompilationError)),
            ]
        );
        assert_eq!(hook.before.load(Ordering::SeqCst), 1);
        assert_eq!(hook.after.load(Ordering::SeqCst), 1);
        assert_eq!(properties::property(NATIVE_FS_FOR_WIN), None);
    }

    #[test]
    fn test_frontend_properties_scope() {
        let _serial = testing::serial();
        let seen = Seen::default();
        let pipeline = Pipeline::new()
            .stage(stage("a", true, true, ExitCode::Ok, &seen))
            .stage(stage("b", true, true, ExitCode::Ok, &seen))
            .stage(stage("c", true, false, ExitCode::Ok, &seen));

        let (code, _) = run(&pipeline);

        assert_eq!(code, ExitCode::Ok);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                ("a", Some("false".to_string())),
                ("b", Some("false".to_string())),
                ("c", None),
            ]
        );
        assert_eq!(properties::property(NATIVE_FS_FOR_WIN), None);
    }
}
