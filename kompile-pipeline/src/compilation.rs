//! The compile-call entry point.

use std::{
    io::{self, Write},
    sync::Arc,
};

use eyre::{Context, Result};
use kompile_config::Compilation;
use tracing::{info, instrument};

use crate::{
    frontend::{KotlinFrontend, KotlincProcess},
    host::{HostEnvironment, SystemHost},
    javac::{self, JavaCompilerService},
    kapt::{AnnotationProcessor, GenerationRegistration},
    materialize::materialize,
    output::MessageStream,
    pipeline::{CompilationContext, Pipeline, StageHook, StageRecord},
    resolve::ResolvedCompilation,
    result::CompilationResult,
};

/// Compiles in-memory sources through kapt, kotlinc and javac.
///
/// # Example
///
/// ```ignore
/// let result = KotlinCompilation::new(
///     Compilation::new().source(SourceUnit::kotlin("Foo", "class Foo")?),
/// )
/// .message_sink(io::sink())
/// .compile()?;
///
/// assert!(result.exit_code().is_ok());
/// ```
pub struct KotlinCompilation {
    compilation: Compilation,
    processors: Vec<Arc<dyn AnnotationProcessor>>,
    frontend: Arc<dyn KotlinFrontend>,
    java_compiler: Option<Arc<dyn JavaCompilerService>>,
    host: Arc<dyn HostEnvironment>,
    hooks: Vec<Arc<dyn StageHook>>,
    messages: Box<dyn Write + Send>,
    last_stages: Vec<StageRecord>,
}

impl KotlinCompilation {
    /// A compilation driving the `kotlinc` process and the host's javac,
    /// printing to stdout.
    pub fn new(compilation: Compilation) -> Self {
        let frontend = Arc::new(KotlincProcess::new(compilation.kotlinc.clone()));
        Self {
            compilation,
            processors: Vec::new(),
            frontend,
            java_compiler: None,
            host: Arc::new(SystemHost),
            hooks: Vec::new(),
            messages: Box::new(io::stdout()),
            last_stages: Vec::new(),
        }
    }

    pub fn compilation(&self) -> &Compilation {
        &self.compilation
    }

    /// Register an annotation processor. Registering any enables kapt.
    pub fn processor(mut self, processor: Arc<dyn AnnotationProcessor>) -> Self {
        self.processors.push(processor);
        self
    }

    pub fn frontend(mut self, frontend: Arc<dyn KotlinFrontend>) -> Self {
        self.frontend = frontend;
        self
    }

    /// Replace the host compiler used when no JDK home is configured.
    pub fn java_compiler(mut self, service: Arc<dyn JavaCompilerService>) -> Self {
        self.java_compiler = Some(service);
        self
    }

    pub fn host(mut self, host: Arc<dyn HostEnvironment>) -> Self {
        self.host = host;
        self
    }

    pub fn hook(mut self, hook: Arc<dyn StageHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Where compiler output is printed while it runs.
    pub fn message_sink(mut self, sink: impl Write + Send + 'static) -> Self {
        self.messages = Box::new(sink);
        self
    }

    /// Stages visited by the last compile call.
    pub fn last_stages(&self) -> &[StageRecord] {
        &self.last_stages
    }

    /// Run one compilation.
    ///
    /// Compiler failures are reported through the result's exit code.
    ///
    /// # Errors
    ///
    /// Fails before any stage runs on configuration errors
    /// ([`kompile_config::Error`], e.g. a required `tools.jar` is missing),
    /// and aborts without a result when the harness itself fails.
    #[instrument(skip(self), fields(sources = self.compilation.sources.len()))]
    pub fn compile(&mut self) -> Result<CompilationResult> {
        let resolved = ResolvedCompilation::resolve(
            self.compilation.clone(),
            self.host.as_ref(),
            !self.processors.is_empty(),
        )
        .map_err(|err| eyre::Report::new(*err))?;

        let workspace = resolved.workspace.clone();
        workspace.create()?;
        let staged = materialize(&resolved.compilation.sources, &workspace.sources())?;
        info!(
            root = %workspace.root().display(),
            processors = self.processors.len(),
            "compiling"
        );

        let registration = (!self.processors.is_empty())
            .then(|| Arc::new(GenerationRegistration::new(self.processors.clone(), &resolved)));
        let generated_source_dirs = vec![
            workspace.kapt_sources(),
            resolved.kotlin_generated_dir.clone(),
        ];
        let javac = javac::select(&resolved, self.java_compiler.clone());
        let pipeline = Pipeline::standard(self.frontend.clone(), registration, javac)
            .hooks(self.hooks.iter().cloned());

        let mut ctx =
            CompilationContext::new(resolved, staged, MessageStream::new(&mut *self.messages));
        let exit_code = pipeline.run(&mut ctx)?;

        let CompilationContext {
            resolved,
            messages,
            records,
            ..
        } = ctx;
        let messages = messages
            .finish()
            .wrap_err("failed to write compiler messages")?;
        self.last_stages = records;
        info!(%exit_code, "compilation finished");

        Ok(CompilationResult::new(
            exit_code,
            resolved.classes_dir(),
            messages,
            generated_source_dirs,
            resolved.classpath,
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use kompile_core::{ExitCode, SourceUnit};
    use tempfile::TempDir;

    use super::*;
    use crate::testing::{self, FakeJavac, FakeKotlinc, SharedSink, StaticHost};

    fn compilation(temp: &TempDir) -> Compilation {
        Compilation::new().working_dir(temp.path())
    }

    #[test]
    fn test_empty_compilation_runs_nothing() {
        let temp = TempDir::new().unwrap();
        let kotlinc = Arc::new(FakeKotlinc::new());

        let mut compilation = KotlinCompilation::new(compilation(&temp))
            .host(Arc::new(StaticHost::default()))
            .frontend(kotlinc.clone())
            .message_sink(io::sink());
        let result = compilation.compile().unwrap();

        assert_eq!(result.exit_code(), ExitCode::Ok);
        assert!(kotlinc.calls().is_empty());
        assert!(
            compilation
                .last_stages()
                .iter()
                .all(|r| r.outcome == crate::pipeline::StageOutcome::Skipped)
        );
        assert!(temp.path().join("kapt/kotlinGenerated").is_dir());
    }

    #[test]
    fn test_messages_reach_sink_and_result() {
        let _serial = testing::serial();
        let temp = TempDir::new().unwrap();
        let sink = SharedSink::default();

        let result = KotlinCompilation::new(
            compilation(&temp).source(SourceUnit::kotlin("Broken", "class Broken {").unwrap()),
        )
        .host(Arc::new(StaticHost::default()))
        .frontend(Arc::new(FakeKotlinc::new()))
        .java_compiler(Arc::new(FakeJavac::new()))
        .message_sink(sink.clone())
        .compile()
        .unwrap();

        assert_eq!(result.exit_code(), ExitCode::CompilationError);
        assert!(result.messages().contains("e: "));
        assert_eq!(sink.contents(), result.messages());
    }

    #[test]
    fn test_configuration_error_is_typed() {
        let temp = TempDir::new().unwrap();

        let err = KotlinCompilation::new(compilation(&temp).jdk_home(temp.path().join("nope")))
            .host(Arc::new(StaticHost::default()))
            .message_sink(io::sink())
            .compile()
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<kompile_config::Error>(),
            Some(kompile_config::Error::JdkHomeNotFound { .. })
        ));
    }

    #[test]
    fn test_hooks_see_each_stage() {
        struct Names(Mutex<Vec<String>>);

        impl StageHook for Names {
            fn name(&self) -> &'static str {
                "names"
            }

            fn on_before_stage(&self, stage: &str, _ctx: &mut CompilationContext<'_>) -> Result<()> {
                self.0.lock().unwrap().push(stage.to_string());
                Ok(())
            }
        }

        let _serial = testing::serial();
        let temp = TempDir::new().unwrap();
        let names = Arc::new(Names(Mutex::new(Vec::new())));

        KotlinCompilation::new(
            compilation(&temp)
                .source(SourceUnit::kotlin("A", "class A").unwrap())
                .source(SourceUnit::java("B", "class B {}").unwrap()),
        )
        .host(Arc::new(StaticHost::default()))
        .frontend(Arc::new(FakeKotlinc::new()))
        .java_compiler(Arc::new(FakeJavac::new()))
        .hook(names.clone())
        .message_sink(io::sink())
        .compile()
        .unwrap();

        assert_eq!(*names.0.lock().unwrap(), vec!["kotlin", "java"]);
    }
}
