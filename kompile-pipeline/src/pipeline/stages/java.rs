use eyre::Result;
use kompile_core::ExitCode;
use tracing::debug;

use crate::{
    javac::JavacStrategy,
    pipeline::{CompilationContext, Stage},
};

/// Compiles original and kapt-generated Java sources against the common
/// classpath and the classes compiled so far.
pub struct JavaStage {
    strategy: Box<dyn JavacStrategy>,
}

impl JavaStage {
    pub fn new(strategy: Box<dyn JavacStrategy>) -> Self {
        Self { strategy }
    }
}

impl Stage for JavaStage {
    fn name(&self) -> &'static str {
        "java"
    }

    fn description(&self) -> &'static str {
        "Compile Java sources"
    }

    fn is_needed(&self, ctx: &CompilationContext<'_>) -> bool {
        !ctx.java_sources().is_empty()
    }

    fn run(&self, ctx: &mut CompilationContext<'_>) -> Result<ExitCode> {
        let sources = ctx.java_sources();
        debug!(
            strategy = self.strategy.name(),
            sources = sources.len(),
            "compiling Java"
        );
        self.strategy
            .compile(&ctx.resolved, &sources, &mut ctx.messages)
    }
}
