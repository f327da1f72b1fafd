use std::sync::Arc;

use eyre::Result;
use kompile_core::ExitCode;
use tracing::debug;

use super::frontend_args;
use crate::{
    frontend::{FrontendMode, K2JvmArgs, KotlinFrontend},
    pipeline::{CompilationContext, Stage},
};

/// Compiles original and kapt-generated Kotlin sources into the classes
/// directory.
pub struct KotlinStage {
    frontend: Arc<dyn KotlinFrontend>,
}

impl KotlinStage {
    pub fn new(frontend: Arc<dyn KotlinFrontend>) -> Self {
        Self { frontend }
    }
}

impl Stage for KotlinStage {
    fn name(&self) -> &'static str {
        "kotlin"
    }

    fn description(&self) -> &'static str {
        "Compile Kotlin sources"
    }

    fn is_needed(&self, ctx: &CompilationContext<'_>) -> bool {
        !ctx.kotlin_sources().is_empty()
    }

    fn uses_kotlin_frontend(&self) -> bool {
        true
    }

    fn run(&self, ctx: &mut CompilationContext<'_>) -> Result<ExitCode> {
        let resolved = &ctx.resolved;
        let args = K2JvmArgs {
            mode: FrontendMode::Compile,
            sources: ctx.kotlin_sources(),
            // Java sources are passed for reference only, kotlinc compiles none of them
            java_sources: ctx.java_sources(),
            destination: resolved.classes_dir(),
            ..frontend_args(resolved)
        };

        debug!(
            frontend = self.frontend.name(),
            sources = args.sources.len(),
            "compiling Kotlin"
        );
        self.frontend.exec(&args, &mut ctx.messages)
    }
}
