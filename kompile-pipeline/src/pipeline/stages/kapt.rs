use std::{path::PathBuf, sync::Arc};

use eyre::Result;
use kompile_core::{ExitCode, File, Language};
use tracing::debug;

use super::frontend_args;
use crate::{
    frontend::{FrontendMode, K2JvmArgs, KotlinFrontend},
    kapt::{self, GenerationRegistration, registrar},
    materialize::of_language,
    pipeline::{CompilationContext, Stage},
    workspace::Workspace,
};

const PLACEHOLDER: &str = "EmptyPlaceholder.kt";

/// Generates stubs and runs annotation processors.
pub struct KaptStage {
    frontend: Arc<dyn KotlinFrontend>,
    registration: Option<Arc<GenerationRegistration>>,
}

impl KaptStage {
    pub fn new(
        frontend: Arc<dyn KotlinFrontend>,
        registration: Option<Arc<GenerationRegistration>>,
    ) -> Self {
        Self {
            frontend,
            registration,
        }
    }
}

/// kotlinc needs at least one Kotlin input, even when only Java sources are
/// processed.
fn write_placeholder(workspace: &Workspace) -> Result<PathBuf> {
    let path = workspace.kapt_placeholder().join(PLACEHOLDER);
    File::new(&path, "// no Kotlin sources\n").write()?;
    Ok(path)
}

impl Stage for KaptStage {
    fn name(&self) -> &'static str {
        "kapt"
    }

    fn description(&self) -> &'static str {
        "Generate stubs and run annotation processors"
    }

    fn is_needed(&self, _ctx: &CompilationContext<'_>) -> bool {
        self.registration
            .as_ref()
            .is_some_and(|r| !r.processors.is_empty())
    }

    fn uses_kotlin_frontend(&self) -> bool {
        true
    }

    fn run(&self, ctx: &mut CompilationContext<'_>) -> Result<ExitCode> {
        let Some(registration) = self.registration.clone() else {
            return Ok(ExitCode::Ok);
        };
        let resolved = &ctx.resolved;
        let workspace = &resolved.workspace;

        let mut sources = of_language(&ctx.staged, Language::Kotlin);
        if sources.is_empty() {
            sources.push(write_placeholder(workspace)?);
        }

        let mut plugin_classpaths: Vec<PathBuf> = resolved.tools_jar.iter().cloned().collect();
        plugin_classpaths.push(registrar::write_service_file(&workspace.kapt_registrar())?);
        plugin_classpaths.extend(resolved.runtime.kapt_plugin.iter().cloned());

        let args = K2JvmArgs {
            mode: FrontendMode::StubsAndApt,
            sources,
            java_sources: of_language(&ctx.staged, Language::Java),
            destination: workspace.kapt_incremental_data(),
            plugin_classpaths,
            plugin_options: registration.plugin_options(resolved.compilation.verbose),
            ..frontend_args(resolved)
        };

        debug!(
            frontend = self.frontend.name(),
            processors = registration.processors.len(),
            kotlin_sources = args.sources.len(),
            java_sources = args.java_sources.len(),
            "running kapt"
        );
        let _registration = kapt::install(registration);
        self.frontend.exec(&args, &mut ctx.messages)
    }
}
