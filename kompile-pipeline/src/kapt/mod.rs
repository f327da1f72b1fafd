//! Annotation processing (kapt).
//!
//! Processors are registered on a [`GenerationRegistration`]. The front end
//! finds this crate's registrar through a service file on its plugin
//! classpath and instantiates it itself, so the registration reaches the
//! registrar through a thread-keyed [`HandoffSlot`] rather than as an
//! argument.

mod element;
mod processing;
pub mod registrar;

use std::{
    collections::BTreeMap,
    fmt,
    path::PathBuf,
    sync::{Arc, LazyLock},
};

pub use element::{Element, ElementKind, parse_elements};
pub use processing::{AnnotationProcessor, Filer, ProcessingEnvironment, RoundEnvironment};
pub use registrar::{ComponentRegistrar, KaptComponentRegistrar, run_plugins};

use kompile_config::OPTION_KAPT_KOTLIN_GENERATED;

use crate::{
    handoff::{HandoffGuard, HandoffSlot},
    resolve::ResolvedCompilation,
};

/// Compiler-plugin id of kapt.
pub const KAPT_PLUGIN_ID: &str = "org.jetbrains.kotlin.kapt3";

static REGISTRATION: LazyLock<HandoffSlot<Arc<GenerationRegistration>>> =
    LazyLock::new(HandoffSlot::new);

/// A `-P` value for the kapt plugin.
pub fn plugin_option(key: &str, value: impl fmt::Display) -> String {
    format!("plugin:{}:{}={}", KAPT_PLUGIN_ID, key, value)
}

/// Where processing reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KaptDirectories {
    /// Generated Java sources.
    pub java_sources: PathBuf,
    /// Generated Kotlin sources.
    pub kotlin_generated: PathBuf,
    /// Java stubs of the Kotlin sources.
    pub stubs: PathBuf,
    pub incremental_data: PathBuf,
    pub classes: PathBuf,
}

impl KaptDirectories {
    pub fn from_resolved(resolved: &ResolvedCompilation) -> Self {
        let workspace = &resolved.workspace;
        Self {
            java_sources: workspace.kapt_sources(),
            kotlin_generated: resolved.kotlin_generated_dir.clone(),
            stubs: workspace.kapt_stubs(),
            incremental_data: workspace.kapt_incremental_data(),
            classes: workspace.classes(),
        }
    }
}

/// Processors plus everything they need for one Stage A run.
#[derive(Clone)]
pub struct GenerationRegistration {
    pub processors: Vec<Arc<dyn AnnotationProcessor>>,
    /// Options visible to processors. Always carries `kapt.kotlin.generated`.
    pub options: BTreeMap<String, String>,
    pub directories: KaptDirectories,
    pub correct_error_types: bool,
}

impl GenerationRegistration {
    pub fn new(processors: Vec<Arc<dyn AnnotationProcessor>>, resolved: &ResolvedCompilation) -> Self {
        let directories = KaptDirectories::from_resolved(resolved);
        let mut options = resolved.compilation.kapt_args.clone();
        options.insert(
            OPTION_KAPT_KOTLIN_GENERATED.to_string(),
            directories.kotlin_generated.display().to_string(),
        );
        Self {
            processors,
            options,
            directories,
            correct_error_types: resolved.compilation.correct_error_types,
        }
    }

    /// Plugin options describing this run to the kapt compiler plugin.
    pub fn plugin_options(&self, verbose: bool) -> Vec<String> {
        let dirs = &self.directories;
        let mut options = vec![
            plugin_option("sources", dirs.java_sources.display()),
            plugin_option("classes", dirs.classes.display()),
            plugin_option("stubs", dirs.stubs.display()),
            plugin_option("incrementalData", dirs.incremental_data.display()),
            plugin_option("aptMode", "stubs"),
            plugin_option("correctErrorTypes", self.correct_error_types),
            plugin_option("verbose", verbose),
        ];
        options.extend(
            self.options
                .iter()
                .map(|(k, v)| plugin_option("apOption", format_args!("{}={}", k, v))),
        );
        options
    }
}

impl fmt::Debug for GenerationRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationRegistration")
            .field(
                "processors",
                &self.processors.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field("options", &self.options)
            .field("directories", &self.directories)
            .field("correct_error_types", &self.correct_error_types)
            .finish()
    }
}

/// Hand `registration` to registrars created on this thread until the guard
/// drops.
pub fn install(
    registration: Arc<GenerationRegistration>,
) -> HandoffGuard<'static, Arc<GenerationRegistration>> {
    REGISTRATION.install(registration)
}

/// The registration installed on this thread.
pub fn current() -> Option<Arc<GenerationRegistration>> {
    REGISTRATION.get()
}
