//! Compiler-plugin registration through service files.
//!
//! A plugin-classpath directory registers compiler plugins by listing
//! registrar names in
//! `META-INF/services/org.jetbrains.kotlin.compiler.plugin.ComponentRegistrar`,
//! one per line. Front ends that run plugins in-process call
//! [`run_plugins`], which instantiates every registrar it knows by name.

use std::{
    io::Write,
    path::{Path, PathBuf},
};

use eyre::{Context, Result};
use kompile_core::{ExitCode, File, Language};
use tracing::debug;

use super::{GenerationRegistration, processing};
use crate::{frontend::K2JvmArgs, materialize::find_sources};

/// Service interface under which registrars are listed.
pub const COMPONENT_REGISTRAR_SERVICE: &str =
    "org.jetbrains.kotlin.compiler.plugin.ComponentRegistrar";

/// Name under which [`KaptComponentRegistrar`] is listed.
pub const KAPT_REGISTRAR: &str = "kompile.KaptComponentRegistrar";

/// A compiler plugin the front end instantiates on its own.
pub trait ComponentRegistrar {
    fn name(&self) -> &'static str;

    /// Run the plugin against one front-end invocation.
    fn run(&self, args: &K2JvmArgs, messages: &mut dyn Write) -> Result<ExitCode>;
}

/// Path of the service file under a plugin-classpath directory.
pub fn service_file(dir: &Path) -> PathBuf {
    dir.join("META-INF")
        .join("services")
        .join(COMPONENT_REGISTRAR_SERVICE)
}

/// Write the service file registering [`KaptComponentRegistrar`] under `dir`
/// and return `dir`.
pub fn write_service_file(dir: &Path) -> Result<PathBuf> {
    File::new(service_file(dir), format!("{}\n", KAPT_REGISTRAR))
        .write()
        .wrap_err("failed to write the kapt registrar service file")?;
    Ok(dir.to_path_buf())
}

/// Instantiate the registrars listed by the directory entries of
/// `plugin_classpaths`, in classpath order.
pub fn discover(plugin_classpaths: &[PathBuf]) -> Result<Vec<Box<dyn ComponentRegistrar>>> {
    let mut registrars: Vec<Box<dyn ComponentRegistrar>> = Vec::new();
    for entry in plugin_classpaths.iter().filter(|p| p.is_dir()) {
        let path = service_file(entry);
        if !path.is_file() {
            continue;
        }
        let listing = std::fs::read_to_string(&path)
            .wrap_err_with(|| format!("failed to read {}", path.display()))?;
        for name in listing
            .lines()
            .map(|line| line.split('#').next().unwrap_or_default().trim())
            .filter(|line| !line.is_empty())
        {
            match name {
                KAPT_REGISTRAR => registrars.push(Box::new(KaptComponentRegistrar)),
                other => debug!(registrar = other, "ignoring unknown compiler plugin"),
            }
        }
    }
    Ok(registrars)
}

/// Run every registrar found on `args.plugin_classpaths`. Stops at the first
/// one that doesn't succeed.
pub fn run_plugins(args: &K2JvmArgs, messages: &mut dyn Write) -> Result<ExitCode> {
    for registrar in discover(&args.plugin_classpaths)? {
        debug!(registrar = registrar.name(), "running compiler plugin");
        let code = registrar.run(args, messages)?;
        if !code.is_ok() {
            return Ok(code);
        }
    }
    Ok(ExitCode::Ok)
}

/// Runs the annotation processors of the [`GenerationRegistration`]
/// installed on the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct KaptComponentRegistrar;

impl KaptComponentRegistrar {
    /// Java sources, then stubs, then Kotlin sources.
    fn inputs(args: &K2JvmArgs, registration: &GenerationRegistration) -> Vec<PathBuf> {
        let mut inputs = args.java_sources.clone();
        inputs.extend(find_sources(&registration.directories.stubs, Language::Java));
        inputs.extend(args.sources.iter().cloned());
        inputs
    }
}

impl ComponentRegistrar for KaptComponentRegistrar {
    fn name(&self) -> &'static str {
        "kapt"
    }

    fn run(&self, args: &K2JvmArgs, messages: &mut dyn Write) -> Result<ExitCode> {
        let Some(registration) = super::current() else {
            writeln!(
                messages,
                "error: no annotation processing registration is installed on this thread"
            )?;
            return Ok(ExitCode::InternalError);
        };

        let inputs = Self::inputs(args, &registration);
        debug!(
            processors = registration.processors.len(),
            inputs = inputs.len(),
            "running annotation processors"
        );
        processing::process(&registration, &inputs, messages)
    }
}
