//! Java compilation strategies.
//!
//! An explicit JDK home selects [`ExternalJavac`], which spawns that JDK's
//! `javac`. Without one, [`EmbeddedJavac`] calls a [`JavaCompilerService`]
//! provided by the host. Both build their arguments with [`base_args`].

mod embedded;
mod external;

use std::{io::Write, path::PathBuf, sync::Arc};

use eyre::Result;
use kompile_core::ExitCode;

pub use embedded::{EmbeddedJavac, HostJavaCompiler, JavaCompilerService, ServiceError};
pub use external::ExternalJavac;

use crate::{classpath, resolve::ResolvedCompilation};

/// One way of running javac.
pub trait JavacStrategy: Send + Sync {
    /// The name of this strategy (for logging).
    fn name(&self) -> &'static str;

    /// Compile `sources` into the classes directory.
    fn compile(
        &self,
        resolved: &ResolvedCompilation,
        sources: &[PathBuf],
        messages: &mut dyn Write,
    ) -> Result<ExitCode>;
}

/// Arguments shared by every strategy, in this order: verbosity flags,
/// destination, processing disabled, warnings-as-errors, user arguments,
/// classpath (common classpath plus the classes directory).
pub fn base_args(resolved: &ResolvedCompilation, javac9_or_later: bool) -> Vec<String> {
    let compilation = &resolved.compilation;
    let mut args = Vec::new();

    if compilation.verbose {
        args.extend(["-verbose", "-Xlint:path", "-Xlint:options"].map(String::from));
        if javac9_or_later {
            args.push("-Xlint:module".to_string());
        }
    }

    args.push("-d".to_string());
    args.push(resolved.classes_dir().display().to_string());

    // Processing already ran during kapt.
    args.push("-proc:none".to_string());

    if compilation.all_warnings_as_errors {
        args.push("-Werror".to_string());
    }

    args.extend(compilation.javac_arguments.iter().cloned());

    args.push("-cp".to_string());
    args.push(classpath::join(&resolved.classpath_with_output()));
    args
}

/// The strategy for `resolved`. `service` replaces the host compiler of the
/// embedded strategy.
pub fn select(
    resolved: &ResolvedCompilation,
    service: Option<Arc<dyn JavaCompilerService>>,
) -> Box<dyn JavacStrategy> {
    match &resolved.compilation.jdk_home {
        Some(home) => Box::new(ExternalJavac::new(home)),
        None => {
            let service = service.unwrap_or_else(|| {
                Arc::new(HostJavaCompiler::locate(resolved.jdk.host_home.as_deref()))
            });
            Box::new(EmbeddedJavac::new(service, resolved.jdk.host_is_modular()))
        }
    }
}
