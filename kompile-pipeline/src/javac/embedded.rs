use std::{
    io::{self, Write},
    path::{Path, PathBuf},
    process::{Command, Stdio},
    sync::{Arc, LazyLock},
};

use eyre::{Report, Result};
use kompile_core::ExitCode;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

use super::{JavacStrategy, base_args};
use crate::{
    diagnostic::{Diagnostic, DiagnosticCollector, Severity},
    host,
    resolve::ResolvedCompilation,
};

static JAVAC_DIAGNOSTIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*?\.java):(\d+): (error|warning): (.*)$").expect("valid regex")
});

static JAVAC_SUMMARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+ (errors?|warnings?)$").expect("valid regex"));

/// Failures of a [`JavaCompilerService`] invocation.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The service rejected an argument.
    #[error("invalid javac argument: {0}")]
    InvalidArgument(String),

    /// The compiler failed while running.
    #[error("javac failed: {0}")]
    Runtime(String),

    /// The host has no Java compiler.
    #[error("no Java compiler is available on the host")]
    Unavailable,

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// An in-process Java compiler provided by the host.
pub trait JavaCompilerService: Send + Sync {
    fn name(&self) -> &'static str;

    /// Compile with javac command-line `args` (sources last), reporting
    /// diagnostics to `diagnostics`. Returns whether compilation succeeded.
    fn compile(
        &self,
        args: &[String],
        diagnostics: &mut DiagnosticCollector,
    ) -> Result<bool, ServiceError>;
}

/// Calls a [`JavaCompilerService`] in-process with the platform classpath
/// erased, since no JDK was designated.
#[derive(Clone)]
pub struct EmbeddedJavac {
    service: Arc<dyn JavaCompilerService>,
    host_modular: bool,
}

impl EmbeddedJavac {
    pub fn new(service: Arc<dyn JavaCompilerService>, host_modular: bool) -> Self {
        Self {
            service,
            host_modular,
        }
    }

    fn erase_platform_classpath(&self, args: &mut Vec<String>) {
        if self.host_modular {
            args.extend(["--system", "none"].map(String::from));
        } else {
            args.extend(["-bootclasspath", ""].map(String::from));
        }
    }
}

impl JavacStrategy for EmbeddedJavac {
    fn name(&self) -> &'static str {
        "embedded"
    }

    fn compile(
        &self,
        resolved: &ResolvedCompilation,
        sources: &[PathBuf],
        messages: &mut dyn Write,
    ) -> Result<ExitCode> {
        let mut args = base_args(resolved, self.host_modular);
        self.erase_platform_classpath(&mut args);
        args.extend(sources.iter().map(|p| p.display().to_string()));

        debug!(
            service = self.service.name(),
            sources = sources.len(),
            "running embedded javac"
        );
        let mut diagnostics = DiagnosticCollector::new();
        let outcome = self.service.compile(&args, &mut diagnostics);
        diagnostics.print_to(messages)?;

        match outcome {
            Ok(true) => Ok(ExitCode::Ok),
            Ok(false) => Ok(ExitCode::CompilationError),
            Err(err @ (ServiceError::InvalidArgument(_) | ServiceError::Runtime(_))) => {
                writeln!(messages, "error: {}", err)?;
                Ok(ExitCode::InternalError)
            }
            Err(err) => Err(Report::new(err).wrap_err("embedded javac failed")),
        }
    }
}

/// Runs the host JDK's `javac` and parses its output into diagnostics.
#[derive(Debug, Clone, Default)]
pub struct HostJavaCompiler {
    javac: Option<PathBuf>,
}

impl HostJavaCompiler {
    /// Use the `javac` of `jdk_home`, or the one on `PATH`.
    pub fn locate(jdk_home: Option<&Path>) -> Self {
        let javac = jdk_home
            .map(|home| home.join("bin").join(host::executable("javac")))
            .filter(|javac| javac.is_file())
            .or_else(|| which::which("javac").ok());
        Self { javac }
    }

    pub fn javac(&self) -> Option<&Path> {
        self.javac.as_deref()
    }
}

/// Parse javac output. Lines that don't start a diagnostic continue the
/// previous one (source excerpt, caret, symbol details).
fn parse_javac_output(output: &str, diagnostics: &mut DiagnosticCollector) {
    for line in output.lines() {
        if line.trim().is_empty() || JAVAC_SUMMARY.is_match(line.trim()) {
            continue;
        }
        if let Some(caps) = JAVAC_DIAGNOSTIC.captures(line) {
            let severity = match &caps[3] {
                "error" => Severity::Error,
                _ => Severity::Warning,
            };
            let line_number = caps[2].parse().unwrap_or(0);
            diagnostics.report(Diagnostic::new(severity, &caps[4]).at(&caps[1], line_number));
        } else if let Some(message) = line.strip_prefix("error: ") {
            diagnostics.report(Diagnostic::error(message));
        } else if let Some(message) = line.strip_prefix("warning: ") {
            diagnostics.report(Diagnostic::warning(message));
        } else if let Some(message) = line.strip_prefix("Note: ") {
            diagnostics.report(Diagnostic::note(message));
        } else {
            diagnostics.continue_last(line);
        }
    }
}

impl JavaCompilerService for HostJavaCompiler {
    fn name(&self) -> &'static str {
        "host-javac"
    }

    fn compile(
        &self,
        args: &[String],
        diagnostics: &mut DiagnosticCollector,
    ) -> Result<bool, ServiceError> {
        let javac = self.javac.as_ref().ok_or(ServiceError::Unavailable)?;
        let output = Command::new(javac)
            .args(args)
            .stdin(Stdio::null())
            .output()?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        parse_javac_output(&text, diagnostics);

        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            // javac reports command-line errors with 2
            Some(2) => Err(ServiceError::InvalidArgument(
                diagnostics
                    .diagnostics()
                    .iter()
                    .find(|d| d.severity.is_error())
                    .map(|d| d.message.clone())
                    .unwrap_or_else(|| text.trim().to_string()),
            )),
            Some(code) => Err(ServiceError::Runtime(format!("exit status {}", code))),
            None => Err(ServiceError::Runtime("terminated by signal".to_string())),
        }
    }
}
