use std::{
    io::Write,
    path::{Path, PathBuf},
    process::Command,
};

use eyre::Result;
use kompile_core::ExitCode;
use tracing::debug;

use super::{FrontendMode, K2JvmArgs, KotlinFrontend};
use crate::{kapt, process, properties};

/// Runs the `kotlinc` launcher of a Kotlin distribution as a child process.
#[derive(Debug, Clone, Default)]
pub struct KotlincProcess {
    launcher: Option<PathBuf>,
}

impl KotlincProcess {
    /// Use `launcher`, or look `kotlinc` up on `PATH` when `None`.
    pub fn new(launcher: Option<PathBuf>) -> Self {
        Self { launcher }
    }

    fn launcher(&self) -> Option<PathBuf> {
        let name = if cfg!(windows) { "kotlinc.bat" } else { "kotlinc" };
        self.launcher.clone().or_else(|| which::which(name).ok())
    }

    fn run(&self, launcher: &Path, args: &K2JvmArgs, messages: &mut dyn Write) -> Result<ExitCode> {
        let mut command = Command::new(launcher);
        command
            .current_dir(&args.working_dir)
            .args(args.to_command_line());

        if !args.system_properties.is_empty() {
            let mut opts = std::env::var("JAVA_OPTS").unwrap_or_default();
            if !opts.is_empty() {
                opts.push(' ');
            }
            opts.push_str(&properties::java_opts(&args.system_properties));
            command.env("JAVA_OPTS", opts);
        }

        debug!(launcher = %launcher.display(), mode = ?args.mode, "running kotlinc");
        match process::run_merged(command, messages) {
            Ok(status) => Ok(status
                .code()
                .map(ExitCode::from_kotlinc)
                .unwrap_or(ExitCode::InternalError)),
            Err(err) => {
                writeln!(messages, "error: failed to run {}: {}", launcher.display(), err)?;
                Ok(ExitCode::InternalError)
            }
        }
    }
}

fn is_kapt_plugin(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with("kotlin-annotation-processing") && n.ends_with(".jar"))
}

impl KotlinFrontend for KotlincProcess {
    fn name(&self) -> &'static str {
        "kotlinc"
    }

    fn exec(&self, args: &K2JvmArgs, messages: &mut dyn Write) -> Result<ExitCode> {
        let Some(launcher) = self.launcher() else {
            writeln!(
                messages,
                "error: kotlinc not found; configure `kotlinc` or put it on PATH"
            )?;
            return Ok(ExitCode::InternalError);
        };

        match args.mode {
            FrontendMode::Compile => self.run(&launcher, args, messages),
            FrontendMode::StubsAndApt => {
                if args.plugin_classpaths.iter().any(|p| is_kapt_plugin(p)) {
                    let code = self.run(&launcher, args, messages)?;
                    if !code.is_ok() {
                        return Ok(code);
                    }
                } else {
                    writeln!(
                        messages,
                        "warning: kapt compiler plugin not found on the host classpath, \
                         Kotlin sources are processed without stubs"
                    )?;
                }
                kapt::run_plugins(args, messages)
            }
        }
    }
}
