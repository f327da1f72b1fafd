use std::{
    io::Write,
    path::{Path, PathBuf},
    process::Command,
};

use eyre::Result;
use kompile_core::{ExitCode, JavaVersion};
use tracing::debug;

use super::{JavacStrategy, base_args};
use crate::{host, process, resolve::ResolvedCompilation};

/// Spawns `<jdk_home>/bin/javac` with stdout and stderr merged into the
/// message stream.
#[derive(Debug, Clone)]
pub struct ExternalJavac {
    jdk_home: PathBuf,
}

impl ExternalJavac {
    pub fn new(jdk_home: impl Into<PathBuf>) -> Self {
        Self {
            jdk_home: jdk_home.into(),
        }
    }

    pub fn javac(&self) -> PathBuf {
        self.jdk_home.join("bin").join(host::executable("javac"))
    }

    /// Whether `javac -version` reports 9 or later. Unknown versions count
    /// as older.
    fn is_javac9_or_later(javac: &Path) -> bool {
        let mut command = Command::new(javac);
        command.arg("-version");
        process::capture(command)
            .ok()
            .and_then(|output| parse_javac_version(&output))
            .is_some_and(|version| version.is_modular())
    }
}

fn parse_javac_version(output: &str) -> Option<JavaVersion> {
    output
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with("javac "))
        .and_then(|line| line.parse().ok())
}

impl JavacStrategy for ExternalJavac {
    fn name(&self) -> &'static str {
        "external"
    }

    fn compile(
        &self,
        resolved: &ResolvedCompilation,
        sources: &[PathBuf],
        messages: &mut dyn Write,
    ) -> Result<ExitCode> {
        let javac = self.javac();
        let javac9_or_later = Self::is_javac9_or_later(&javac);

        let mut command = Command::new(&javac);
        command
            .current_dir(resolved.workspace.root())
            .args(base_args(resolved, javac9_or_later))
            .args(sources);

        debug!(
            javac = %javac.display(),
            javac9_or_later,
            sources = sources.len(),
            "running external javac"
        );
        match process::run_merged(command, messages) {
            Ok(status) => Ok(status
                .code()
                .map(ExitCode::from_javac)
                .unwrap_or(ExitCode::InternalError)),
            Err(err) => {
                writeln!(messages, "error: failed to run {}: {}", javac.display(), err)?;
                Ok(ExitCode::InternalError)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use kompile_config::Compilation;
    use tempfile::TempDir;

    use super::*;
    use crate::testing::StaticHost;

    #[test]
    fn test_parse_javac_version() {
        let version = parse_javac_version("javac 1.8.0_292\n").unwrap();
        assert_eq!(version.major(), 8);

        let version = parse_javac_version("Picked up JAVA_TOOL_OPTIONS: -Xmx1g\njavac 17.0.2\n").unwrap();
        assert!(version.is_modular());

        assert!(parse_javac_version("bash: javac: not found").is_none());
    }

    #[test]
    fn test_missing_javac_is_internal_error() {
        let temp = TempDir::new().unwrap();
        let resolved = ResolvedCompilation::resolve(
            Compilation::new().working_dir(temp.path()).jdk_home(temp.path()),
            &StaticHost::default(),
            false,
        )
        .unwrap();
        let javac = ExternalJavac::new(temp.path());

        let mut messages = Vec::new();
        let code = javac
            .compile(&resolved, &[temp.path().join("A.java")], &mut messages)
            .unwrap();

        assert_eq!(code, ExitCode::InternalError);
        assert!(String::from_utf8(messages).unwrap().starts_with("error: failed to run"));
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_codes_are_mapped() {
        use std::{fs, os::unix::fs::PermissionsExt};

        let temp = TempDir::new().unwrap();
        let bin = temp.path().join("jdk/bin");
        fs::create_dir_all(&bin).unwrap();
        let script = bin.join("javac");
        fs::write(
            &script,
            "#!/bin/sh\nif [ \"$1\" = \"-version\" ]; then echo 'javac 11.0.2' >&2; exit 0; fi\n\
             echo 'A.java:1: error: class, interface, or enum expected' >&2\nexit 1\n",
        )
        .unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let resolved = ResolvedCompilation::resolve(
            Compilation::new()
                .working_dir(temp.path())
                .jdk_home(temp.path().join("jdk")),
            &StaticHost::default(),
            false,
        )
        .unwrap();

        let mut messages = Vec::new();
        let code = ExternalJavac::new(temp.path().join("jdk"))
            .compile(&resolved, &[temp.path().join("A.java")], &mut messages)
            .unwrap();

        assert_eq!(code, ExitCode::CompilationError);
        assert!(
            String::from_utf8(messages)
                .unwrap()
                .contains("class, interface, or enum expected")
        );
    }
}
