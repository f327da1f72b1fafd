//! The Kotlin front end, treated as a black box invoked with an argument
//! struct and returning an exit code plus whatever it printed.

mod kotlinc;

use std::{io::Write, path::PathBuf};

use eyre::Result;
use kompile_core::ExitCode;

pub use kotlinc::KotlincProcess;

use crate::classpath;

/// What the front end is asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrontendMode {
    /// Compile sources to class files.
    #[default]
    Compile,
    /// Generate Java stubs of the Kotlin sources, then run the compiler
    /// plugins found on the plugin classpath (annotation processing).
    StubsAndApt,
}

/// Arguments of one front-end invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct K2JvmArgs {
    pub mode: FrontendMode,
    /// Kotlin sources to compile.
    pub sources: Vec<PathBuf>,
    /// Java sources the Kotlin sources may reference.
    pub java_sources: Vec<PathBuf>,
    pub classpath: Vec<PathBuf>,
    pub destination: PathBuf,
    pub plugin_classpaths: Vec<PathBuf>,
    /// `plugin:<id>:<key>=<value>` options.
    pub plugin_options: Vec<String>,
    pub jdk_home: Option<PathBuf>,
    pub no_jdk: bool,
    pub no_stdlib: bool,
    pub no_reflect: bool,
    pub jvm_target: Option<String>,
    pub module_name: Option<String>,
    pub verbose: bool,
    pub all_warnings_as_errors: bool,
    pub suppress_warnings: bool,
    /// Extra user-supplied arguments, passed through verbatim.
    pub free_args: Vec<String>,
    /// Directory child processes run in.
    pub working_dir: PathBuf,
    /// System properties forwarded to the compiler JVM.
    pub system_properties: Vec<(String, String)>,
}

impl K2JvmArgs {
    /// Values of the plugin options of `plugin_id` named `key`, in order.
    pub fn plugin_option<'a>(&'a self, plugin_id: &str, key: &str) -> Vec<&'a str> {
        let prefix = format!("plugin:{}:{}=", plugin_id, key);
        self.plugin_options
            .iter()
            .filter_map(|opt| opt.strip_prefix(prefix.as_str()))
            .collect()
    }

    /// Render as a `kotlinc` command line (without the launcher).
    pub fn to_command_line(&self) -> Vec<String> {
        let mut line = Vec::new();
        let mut push = |flag: &str, value: String| {
            line.push(flag.to_string());
            line.push(value);
        };

        push("-d", self.destination.display().to_string());
        if !self.classpath.is_empty() {
            push("-classpath", classpath::join(&self.classpath));
        }
        if let Some(home) = &self.jdk_home {
            push("-jdk-home", home.display().to_string());
        }
        if let Some(target) = &self.jvm_target {
            push("-jvm-target", target.clone());
        }
        if let Some(name) = &self.module_name {
            push("-module-name", name.clone());
        }

        let switches = [
            (self.jdk_home.is_none() && self.no_jdk, "-no-jdk"),
            (self.no_stdlib, "-no-stdlib"),
            (self.no_reflect, "-no-reflect"),
            (self.verbose, "-verbose"),
            (self.all_warnings_as_errors, "-Werror"),
            (self.suppress_warnings, "-nowarn"),
        ];
        line.extend(
            switches
                .into_iter()
                .filter(|(on, _)| *on)
                .map(|(_, flag)| flag.to_string()),
        );

        // Directories on the plugin classpath are in-process resources.
        line.extend(
            self.plugin_classpaths
                .iter()
                .filter(|p| p.extension().is_some_and(|e| e == "jar"))
                .map(|jar| format!("-Xplugin={}", jar.display())),
        );
        for option in &self.plugin_options {
            line.push("-P".to_string());
            line.push(option.clone());
        }

        line.extend(self.free_args.iter().cloned());
        line.extend(self.sources.iter().map(|p| p.display().to_string()));
        line.extend(self.java_sources.iter().map(|p| p.display().to_string()));
        line
    }
}

/// A Kotlin compiler front end.
///
/// Implementations print diagnostics to `messages` and report the outcome as
/// an [`ExitCode`]. Errors are reserved for failures of the harness itself.
///
/// In [`FrontendMode::StubsAndApt`] an implementation must write stubs to the
/// kapt `stubs` directory (when it can) and then run the compiler plugins
/// registered on `args.plugin_classpaths`, see [`crate::kapt::run_plugins`].
pub trait KotlinFrontend: Send + Sync {
    /// The name of this front end (for logging).
    fn name(&self) -> &'static str;

    /// Run one invocation.
    fn exec(&self, args: &K2JvmArgs, messages: &mut dyn Write) -> Result<ExitCode>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line() {
        let args = K2JvmArgs {
            sources: vec![PathBuf::from("/ws/sources/Foo.kt")],
            java_sources: vec![PathBuf::from("/ws/sources/Bar.java")],
            classpath: vec![PathBuf::from("/k/kotlin-stdlib.jar")],
            destination: PathBuf::from("/ws/classes"),
            plugin_classpaths: vec![
                PathBuf::from("/ws/kapt/registrar"),
                PathBuf::from("/k/kotlin-annotation-processing.jar"),
            ],
            plugin_options: vec!["plugin:org.jetbrains.kotlin.kapt3:aptMode=stubs".into()],
            no_jdk: true,
            jvm_target: Some("1.8".into()),
            verbose: true,
            free_args: vec!["-Xjsr305=strict".into()],
            ..Default::default()
        };

        insta::assert_snapshot!(args.to_command_line().join("\n"), @r"
        -d
        /ws/classes
        -classpath
        /k/kotlin-stdlib.jar
        -jvm-target
        1.8
        -no-jdk
        -verbose
        -Xplugin=/k/kotlin-annotation-processing.jar
        -P
        plugin:org.jetbrains.kotlin.kapt3:aptMode=stubs
        -Xjsr305=strict
        /ws/sources/Foo.kt
        /ws/sources/Bar.java
        ");
    }

    #[test]
    fn test_jdk_home_wins_over_no_jdk() {
        let args = K2JvmArgs {
            destination: PathBuf::from("out"),
            jdk_home: Some(PathBuf::from("/jdk")),
            no_jdk: true,
            ..Default::default()
        };

        assert_eq!(args.to_command_line(), vec!["-d", "out", "-jdk-home", "/jdk"]);
    }

    #[test]
    fn test_plugin_option_lookup() {
        let args = K2JvmArgs {
            plugin_options: vec![
                "plugin:org.jetbrains.kotlin.kapt3:stubs=/ws/kapt/stubs".into(),
                "plugin:org.jetbrains.kotlin.kapt3:aptMode=stubs".into(),
                "plugin:other:stubs=/elsewhere".into(),
            ],
            ..Default::default()
        };

        assert_eq!(
            args.plugin_option("org.jetbrains.kotlin.kapt3", "stubs"),
            vec!["/ws/kapt/stubs"]
        );
        assert!(args.plugin_option("org.jetbrains.kotlin.kapt3", "sources").is_empty());
    }
}
