//! The flat configuration record for one compile call.

use std::{collections::BTreeMap, path::PathBuf};

use kompile_core::SourceUnit;
use serde::Deserialize;

/// Name of the kapt option that relocates generated Kotlin sources.
pub const OPTION_KAPT_KOTLIN_GENERATED: &str = "kapt.kotlin.generated";

/// Values accepted by `jvm-target`.
pub const JVM_TARGETS: &[&str] = &[
    "1.6", "1.8", "9", "10", "11", "12", "13", "14", "15", "16", "17", "18", "19", "20", "21",
];

/// Options governing every stage of a compile call.
///
/// Fields that have no value here are resolved once per compile call, when
/// the pipeline finalizes the configuration against the host toolchain.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Compilation {
    /// Sources to stage into the workspace.
    #[serde(skip)]
    pub sources: Vec<SourceUnit>,

    /// Workspace root. A kept temporary directory is used when unset.
    pub working_dir: Option<PathBuf>,

    /// User classpath entries, placed first on every stage's classpath.
    pub classpaths: Vec<PathBuf>,

    /// Append the full host classpath to the compile classpath.
    pub inherit_classpath: bool,

    /// Options handed to annotation processors.
    pub kapt_args: BTreeMap<String, String>,

    /// Replace unresolvable types in kapt stubs with error types.
    pub correct_error_types: bool,

    /// Extra arguments for the Kotlin front end.
    pub kotlinc_arguments: Vec<String>,

    /// Extra arguments for javac.
    pub javac_arguments: Vec<String>,

    /// JDK used to compile Java sources. Without one, javac runs through the
    /// host's embedded compiler service.
    pub jdk_home: Option<PathBuf>,

    /// Path to the `kotlinc` launcher. Looked up on `PATH` when unset.
    pub kotlinc: Option<PathBuf>,

    /// Don't put the Kotlin standard library on the classpath.
    pub no_stdlib: bool,

    /// Don't put the Kotlin reflection library on the classpath.
    pub no_reflect: bool,

    /// Target version of the generated JVM bytecode.
    pub jvm_target: Option<String>,

    /// Name of the generated `.kotlin_module` file.
    pub module_name: Option<String>,

    pub verbose: bool,
    pub all_warnings_as_errors: bool,
    pub suppress_warnings: bool,
}

impl Default for Compilation {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            working_dir: None,
            classpaths: Vec::new(),
            inherit_classpath: false,
            kapt_args: BTreeMap::new(),
            correct_error_types: false,
            kotlinc_arguments: Vec::new(),
            javac_arguments: Vec::new(),
            jdk_home: None,
            kotlinc: None,
            no_stdlib: false,
            no_reflect: false,
            jvm_target: None,
            module_name: None,
            verbose: true,
            all_warnings_as_errors: false,
            suppress_warnings: false,
        }
    }
}

impl Compilation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(mut self, unit: SourceUnit) -> Self {
        self.sources.push(unit);
        self
    }

    pub fn sources(mut self, units: impl IntoIterator<Item = SourceUnit>) -> Self {
        self.sources.extend(units);
        self
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn classpath(mut self, entry: impl Into<PathBuf>) -> Self {
        self.classpaths.push(entry.into());
        self
    }

    pub fn inherit_classpath(mut self, inherit: bool) -> Self {
        self.inherit_classpath = inherit;
        self
    }

    pub fn kapt_arg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.kapt_args.insert(key.into(), value.into());
        self
    }

    pub fn jdk_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.jdk_home = Some(home.into());
        self
    }

    pub fn kotlinc(mut self, launcher: impl Into<PathBuf>) -> Self {
        self.kotlinc = Some(launcher.into());
        self
    }

    pub fn kotlinc_argument(mut self, arg: impl Into<String>) -> Self {
        self.kotlinc_arguments.push(arg.into());
        self
    }

    pub fn javac_argument(mut self, arg: impl Into<String>) -> Self {
        self.javac_arguments.push(arg.into());
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn all_warnings_as_errors(mut self, enabled: bool) -> Self {
        self.all_warnings_as_errors = enabled;
        self
    }

    /// The user-supplied generated-Kotlin directory, if any.
    pub fn kapt_kotlin_generated(&self) -> Option<PathBuf> {
        self.kapt_args
            .get(OPTION_KAPT_KOTLIN_GENERATED)
            .map(PathBuf::from)
    }
}
