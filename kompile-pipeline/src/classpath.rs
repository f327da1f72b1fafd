//! Classpath resolution shared by every stage.

use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use regex::Regex;

/// A runtime-support library looked up by file name on the host classpath.
#[derive(Debug, Clone)]
pub struct RuntimeLibrary {
    simple_names: &'static [&'static str],
    pattern: Regex,
}

impl RuntimeLibrary {
    /// A library matched as `<name>.jar` or `<name>-<major>.<minor>[.<patch>][<suffix>].jar`,
    /// where `<name>` is one of `names`.
    pub fn new(simple_names: &'static [&'static str], names: &[&str]) -> Self {
        let alternatives = names
            .iter()
            .map(|n| regex::escape(n))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&format!(
            r"^({})-[0-9]+\.[0-9]+(\.[0-9]+)?([-0-9a-zA-Z.]+)?\.jar$",
            alternatives
        ))
        .expect("valid library pattern");
        Self {
            simple_names,
            pattern,
        }
    }

    pub fn matches(&self, path: &Path) -> bool {
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        self.simple_names.contains(&file_name) || self.pattern.is_match(file_name)
    }

    /// First matching entry, in classpath order.
    pub fn find_in(&self, classpath: &[PathBuf]) -> Option<PathBuf> {
        classpath.iter().find(|p| self.matches(p)).cloned()
    }
}

/// Runtime-support jars discovered on the host classpath.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeJars {
    pub kotlin_stdlib: Option<PathBuf>,
    pub kotlin_stdlib_common: Option<PathBuf>,
    pub kotlin_reflect: Option<PathBuf>,
    pub kotlin_script_runtime: Option<PathBuf>,
    /// The kapt compiler plugin.
    pub kapt_plugin: Option<PathBuf>,
}

impl RuntimeJars {
    pub fn discover(host_classpath: &[PathBuf]) -> Self {
        let stdlib = RuntimeLibrary::new(
            &["kotlin-stdlib.jar", "kotlin-runtime.jar"],
            &["kotlin-stdlib", "kotlin-runtime"],
        );
        let stdlib_common =
            RuntimeLibrary::new(&["kotlin-stdlib-common.jar"], &["kotlin-stdlib-common"]);
        let reflect = RuntimeLibrary::new(&["kotlin-reflect.jar"], &["kotlin-reflect"]);
        let script_runtime =
            RuntimeLibrary::new(&["kotlin-script-runtime.jar"], &["kotlin-script-runtime"]);
        let kapt = RuntimeLibrary::new(
            &[
                "kotlin-annotation-processing-embeddable.jar",
                "kotlin-annotation-processing.jar",
            ],
            &[
                "kotlin-annotation-processing-embeddable",
                "kotlin-annotation-processing",
            ],
        );

        Self {
            kotlin_stdlib: stdlib.find_in(host_classpath),
            kotlin_stdlib_common: stdlib_common.find_in(host_classpath),
            kotlin_reflect: reflect.find_in(host_classpath),
            kotlin_script_runtime: script_runtime.find_in(host_classpath),
            kapt_plugin: kapt.find_in(host_classpath),
        }
    }
}

/// Inputs of the common classpath.
#[derive(Debug, Clone, Copy)]
pub struct ClasspathInputs<'a> {
    pub user: &'a [PathBuf],
    pub runtime: &'a RuntimeJars,
    pub host: &'a [PathBuf],
    pub inherit_host: bool,
    pub no_stdlib: bool,
    pub no_reflect: bool,
}

/// User entries, then runtime-support jars, then (when inheriting) the host
/// classpath; de-duplicated, first occurrence wins.
pub fn common_classpath(inputs: ClasspathInputs<'_>) -> Vec<PathBuf> {
    let runtime = inputs.runtime;
    let support = [
        runtime.kotlin_stdlib.as_ref().filter(|_| !inputs.no_stdlib),
        runtime.kotlin_stdlib_common.as_ref().filter(|_| !inputs.no_stdlib),
        runtime.kotlin_reflect.as_ref().filter(|_| !inputs.no_reflect),
        runtime.kotlin_script_runtime.as_ref(),
    ];

    let mut entries: IndexSet<PathBuf> = inputs.user.iter().cloned().collect();
    entries.extend(support.into_iter().flatten().cloned());
    if inputs.inherit_host {
        entries.extend(inputs.host.iter().cloned());
    }
    entries.into_iter().collect()
}

/// Join entries with the platform path separator.
pub fn join(entries: &[PathBuf]) -> String {
    std::env::join_paths(entries)
        .map(|joined| joined.to_string_lossy().into_owned())
        .unwrap_or_else(|_| {
            entries
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(if cfg!(windows) { ";" } else { ":" })
        })
}
