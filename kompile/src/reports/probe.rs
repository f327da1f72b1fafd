//! Probe command report data structures.

use std::path::PathBuf;

use serde::Serialize;

use super::output::{Output, Report};

/// Report data from probing the host toolchain.
#[derive(Debug, Serialize)]
pub struct ProbeReport {
    /// JDK that was classified.
    pub jdk_home: Option<PathBuf>,
    pub jdk_version: Option<String>,
    /// Whether the JDK has the module system (assumed when unknown).
    pub modular: bool,
    pub tools_jar: Option<PathBuf>,
    /// Whether annotation processing needs a `tools.jar` it can't already see.
    pub tools_jar_required: bool,
    pub runtime_jars: Vec<RuntimeJar>,
    pub host_classpath: Vec<PathBuf>,
}

/// A runtime-support jar looked up on the host classpath.
#[derive(Debug, Serialize)]
pub struct RuntimeJar {
    pub name: &'static str,
    pub path: Option<PathBuf>,
}

fn or_missing(value: Option<String>, missing: &str) -> String {
    value.unwrap_or_else(|| missing.to_string())
}

impl Report for ProbeReport {
    fn render(&self, out: &mut dyn Output) {
        out.key_value(
            "JDK",
            &or_missing(
                self.jdk_home.as_ref().map(|p| p.display().to_string()),
                "not found",
            ),
        );
        out.key_value("Version", &or_missing(self.jdk_version.clone(), "unknown"));
        out.key_value("Modular", if self.modular { "yes" } else { "no" });

        let tools_jar = match (&self.tools_jar, self.tools_jar_required) {
            (Some(path), _) => path.display().to_string(),
            (None, true) => "missing (required)".to_string(),
            (None, false) => "not required".to_string(),
        };
        out.key_value("tools.jar", &tools_jar);

        out.section("Runtime jars");
        for jar in &self.runtime_jars {
            let path = or_missing(
                jar.path.as_ref().map(|p| p.display().to_string()),
                "not found",
            );
            out.list_item(&format!("{}: {}", jar.name, path));
        }

        out.key_value(
            "Host classpath",
            &format!("{} entries", self.host_classpath.len()),
        );
    }
}
