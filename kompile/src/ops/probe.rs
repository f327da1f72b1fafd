//! Probe operation - what the host toolchain provides.

use std::path::Path;

use kompile_pipeline::{
    classpath::RuntimeJars,
    host::{self, HostEnvironment, JdkInfo},
};

use crate::reports::{ProbeReport, RuntimeJar};

/// Inspect `host`, classifying `jdk_home` instead of the host JDK when given.
pub fn probe(host: &dyn HostEnvironment, jdk_home: Option<&Path>) -> ProbeReport {
    let host_classpath = host::host_classpath(host);
    let jdk = JdkInfo::probe(host, jdk_home);
    let runtime = RuntimeJars::discover(&host_classpath);

    let tools_jar = host::find_tools_jar(jdk.effective_home(), &host_classpath);
    let tools_jar_required = jdk.is_pre_modular() && !host::tools_jar_visible(&host_classpath);

    let runtime_jars = [
        ("kotlin-stdlib", runtime.kotlin_stdlib),
        ("kotlin-stdlib-common", runtime.kotlin_stdlib_common),
        ("kotlin-reflect", runtime.kotlin_reflect),
        ("kotlin-script-runtime", runtime.kotlin_script_runtime),
        ("kapt plugin", runtime.kapt_plugin),
    ]
    .into_iter()
    .map(|(name, path)| RuntimeJar { name, path })
    .collect();

    ProbeReport {
        jdk_home: jdk.effective_home().map(Path::to_path_buf),
        jdk_version: jdk.version.as_ref().map(ToString::to_string),
        modular: !jdk.is_pre_modular(),
        tools_jar,
        tools_jar_required,
        runtime_jars,
        host_classpath,
    }
}
