//! Host toolchain probe.
//!
//! The host is the toolchain this process drives: the Kotlin distribution
//! found through `KOTLIN_HOME` or `PATH`, the `CLASSPATH` of the environment
//! and the JDK found through `JAVA_HOME` or `PATH`.

use std::{
    path::{Path, PathBuf},
    process::Command,
    sync::LazyLock,
};

use indexmap::IndexSet;
use kompile_core::JavaVersion;
use regex::Regex;

use crate::process;

/// File name of the legacy compiler-support archive.
pub const TOOLS_JAR: &str = "tools.jar";

static JAVA_VERSION_OUTPUT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"version "([^"]+)""#).expect("valid regex"));

/// What the probe needs to know about the host toolchain.
pub trait HostEnvironment: Send + Sync {
    /// Classpath entries visible to the host toolchain, in discovery order.
    /// Duplicates are allowed; [`host_classpath`] removes them.
    fn classpath(&self) -> Vec<PathBuf>;

    /// JDK the host toolchain runs on, if one can be found.
    fn jdk_home(&self) -> Option<PathBuf>;

    /// Version of the JDK installed at `home`.
    fn jdk_version(&self, home: &Path) -> Option<JavaVersion>;
}

/// The real environment of this process.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHost;

impl SystemHost {
    fn kotlin_lib_dir() -> Option<PathBuf> {
        if let Some(home) = std::env::var_os("KOTLIN_HOME") {
            return Some(PathBuf::from(home).join("lib"));
        }
        // <kotlin home>/bin/kotlinc
        let kotlinc = which::which("kotlinc").ok()?;
        let kotlinc = std::fs::canonicalize(&kotlinc).unwrap_or(kotlinc);
        Some(kotlinc.parent()?.parent()?.join("lib"))
    }

    fn jars_in(dir: &Path) -> Vec<PathBuf> {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return Vec::new();
        };
        let mut jars: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|e| e == "jar"))
            .collect();
        jars.sort();
        jars
    }
}

impl HostEnvironment for SystemHost {
    fn classpath(&self) -> Vec<PathBuf> {
        let mut entries: Vec<PathBuf> = std::env::var_os("CLASSPATH")
            .map(|cp| std::env::split_paths(&cp).collect())
            .unwrap_or_default();
        entries.retain(|p| !p.as_os_str().is_empty());

        if let Some(lib) = Self::kotlin_lib_dir() {
            entries.extend(Self::jars_in(&lib));
        }
        entries
    }

    fn jdk_home(&self) -> Option<PathBuf> {
        if let Some(home) = std::env::var_os("JAVA_HOME") {
            return Some(PathBuf::from(home));
        }
        // <jdk home>/bin/javac
        let javac = which::which("javac").ok()?;
        let javac = std::fs::canonicalize(&javac).unwrap_or(javac);
        Some(javac.parent()?.parent()?.to_path_buf())
    }

    fn jdk_version(&self, home: &Path) -> Option<JavaVersion> {
        if let Some(version) = read_release_version(home) {
            return Some(version);
        }
        let mut command = Command::new(home.join("bin").join(executable("java")));
        command.arg("-version");
        let output = process::capture(command).ok()?;
        parse_java_version_output(&output)
    }
}

/// Platform file name of a JDK tool.
pub fn executable(name: &str) -> String {
    if cfg!(windows) {
        format!("{}.exe", name)
    } else {
        name.to_string()
    }
}

/// Read `JAVA_VERSION` from a JDK's `release` file.
pub fn read_release_version(home: &Path) -> Option<JavaVersion> {
    let release = std::fs::read_to_string(home.join("release")).ok()?;
    release
        .lines()
        .find_map(|line| line.strip_prefix("JAVA_VERSION="))
        .and_then(|value| value.parse().ok())
}

/// Extract the version from `java -version` output.
pub fn parse_java_version_output(output: &str) -> Option<JavaVersion> {
    JAVA_VERSION_OUTPUT
        .captures(output)
        .and_then(|caps| caps[1].parse().ok())
}

/// The host classpath, de-duplicated by absolute path. First occurrence wins.
pub fn host_classpath(host: &dyn HostEnvironment) -> Vec<PathBuf> {
    let entries: IndexSet<PathBuf> = host
        .classpath()
        .into_iter()
        .map(|entry| std::path::absolute(&entry).unwrap_or(entry))
        .collect();
    entries.into_iter().collect()
}

/// The JDK a compile call runs against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JdkInfo {
    /// Explicitly configured JDK home.
    pub explicit_home: Option<PathBuf>,
    /// JDK of the host toolchain.
    pub host_home: Option<PathBuf>,
    /// Version of the explicit JDK, or of the host JDK when none is configured.
    pub version: Option<JavaVersion>,
    /// Version of the host JDK.
    pub host_version: Option<JavaVersion>,
}

impl JdkInfo {
    /// Classify the JDK in use: `explicit_home` when given, the host's otherwise.
    pub fn probe(host: &dyn HostEnvironment, explicit_home: Option<&Path>) -> Self {
        let host_home = host.jdk_home();
        let host_version = host_home.as_deref().and_then(|h| host.jdk_version(h));
        let version = match explicit_home {
            Some(home) => host.jdk_version(home),
            None => host_version.clone(),
        };
        Self {
            explicit_home: explicit_home.map(Path::to_path_buf),
            host_home,
            version,
            host_version,
        }
    }

    /// The home used to look for JDK-provided files.
    pub fn effective_home(&self) -> Option<&Path> {
        self.explicit_home.as_deref().or(self.host_home.as_deref())
    }

    /// Whether the JDK in use predates the module system.
    ///
    /// An unknown version is treated as modular.
    pub fn is_pre_modular(&self) -> bool {
        self.version.as_ref().is_some_and(|v| !v.is_modular())
    }

    /// Whether the host JDK has the module system (assumed when unknown).
    pub fn host_is_modular(&self) -> bool {
        self.host_version.as_ref().is_none_or(JavaVersion::is_modular)
    }
}

/// Whether `tools.jar` is already on the host classpath.
pub fn tools_jar_visible(host_classpath: &[PathBuf]) -> bool {
    host_classpath
        .iter()
        .any(|p| p.file_name().is_some_and(|n| n == TOOLS_JAR))
}

/// Locate `tools.jar` in the JDK's `lib` directory, then on the host classpath.
pub fn find_tools_jar(jdk_home: Option<&Path>, host_classpath: &[PathBuf]) -> Option<PathBuf> {
    jdk_home
        .map(|home| home.join("lib").join(TOOLS_JAR))
        .filter(|jar| jar.is_file())
        .or_else(|| {
            host_classpath
                .iter()
                .find(|p| p.file_name().is_some_and(|n| n == TOOLS_JAR))
                .cloned()
        })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::testing::StaticHost;

    #[test]
    fn test_host_classpath_dedupes_by_absolute_path() {
        let cwd = std::env::current_dir().unwrap();
        let host = StaticHost::default()
            .classpath("libs/a.jar")
            .classpath(cwd.join("libs/a.jar"))
            .classpath("/opt/b.jar");

        assert_eq!(
            host_classpath(&host),
            vec![cwd.join("libs/a.jar"), PathBuf::from("/opt/b.jar")]
        );
    }

    #[test]
    fn test_read_release_version() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("release"),
            "IMPLEMENTOR=\"Oracle\"\nJAVA_VERSION=\"1.8.0_292\"\n",
        )
        .unwrap();

        let version = read_release_version(temp.path()).unwrap();
        assert_eq!(version.major(), 8);
        assert!(read_release_version(&temp.path().join("missing")).is_none());
    }

    #[test]
    fn test_parse_java_version_output() {
        let output = "openjdk version \"17.0.2\" 2022-01-18\nOpenJDK Runtime Environment";
        assert_eq!(parse_java_version_output(output).unwrap().major(), 17);
        assert!(parse_java_version_output("command not found").is_none());
    }

    #[test]
    fn test_jdk_info_prefers_explicit_home() {
        let host = StaticHost::default()
            .jdk_home("/jdk17")
            .jdk("/jdk17", "17".parse().unwrap())
            .jdk("/jdk8", "1.8.0_292".parse().unwrap());

        let info = JdkInfo::probe(&host, Some(Path::new("/jdk8")));
        assert!(info.is_pre_modular());
        assert!(info.host_is_modular());
        assert_eq!(info.effective_home(), Some(Path::new("/jdk8")));

        let info = JdkInfo::probe(&host, None);
        assert!(!info.is_pre_modular());
        assert_eq!(info.effective_home(), Some(Path::new("/jdk17")));
    }

    #[test]
    fn test_find_tools_jar() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("lib")).unwrap();
        fs::write(temp.path().join("lib/tools.jar"), "").unwrap();

        assert_eq!(
            find_tools_jar(Some(temp.path()), &[]),
            Some(temp.path().join("lib/tools.jar"))
        );

        let on_classpath = vec![PathBuf::from("/x/y.jar"), PathBuf::from("/jdk/lib/tools.jar")];
        assert_eq!(
            find_tools_jar(Some(&temp.path().join("nope")), &on_classpath),
            Some(PathBuf::from("/jdk/lib/tools.jar"))
        );
        assert!(tools_jar_visible(&on_classpath));
        assert_eq!(find_tools_jar(None, &[]), None);
    }
}
