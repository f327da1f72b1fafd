//! Two-phase finalization of a [`Compilation`] against the host toolchain.

use std::path::PathBuf;

use kompile_config::{Compilation, Error, OPTION_KAPT_KOTLIN_GENERATED, Result};
use tracing::debug;

use crate::{
    classpath::{ClasspathInputs, RuntimeJars, common_classpath},
    host::{self, HostEnvironment, JdkInfo},
    workspace::Workspace,
};

/// A configuration with every default resolved, computed once per compile
/// call and shared by all stages.
#[derive(Debug, Clone)]
pub struct ResolvedCompilation {
    pub compilation: Compilation,
    pub workspace: Workspace,
    pub host_classpath: Vec<PathBuf>,
    pub runtime: RuntimeJars,
    pub jdk: JdkInfo,
    /// `tools.jar` to put in front of the kapt plugin classpath. Only set
    /// when the JDK requires it and the host doesn't already see one.
    pub tools_jar: Option<PathBuf>,
    /// Destination of Kotlin sources generated by processors.
    pub kotlin_generated_dir: PathBuf,
    /// Classpath shared by every stage.
    pub classpath: Vec<PathBuf>,
}

impl ResolvedCompilation {
    /// Resolve `compilation`.
    ///
    /// Independent defaults come first (workspace root, host classpath, JDK);
    /// dependent ones are derived from them (runtime jars, `tools.jar`,
    /// generated-source directory, common classpath).
    ///
    /// # Errors
    ///
    /// Fails when the configured JDK home doesn't exist, when a user-supplied
    /// generated-Kotlin directory doesn't exist, or when annotation processing
    /// needs `tools.jar` and none can be found.
    pub fn resolve(
        compilation: Compilation,
        host: &dyn HostEnvironment,
        needs_kapt: bool,
    ) -> Result<Self> {
        // Phase 1: independent defaults
        let root = match &compilation.working_dir {
            Some(dir) => dir.clone(),
            None => default_working_dir()?,
        };
        let workspace = Workspace::new(root);
        let host_classpath = host::host_classpath(host);

        if let Some(home) = &compilation.jdk_home
            && !home.is_dir()
        {
            return Err(Box::new(Error::JdkHomeNotFound { path: home.clone() }));
        }
        let jdk = JdkInfo::probe(host, compilation.jdk_home.as_deref());

        // Phase 2: dependent defaults
        let runtime = RuntimeJars::discover(&host_classpath);
        let tools_jar = if needs_kapt {
            resolve_tools_jar(&jdk, &host_classpath)?
        } else {
            None
        };
        let kotlin_generated_dir = resolve_kotlin_generated_dir(&compilation, &workspace)?;
        let classpath = common_classpath(ClasspathInputs {
            user: &compilation.classpaths,
            runtime: &runtime,
            host: &host_classpath,
            inherit_host: compilation.inherit_classpath,
            no_stdlib: compilation.no_stdlib,
            no_reflect: compilation.no_reflect,
        });

        debug!(
            root = %workspace.root().display(),
            classpath_entries = classpath.len(),
            jdk = ?jdk.version,
            tools_jar = ?tools_jar,
            "resolved compilation"
        );

        Ok(Self {
            compilation,
            workspace,
            host_classpath,
            runtime,
            jdk,
            tools_jar,
            kotlin_generated_dir,
            classpath,
        })
    }

    /// The Result's output directory.
    pub fn classes_dir(&self) -> PathBuf {
        self.workspace.classes()
    }

    /// Common classpath followed by the output directory, so later stages see
    /// classes produced by earlier ones.
    pub fn classpath_with_output(&self) -> Vec<PathBuf> {
        let mut entries = self.classpath.clone();
        entries.push(self.classes_dir());
        entries
    }
}

fn default_working_dir() -> Result<PathBuf> {
    let dir = tempfile::Builder::new()
        .prefix("kompile-")
        .tempdir()
        .map_err(|e| Error::io(std::env::temp_dir(), e))?;
    // The workspace outlives the compile call; callers inspect it afterwards.
    Ok(dir.keep())
}

fn resolve_tools_jar(jdk: &JdkInfo, host_classpath: &[PathBuf]) -> Result<Option<PathBuf>> {
    if !jdk.is_pre_modular() || host::tools_jar_visible(host_classpath) {
        return Ok(None);
    }
    match host::find_tools_jar(jdk.effective_home(), host_classpath) {
        Some(jar) => Ok(Some(jar)),
        None => Err(Box::new(Error::MissingToolsJar {
            version: jdk
                .version
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
        })),
    }
}

fn resolve_kotlin_generated_dir(compilation: &Compilation, workspace: &Workspace) -> Result<PathBuf> {
    match compilation.kapt_kotlin_generated() {
        Some(dir) if dir.is_dir() => Ok(dir),
        Some(dir) => Err(Box::new(Error::InvalidGeneratedDir {
            option: OPTION_KAPT_KOTLIN_GENERATED.to_string(),
            path: dir,
        })),
        None => Ok(workspace.kapt_kotlin_generated()),
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use tempfile::TempDir;

    use super::*;
    use crate::testing::StaticHost;

    fn jdk8_host(home: &Path) -> StaticHost {
        StaticHost::default()
            .jdk_home(home)
            .jdk(home, "1.8.0_292".parse().unwrap())
    }

    #[test]
    fn test_resolve_defaults() {
        let temp = TempDir::new().unwrap();
        let compilation = Compilation::new().working_dir(temp.path());

        let resolved =
            ResolvedCompilation::resolve(compilation, &StaticHost::default(), false).unwrap();

        assert_eq!(resolved.workspace.root(), temp.path());
        assert_eq!(
            resolved.kotlin_generated_dir,
            temp.path().join("kapt/kotlinGenerated")
        );
        assert!(resolved.classpath.is_empty());
        assert_eq!(resolved.tools_jar, None);
        assert_eq!(resolved.classes_dir(), temp.path().join("classes"));
    }

    #[test]
    fn test_resolve_creates_temp_root() {
        let resolved =
            ResolvedCompilation::resolve(Compilation::new(), &StaticHost::default(), false)
                .unwrap();

        let root = resolved.workspace.root().to_path_buf();
        assert!(root.is_dir());
        assert!(
            root.file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with("kompile-")
        );
        fs::remove_dir_all(root).unwrap();
    }

    #[test]
    fn test_missing_tools_jar_fails_fast() {
        let temp = TempDir::new().unwrap();
        let host = jdk8_host(&temp.path().join("jdk8"));
        let compilation = Compilation::new().working_dir(temp.path());

        let err = ResolvedCompilation::resolve(compilation, &host, true).unwrap_err();

        assert!(matches!(*err, Error::MissingToolsJar { .. }));
    }

    #[test]
    fn test_tools_jar_only_needed_for_kapt() {
        let temp = TempDir::new().unwrap();
        let host = jdk8_host(&temp.path().join("jdk8"));
        let compilation = Compilation::new().working_dir(temp.path());

        let resolved = ResolvedCompilation::resolve(compilation, &host, false).unwrap();

        assert_eq!(resolved.tools_jar, None);
    }

    #[test]
    fn test_tools_jar_from_jdk_lib() {
        let temp = TempDir::new().unwrap();
        let home = temp.path().join("jdk8");
        fs::create_dir_all(home.join("lib")).unwrap();
        fs::write(home.join("lib/tools.jar"), "").unwrap();
        let host = jdk8_host(&home);
        let compilation = Compilation::new().working_dir(temp.path());

        let resolved = ResolvedCompilation::resolve(compilation, &host, true).unwrap();

        assert_eq!(resolved.tools_jar, Some(home.join("lib/tools.jar")));
    }

    #[test]
    fn test_tools_jar_already_visible() {
        let temp = TempDir::new().unwrap();
        let host = jdk8_host(&temp.path().join("jdk8")).classpath("/jdk8/lib/tools.jar");
        let compilation = Compilation::new().working_dir(temp.path());

        let resolved = ResolvedCompilation::resolve(compilation, &host, true).unwrap();

        assert_eq!(resolved.tools_jar, None);
    }

    #[test]
    fn test_missing_jdk_home() {
        let temp = TempDir::new().unwrap();
        let compilation = Compilation::new()
            .working_dir(temp.path())
            .jdk_home(temp.path().join("no-such-jdk"));

        let err =
            ResolvedCompilation::resolve(compilation, &StaticHost::default(), false).unwrap_err();

        assert!(matches!(*err, Error::JdkHomeNotFound { .. }));
    }

    #[test]
    fn test_kapt_kotlin_generated_override() {
        let temp = TempDir::new().unwrap();
        let custom = temp.path().join("custom-gen");

        let compilation = Compilation::new()
            .working_dir(temp.path())
            .kapt_arg(OPTION_KAPT_KOTLIN_GENERATED, custom.display().to_string());
        let err = ResolvedCompilation::resolve(compilation.clone(), &StaticHost::default(), false)
            .unwrap_err();
        assert!(matches!(*err, Error::InvalidGeneratedDir { .. }));

        fs::create_dir_all(&custom).unwrap();
        let resolved =
            ResolvedCompilation::resolve(compilation, &StaticHost::default(), false).unwrap();
        assert_eq!(resolved.kotlin_generated_dir, custom);
    }
}
