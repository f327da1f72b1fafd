//! `kompile.toml` parsing.

use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use kompile_core::SourceUnit;
use serde::Deserialize;
use walkdir::WalkDir;

use crate::{
    Compilation, Error, Result,
    compilation::JVM_TARGETS,
    error::SourceContext,
};

/// Root manifest for kompile.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Manifest {
    /// Compiler and toolchain options
    pub compilation: Compilation,
    /// Where to collect sources from
    pub sources: SourceRoots,
}

/// Directories whose files are staged as sources.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceRoots {
    pub roots: Vec<PathBuf>,
}

impl FromStr for Manifest {
    type Err = Box<Error>;

    fn from_str(s: &str) -> Result<Self> {
        parse_manifest(s, "kompile.toml")
    }
}

/// Parse a manifest from content with the given filename for error reporting.
pub fn parse_manifest(content: &str, filename: &str) -> Result<Manifest> {
    let source_ctx = SourceContext::new(content, filename);
    let manifest: Manifest = toml::from_str(content).map_err(|e| source_ctx.parse_error(e))?;

    if let Some(target) = &manifest.compilation.jvm_target
        && !JVM_TARGETS.contains(&target.as_str())
    {
        return Err(source_ctx.validation_error_near(
            format!(
                "unknown jvm-target '{}', expected one of: {}",
                target,
                JVM_TARGETS.join(", ")
            ),
            "jvm-target",
        ));
    }

    Ok(manifest)
}

/// Represents a kompile.toml file together with its location.
pub struct KompileToml {
    path: PathBuf,
    manifest: Manifest,
}

impl KompileToml {
    /// Open and parse a kompile.toml file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        let manifest = parse_manifest(&content, &path.display().to_string())?;

        Ok(Self { path, manifest })
    }

    /// Get the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the parsed manifest.
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Directory that relative paths in the manifest are resolved against.
    pub fn base_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Build the compilation record: paths resolved against the manifest's
    /// directory and every file under the source roots loaded.
    pub fn into_compilation(self) -> Result<Compilation> {
        let base = self.base_dir();
        let mut compilation = self.manifest.compilation;

        let resolve = |p: PathBuf| if p.is_absolute() { p } else { base.join(p) };
        compilation.working_dir = compilation.working_dir.map(resolve);
        compilation.jdk_home = compilation.jdk_home.map(resolve);
        compilation.kotlinc = compilation.kotlinc.map(resolve);
        compilation.classpaths = compilation.classpaths.into_iter().map(resolve).collect();

        for root in &self.manifest.sources.roots {
            let root = resolve(root.clone());
            compilation.sources.extend(load_sources(&root)?);
        }

        Ok(compilation)
    }
}

/// Load every file under `root` as a source unit relative to `root`.
pub fn load_sources(root: &Path) -> Result<Vec<SourceUnit>> {
    let mut units = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            Error::io(path, e.into())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| entry.path().to_path_buf());
        let content =
            std::fs::read_to_string(entry.path()).map_err(|e| Error::io(entry.path(), e))?;
        let unit = SourceUnit::new(&relative, content).map_err(|e| {
            Box::new(Error::InvalidSourcePath {
                path: relative.clone(),
                reason: e.to_string(),
            })
        })?;
        units.push(unit);
    }

    Ok(units)
}
