//! Directory layout of a compile call.

use std::path::{Path, PathBuf};

use eyre::{Context, Result};

/// Fixed layout under a workspace root.
///
/// ```text
/// <root>/
///   sources/                 staged source units
///   classes/                 compilation output
///   kapt/sources/            Java sources generated by processors
///   kapt/stubs/              Java stubs of Kotlin sources
///   kapt/incrementalData/
///   kapt/kotlinGenerated/    Kotlin sources generated by processors
///   kapt/registrar/          plugin-registration resource
///   kapt/placeholder/        empty Kotlin input for Java-only processing
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn sources(&self) -> PathBuf {
        self.root.join("sources")
    }

    pub fn classes(&self) -> PathBuf {
        self.root.join("classes")
    }

    fn kapt(&self) -> PathBuf {
        self.root.join("kapt")
    }

    pub fn kapt_sources(&self) -> PathBuf {
        self.kapt().join("sources")
    }

    pub fn kapt_stubs(&self) -> PathBuf {
        self.kapt().join("stubs")
    }

    pub fn kapt_incremental_data(&self) -> PathBuf {
        self.kapt().join("incrementalData")
    }

    pub fn kapt_kotlin_generated(&self) -> PathBuf {
        self.kapt().join("kotlinGenerated")
    }

    pub fn kapt_registrar(&self) -> PathBuf {
        self.kapt().join("registrar")
    }

    pub fn kapt_placeholder(&self) -> PathBuf {
        self.kapt().join("placeholder")
    }

    fn directories(&self) -> [PathBuf; 6] {
        [
            self.sources(),
            self.classes(),
            self.kapt_sources(),
            self.kapt_stubs(),
            self.kapt_incremental_data(),
            self.kapt_kotlin_generated(),
        ]
    }

    /// Create every directory of the layout. Existing content is kept.
    pub fn create(&self) -> Result<()> {
        for dir in self.directories() {
            std::fs::create_dir_all(&dir)
                .wrap_err_with(|| format!("failed to create {}", dir.display()))?;
        }
        Ok(())
    }
}
