//! The outcome of a compile call.

use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use kompile_core::ExitCode;
use thiserror::Error;
use walkdir::WalkDir;

const CLASS_MAGIC: [u8; 4] = [0xCA, 0xFE, 0xBA, 0xBE];

/// What a compile call produced. Built once, when the pipeline stops, and
/// never updated: file listings are taken at construction.
#[derive(Debug)]
pub struct CompilationResult {
    exit_code: ExitCode,
    output_directory: PathBuf,
    messages: String,
    classpath: Vec<PathBuf>,
    generated_files: Vec<PathBuf>,
    processor_sources: Vec<PathBuf>,
}

impl CompilationResult {
    pub fn new(
        exit_code: ExitCode,
        output_directory: PathBuf,
        messages: String,
        generated_source_dirs: Vec<PathBuf>,
        classpath: Vec<PathBuf>,
    ) -> Self {
        let generated_files = list_files(&output_directory);
        let processor_sources = generated_source_dirs
            .iter()
            .flat_map(|dir| list_files(dir))
            .collect();
        Self {
            exit_code,
            output_directory,
            messages,
            classpath,
            generated_files,
            processor_sources,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        self.exit_code
    }

    /// The classes directory of the workspace.
    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    /// Everything the stages printed, in order.
    pub fn messages(&self) -> &str {
        &self.messages
    }

    /// Files under the output directory when the compile call finished.
    pub fn generated_files(&self) -> &[PathBuf] {
        &self.generated_files
    }

    /// Java and Kotlin sources written by annotation processors.
    pub fn sources_generated_by_processors(&self) -> &[PathBuf] {
        &self.processor_sources
    }

    /// A loader for the compiled classes. Classes of the compile classpath
    /// are found through its parent, which only sees directory entries.
    pub fn class_loader(&self) -> ClassLoader {
        let parent_roots = self
            .classpath
            .iter()
            .filter(|entry| entry.is_dir())
            .cloned()
            .collect();
        ClassLoader::new(
            vec![self.output_directory.clone()],
            Some(Arc::new(ClassLoader::new(parent_roots, None))),
        )
    }
}

fn list_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect()
}

/// Errors raised when loading a class.
#[derive(Debug, Error)]
pub enum ClassLoadError {
    #[error("class not found: {name}")]
    NotFound { name: String },

    #[error("invalid class name `{name}`")]
    InvalidName { name: String },

    #[error("{} is not a class file", path.display())]
    BadMagic { path: PathBuf },

    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A class file found by a [`ClassLoader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedClass {
    pub name: String,
    pub path: PathBuf,
    pub bytes: Vec<u8>,
    /// Class-file major version (52 for Java 8).
    pub major_version: u16,
}

/// Finds class files under directory roots, asking its parent first.
#[derive(Debug, Clone)]
pub struct ClassLoader {
    roots: Vec<PathBuf>,
    parent: Option<Arc<ClassLoader>>,
}

impl ClassLoader {
    pub fn new(roots: Vec<PathBuf>, parent: Option<Arc<ClassLoader>>) -> Self {
        Self { roots, parent }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn parent(&self) -> Option<&ClassLoader> {
        self.parent.as_deref()
    }

    /// Load the class with binary name `name` (`a.b.Outer$Inner`).
    pub fn load_class(&self, name: &str) -> Result<LoadedClass, ClassLoadError> {
        if let Some(parent) = &self.parent {
            match parent.load_class(name) {
                Err(ClassLoadError::NotFound { .. }) => {}
                found => return found,
            }
        }
        self.find_class(name)
    }

    fn find_class(&self, name: &str) -> Result<LoadedClass, ClassLoadError> {
        let relative = class_file_path(name).ok_or_else(|| ClassLoadError::InvalidName {
            name: name.to_string(),
        })?;

        let Some(path) = self
            .roots
            .iter()
            .map(|root| root.join(&relative))
            .find(|path| path.is_file())
        else {
            return Err(ClassLoadError::NotFound {
                name: name.to_string(),
            });
        };

        let bytes = std::fs::read(&path).map_err(|source| ClassLoadError::Io {
            path: path.clone(),
            source,
        })?;
        if bytes.len() < 8 || bytes[..4] != CLASS_MAGIC {
            return Err(ClassLoadError::BadMagic { path });
        }
        let major_version = u16::from_be_bytes([bytes[6], bytes[7]]);

        Ok(LoadedClass {
            name: name.to_string(),
            path,
            bytes,
            major_version,
        })
    }
}

/// `a.b.C` -> `a/b/C.class`
fn class_file_path(name: &str) -> Option<PathBuf> {
    let valid_segment = |segment: &str| {
        let mut chars = segment.chars();
        chars
            .next()
            .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
            && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
    };
    let segments: Vec<&str> = name.split('.').collect();
    if !segments.iter().all(|s| valid_segment(s)) {
        return None;
    }
    let mut path: PathBuf = segments.iter().collect();
    path.set_extension("class");
    Some(path)
}
