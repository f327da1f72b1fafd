use std::{
    fmt,
    path::{Component, Path, PathBuf},
};

use eyre::{Result, bail};

use crate::file::{File, WriteResult};

/// Source language of a staged file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    /// Compiled first, by the Kotlin front end.
    Kotlin,
    /// Compiled last, by javac.
    Java,
}

impl Language {
    /// Infer the language from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "kt" | "kts" => Some(Language::Kotlin),
            "java" => Some(Language::Java),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Language::Kotlin => "kt",
            Language::Java => "java",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::Kotlin => write!(f, "kotlin"),
            Language::Java => write!(f, "java"),
        }
    }
}

/// Accept only non-empty paths made of plain components.
fn checked_relative(path: PathBuf) -> Result<PathBuf> {
    let escapes = path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if path.as_os_str().is_empty() || escapes {
        bail!(
            "source path '{}' must be relative to the sources root",
            path.display()
        );
    }
    Ok(path)
}

/// An in-memory source file, staged into a workspace before compiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    path: PathBuf,
    content: String,
    language: Option<Language>,
}

impl SourceUnit {
    /// Create a unit at `path`, relative to the sources root.
    ///
    /// # Errors
    ///
    /// Fails for absolute paths and paths that escape the root.
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Result<Self> {
        let path = checked_relative(path.into())?;
        let language = Language::from_path(&path);
        Ok(Self {
            path,
            content: content.into(),
            language,
        })
    }

    /// A Kotlin unit named `name` (`.kt` is appended when missing).
    ///
    /// # Errors
    ///
    /// Fails under the same rules as [`SourceUnit::new`].
    pub fn kotlin(name: &str, content: impl Into<String>) -> Result<Self> {
        Self::with_language(name, content.into(), Language::Kotlin)
    }

    /// A Java unit named `name` (`.java` is appended when missing).
    ///
    /// # Errors
    ///
    /// Fails under the same rules as [`SourceUnit::new`].
    pub fn java(name: &str, content: impl Into<String>) -> Result<Self> {
        Self::with_language(name, content.into(), Language::Java)
    }

    fn with_language(name: &str, content: String, language: Language) -> Result<Self> {
        let mut path = checked_relative(PathBuf::from(name))?;
        if Language::from_path(&path) != Some(language) {
            path.set_extension(language.extension());
        }
        Ok(Self {
            path,
            content,
            language: Some(language),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn language(&self) -> Option<Language> {
        self.language
    }

    /// Write this unit under `root`, skipping the write if the file already
    /// holds the same content.
    pub fn write_to(&self, root: &Path) -> Result<WriteResult> {
        File::new(root.join(&self.path), self.content.as_str()).write()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_from_extension() {
        assert_eq!(Language::from_path(Path::new("a/B.kt")), Some(Language::Kotlin));
        assert_eq!(Language::from_path(Path::new("script.kts")), Some(Language::Kotlin));
        assert_eq!(Language::from_path(Path::new("a/B.java")), Some(Language::Java));
        assert_eq!(Language::from_path(Path::new("META-INF/x.txt")), None);
        assert_eq!(Language::from_path(Path::new("Makefile")), None);
    }

    #[test]
    fn test_named_constructors_append_extension() {
        let unit = SourceUnit::kotlin("Foo", "class Foo").unwrap();
        assert_eq!(unit.path(), Path::new("Foo.kt"));
        assert_eq!(unit.language(), Some(Language::Kotlin));

        let unit = SourceUnit::java("com/example/Bar.java", "class Bar {}").unwrap();
        assert_eq!(unit.path(), Path::new("com/example/Bar.java"));
        assert_eq!(unit.language(), Some(Language::Java));
    }

    #[test]
    fn test_new_rejects_escaping_paths() {
        assert!(SourceUnit::new("../Foo.kt", "").is_err());
        assert!(SourceUnit::new("/tmp/Foo.kt", "").is_err());
        assert!(SourceUnit::new("", "").is_err());
        assert!(SourceUnit::new("a/./Foo.kt", "").is_ok());
    }

    #[test]
    fn test_named_constructors_reject_escaping_paths() {
        assert!(SourceUnit::kotlin("../escaped/Evil.kt", "class Evil").is_err());
        assert!(SourceUnit::kotlin("a/../../Evil", "class Evil").is_err());
        assert!(SourceUnit::java("/tmp/Evil.java", "class Evil {}").is_err());
        assert!(SourceUnit::java("", "").is_err());
    }

    #[test]
    fn test_resources_have_no_language() {
        let unit = SourceUnit::new("META-INF/services/x", "y").unwrap();
        assert_eq!(unit.language(), None);
    }
}
