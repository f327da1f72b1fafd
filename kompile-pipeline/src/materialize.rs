//! Staging of in-memory source units into the workspace.

use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use kompile_core::{Language, SourceUnit, WriteResult};
use walkdir::WalkDir;

/// A source unit after it has been written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedSource {
    pub path: PathBuf,
    pub language: Option<Language>,
    pub write: WriteResult,
}

/// Ensure every unit exists under `root` with matching content.
///
/// Units whose file already holds the same content are not rewritten.
/// Unrelated files under `root` are left alone.
pub fn materialize(units: &[SourceUnit], root: &Path) -> Result<Vec<StagedSource>> {
    units
        .iter()
        .map(|unit| {
            let write = unit
                .write_to(root)
                .wrap_err_with(|| format!("failed to stage {}", unit.path().display()))?;
            Ok(StagedSource {
                path: root.join(unit.path()),
                language: unit.language(),
                write,
            })
        })
        .collect()
}

/// Staged paths of the given language, in staging order.
pub fn of_language(staged: &[StagedSource], language: Language) -> Vec<PathBuf> {
    staged
        .iter()
        .filter(|s| s.language == Some(language))
        .map(|s| s.path.clone())
        .collect()
}

/// Recursively list files of the given language under `dir`, sorted by path.
///
/// A missing directory yields an empty list.
pub fn find_sources(dir: &Path, language: Language) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| Language::from_path(path) == Some(language))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_materialize_writes_units() {
        let temp = TempDir::new().unwrap();
        let units = vec![
            SourceUnit::kotlin("com/example/Foo", "package com.example\nclass Foo").unwrap(),
            SourceUnit::java("Bar", "class Bar {}").unwrap(),
        ];

        let staged = materialize(&units, temp.path()).unwrap();

        assert_eq!(staged.len(), 2);
        assert_eq!(staged[0].path, temp.path().join("com/example/Foo.kt"));
        assert_eq!(staged[0].language, Some(Language::Kotlin));
        assert!(staged.iter().all(|s| s.write == WriteResult::Written));
        assert_eq!(
            fs::read_to_string(temp.path().join("Bar.java")).unwrap(),
            "class Bar {}"
        );
    }

    #[test]
    fn test_materialize_twice_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let units = vec![SourceUnit::kotlin("Foo", "class Foo").unwrap()];

        materialize(&units, temp.path()).unwrap();
        let path = temp.path().join("Foo.kt");
        let modified = fs::metadata(&path).unwrap().modified().unwrap();

        let staged = materialize(&units, temp.path()).unwrap();

        assert_eq!(staged[0].write, WriteResult::Unchanged);
        assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), modified);
        assert_eq!(fs::read_to_string(&path).unwrap(), "class Foo");
    }

    #[test]
    fn test_materialize_is_additive() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("Unrelated.kt"), "class Unrelated").unwrap();

        materialize(&[SourceUnit::kotlin("Foo", "class Foo").unwrap()], temp.path()).unwrap();

        assert!(temp.path().join("Unrelated.kt").exists());
    }

    #[test]
    fn test_find_sources_filters_by_language() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("a/b")).unwrap();
        fs::write(temp.path().join("a/b/Gen.java"), "").unwrap();
        fs::write(temp.path().join("a/Gen.kt"), "").unwrap();
        fs::write(temp.path().join("a/notes.txt"), "").unwrap();

        assert_eq!(
            find_sources(temp.path(), Language::Java),
            vec![temp.path().join("a/b/Gen.java")]
        );
        assert_eq!(
            find_sources(temp.path(), Language::Kotlin),
            vec![temp.path().join("a/Gen.kt")]
        );
        assert!(find_sources(&temp.path().join("missing"), Language::Java).is_empty());
    }
}
