use std::path::{Path, PathBuf};

use eyre::{Context, Result};

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .wrap_err_with(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, content).wrap_err_with(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// What [`File::write`] did on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteResult {
    Written,
    /// Content on disk already matched.
    Unchanged,
}

/// Policy for a path that already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overwrite {
    Always,
    /// Rewrite only when the content differs, keeping mtimes stable for
    /// recompiles in the same workspace.
    #[default]
    IfChanged,
}

/// A staged file: a materialized source, a service file or a placeholder.
#[derive(Debug, Clone)]
pub struct File {
    path: PathBuf,
    content: String,
    overwrite: Overwrite,
}

impl File {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            overwrite: Overwrite::default(),
        }
    }

    pub fn overwrite(mut self, overwrite: Overwrite) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Write to disk, creating parent directories as needed.
    pub fn write(&self) -> Result<WriteResult> {
        match self.overwrite {
            Overwrite::Always => {
                write_file(&self.path, &self.content)?;
                Ok(WriteResult::Written)
            }
            Overwrite::IfChanged => {
                // Unreadable files are rewritten.
                match std::fs::read_to_string(&self.path) {
                    Ok(existing) if existing == self.content => Ok(WriteResult::Unchanged),
                    _ => {
                        write_file(&self.path, &self.content)?;
                        Ok(WriteResult::Written)
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_write_file_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a").join("b").join("c").join("Test.kt");

        write_file(&path, "nested").unwrap();

        assert!(path.exists());
        assert_eq!(fs::read_to_string(&path).unwrap(), "nested");
    }

    #[test]
    fn test_file_write_always_overwrites() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("test.txt");
        fs::write(&path, "original").unwrap();

        let result = File::new(&path, "updated")
            .overwrite(Overwrite::Always)
            .write()
            .unwrap();

        assert_eq!(result, WriteResult::Written);
        assert_eq!(fs::read_to_string(&path).unwrap(), "updated");
    }

    #[test]
    fn test_file_write_if_changed_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("Foo.java");
        let file = File::new(&path, "class Foo {}");

        assert_eq!(file.write().unwrap(), WriteResult::Written);
        let modified = fs::metadata(&path).unwrap().modified().unwrap();

        assert_eq!(file.write().unwrap(), WriteResult::Unchanged);
        assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), modified);
        assert_eq!(fs::read_to_string(&path).unwrap(), "class Foo {}");
    }

    #[test]
    fn test_file_write_if_changed_rewrites_different_content() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("Foo.java");
        fs::write(&path, "class Bar {}").unwrap();

        let result = File::new(&path, "class Foo {}").write().unwrap();

        assert_eq!(result, WriteResult::Written);
        assert_eq!(fs::read_to_string(&path).unwrap(), "class Foo {}");
    }
}
