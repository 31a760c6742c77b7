//! Filesystem storage implementation.
//!
//! Provides [`FsStorage`] for reading content from a directory on the local
//! filesystem.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::storage::{Entry, EntryKind, Storage, StorageError, StorageErrorKind};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Filesystem storage rooted at a content directory.
///
/// Hidden entries (names starting with `.`) are never listed.
///
/// # Example
///
/// ```ignore
/// use std::path::{Path, PathBuf};
/// use trail_storage::{FsStorage, Storage};
///
/// let storage = FsStorage::new(PathBuf::from("content"));
/// let raw = storage.read(Path::new("learn/linux/_path.md"))?;
/// ```
#[derive(Debug, Clone)]
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    /// Create a new filesystem storage rooted at `root`.
    ///
    /// The root doesn't have to exist; a missing root behaves like an empty tree.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Content root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validate that a path doesn't escape the content root.
    ///
    /// Rejects parent directory components (`..`) and absolute paths.
    fn validate_path(path: &Path) -> Result<(), StorageError> {
        let escapes = path.components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });

        if escapes {
            return Err(StorageError::new(StorageErrorKind::InvalidPath)
                .with_path(path)
                .with_backend(BACKEND));
        }
        Ok(())
    }

    fn resolve(&self, path: &Path) -> Result<PathBuf, StorageError> {
        Self::validate_path(path)?;
        Ok(self.root.join(path))
    }
}

impl Storage for FsStorage {
    fn list(&self, dir: &Path) -> Result<Vec<Entry>, StorageError> {
        let full_path = self.resolve(dir)?;
        let read_dir = fs::read_dir(&full_path)
            .map_err(|e| StorageError::io(e, Some(full_path.clone())).with_backend(BACKEND))?;

        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry
                .map_err(|e| StorageError::io(e, Some(full_path.clone())).with_backend(BACKEND))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }

            let Ok(file_type) = entry.file_type() else {
                tracing::debug!(path = %entry.path().display(), "Skipping entry with unknown type");
                continue;
            };
            // Follow symlinks so linked content directories behave like real ones.
            let is_dir = if file_type.is_symlink() {
                entry.path().is_dir()
            } else {
                file_type.is_dir()
            };

            entries.push(if is_dir {
                Entry::dir(name)
            } else {
                Entry::file(name)
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn read(&self, path: &Path) -> Result<String, StorageError> {
        let full_path = self.resolve(path)?;
        fs::read_to_string(&full_path)
            .map_err(|e| StorageError::io(e, Some(full_path.clone())).with_backend(BACKEND))
    }

    fn stat(&self, path: &Path) -> Option<EntryKind> {
        let full_path = self.resolve(path).ok()?;
        let metadata = fs::metadata(full_path).ok()?;
        Some(if metadata.is_dir() {
            EntryKind::Dir
        } else {
            EntryKind::File
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_fs_storage_is_send_sync() {
        assert_send_sync::<FsStorage>();
    }

    fn create_test_dir() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }

    #[test]
    fn test_list_sorted_by_name() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("b.md"), "b").unwrap();
        fs::write(temp_dir.path().join("a.md"), "a").unwrap();
        fs::create_dir(temp_dir.path().join("c")).unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let entries = storage.list(Path::new("")).unwrap();

        assert_eq!(
            entries,
            vec![Entry::file("a.md"), Entry::file("b.md"), Entry::dir("c")]
        );
    }

    #[test]
    fn test_list_skips_hidden_entries() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join(".hidden.md"), "x").unwrap();
        fs::create_dir(temp_dir.path().join(".git")).unwrap();
        fs::write(temp_dir.path().join("visible.md"), "x").unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let entries = storage.list(Path::new("")).unwrap();

        assert_eq!(entries, vec![Entry::file("visible.md")]);
    }

    #[test]
    fn test_list_missing_dir() {
        let storage = FsStorage::new(PathBuf::from("/nonexistent"));

        let err = storage.list(Path::new("blog/posts")).unwrap_err();

        assert_eq!(err.kind(), StorageErrorKind::NotFound);
        assert_eq!(err.backend(), Some("Fs"));
    }

    #[test]
    fn test_read_nested_file() {
        let temp_dir = create_test_dir();
        fs::create_dir_all(temp_dir.path().join("learn/linux")).unwrap();
        fs::write(temp_dir.path().join("learn/linux/_path.md"), "# Linux").unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let content = storage.read(Path::new("learn/linux/_path.md")).unwrap();

        assert_eq!(content, "# Linux");
    }

    #[test]
    fn test_read_missing_file() {
        let temp_dir = create_test_dir();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let err = storage.read(Path::new("missing.md")).unwrap_err();

        assert!(err.is_not_found());
    }

    #[test]
    fn test_stat() {
        let temp_dir = create_test_dir();
        fs::create_dir(temp_dir.path().join("posts")).unwrap();
        fs::write(temp_dir.path().join("posts/a.md"), "a").unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());

        assert_eq!(storage.stat(Path::new("posts")), Some(EntryKind::Dir));
        assert_eq!(storage.stat(Path::new("posts/a.md")), Some(EntryKind::File));
        assert_eq!(storage.stat(Path::new("posts/b.md")), None);
        assert!(storage.is_file(Path::new("posts/a.md")));
        assert!(storage.is_dir(Path::new("posts")));
    }

    #[test]
    fn test_read_rejects_path_traversal() {
        let temp_dir = create_test_dir();
        let content_dir = temp_dir.path().join("content");
        fs::create_dir(&content_dir).unwrap();
        fs::write(temp_dir.path().join("secret.md"), "secret").unwrap();

        let storage = FsStorage::new(content_dir);
        let err = storage.read(Path::new("../secret.md")).unwrap_err();

        assert_eq!(err.kind(), StorageErrorKind::InvalidPath);
    }

    #[test]
    fn test_stat_rejects_path_traversal() {
        let temp_dir = create_test_dir();
        let content_dir = temp_dir.path().join("content");
        fs::create_dir(&content_dir).unwrap();

        let storage = FsStorage::new(content_dir);

        assert_eq!(storage.stat(Path::new("..")), None);
        assert_eq!(storage.stat(Path::new("/etc")), None);
    }
}
