//! Mock storage implementation for testing.
//!
//! Provides [`MockStorage`] for unit testing without filesystem access.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::storage::{Entry, EntryKind, Storage, StorageError, StorageErrorKind};

const BACKEND: &str = "Mock";

/// Mock storage for testing.
///
/// Holds an in-memory tree of files. Parent directories of every added file
/// exist implicitly; empty directories are added with [`MockStorage::with_dir`].
///
/// # Example
///
/// ```ignore
/// use std::path::Path;
/// use trail_storage::{MockStorage, Storage};
///
/// let storage = MockStorage::new()
///     .with_file("blog/posts/2024-03-10-first-post.md", "---\ntitle: First\n---\nHello");
///
/// let entries = storage.list(Path::new("blog/posts")).unwrap();
/// ```
#[derive(Debug, Default)]
pub struct MockStorage {
    files: RwLock<BTreeMap<PathBuf, String>>,
    dirs: RwLock<BTreeSet<PathBuf>>,
}

impl MockStorage {
    /// Create a new empty mock storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with the given content.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_file(self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        let path: PathBuf = path.into();
        {
            let mut dirs = self.dirs.write().unwrap();
            for ancestor in path.ancestors().skip(1) {
                dirs.insert(ancestor.to_path_buf());
            }
        }
        self.files.write().unwrap().insert(path, content.into());
        self
    }

    /// Add an empty directory.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_dir(self, path: impl Into<PathBuf>) -> Self {
        let path: PathBuf = path.into();
        {
            let mut dirs = self.dirs.write().unwrap();
            for ancestor in path.ancestors() {
                dirs.insert(ancestor.to_path_buf());
            }
        }
        self
    }

    /// Remove a file, e.g. to simulate content disappearing between two reads.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn remove_file(&self, path: &Path) {
        self.files.write().unwrap().remove(path);
    }

    fn not_found(path: &Path) -> StorageError {
        StorageError::new(StorageErrorKind::NotFound)
            .with_path(path)
            .with_backend(BACKEND)
    }
}

impl Storage for MockStorage {
    fn list(&self, dir: &Path) -> Result<Vec<Entry>, StorageError> {
        let dirs = self.dirs.read().unwrap();
        if !dirs.contains(dir) {
            return Err(Self::not_found(dir));
        }

        let mut children: BTreeMap<String, EntryKind> = BTreeMap::new();
        for path in dirs.iter() {
            if path.parent() == Some(dir)
                && let Some(name) = path.file_name()
            {
                children.insert(name.to_string_lossy().into_owned(), EntryKind::Dir);
            }
        }
        for path in self.files.read().unwrap().keys() {
            if path.parent() == Some(dir)
                && let Some(name) = path.file_name()
            {
                children.insert(name.to_string_lossy().into_owned(), EntryKind::File);
            }
        }

        Ok(children
            .into_iter()
            .map(|(name, kind)| Entry { name, kind })
            .collect())
    }

    fn read(&self, path: &Path) -> Result<String, StorageError> {
        self.files
            .read()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| Self::not_found(path))
    }

    fn stat(&self, path: &Path) -> Option<EntryKind> {
        if self.files.read().unwrap().contains_key(path) {
            Some(EntryKind::File)
        } else if self.dirs.read().unwrap().contains(path) {
            Some(EntryKind::Dir)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_mock_storage_is_send_sync() {
        assert_send_sync::<MockStorage>();
    }

    #[test]
    fn test_new_empty() {
        let storage = MockStorage::new();

        let err = storage.list(Path::new("blog")).unwrap_err();

        assert_eq!(err.kind(), StorageErrorKind::NotFound);
        assert_eq!(err.backend(), Some("Mock"));
    }

    #[test]
    fn test_with_file_creates_parents() {
        let storage = MockStorage::new().with_file("learn/linux/basics/basics.md", "# Basics");

        assert_eq!(
            storage.list(Path::new("")).unwrap(),
            vec![Entry::dir("learn")]
        );
        assert_eq!(
            storage.list(Path::new("learn/linux")).unwrap(),
            vec![Entry::dir("basics")]
        );
        assert_eq!(
            storage.list(Path::new("learn/linux/basics")).unwrap(),
            vec![Entry::file("basics.md")]
        );
    }

    #[test]
    fn test_list_mixed_sorted() {
        let storage = MockStorage::new()
            .with_file("posts/b.md", "b")
            .with_file("posts/a.md", "a")
            .with_dir("posts/drafts");

        assert_eq!(
            storage.list(Path::new("posts")).unwrap(),
            vec![Entry::file("a.md"), Entry::file("b.md"), Entry::dir("drafts")]
        );
    }

    #[test]
    fn test_read() {
        let storage = MockStorage::new().with_file("guide.md", "# Guide\n\nContent.");

        assert_eq!(
            storage.read(Path::new("guide.md")).unwrap(),
            "# Guide\n\nContent."
        );
    }

    #[test]
    fn test_read_missing() {
        let storage = MockStorage::new();

        let err = storage.read(Path::new("missing.md")).unwrap_err();

        assert_eq!(err.kind(), StorageErrorKind::NotFound);
        assert_eq!(err.path(), Some(Path::new("missing.md")));
    }

    #[test]
    fn test_stat() {
        let storage = MockStorage::new().with_file("a/b.md", "x");

        assert_eq!(storage.stat(Path::new("a")), Some(EntryKind::Dir));
        assert_eq!(storage.stat(Path::new("a/b.md")), Some(EntryKind::File));
        assert_eq!(storage.stat(Path::new("a/c.md")), None);
    }

    #[test]
    fn test_remove_file() {
        let storage = MockStorage::new().with_file("a.md", "x");

        storage.remove_file(Path::new("a.md"));

        assert!(!storage.is_file(Path::new("a.md")));
    }
}
