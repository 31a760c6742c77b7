//! Helpers shared by the blog and learn walkers.

use std::path::Path;

use trail_storage::{Entry, Storage};

use crate::error::SiteError;

/// List a directory, treating a missing one as empty.
pub(crate) fn list_or_empty(storage: &dyn Storage, dir: &Path) -> Result<Vec<Entry>, SiteError> {
    match storage.list(dir) {
        Ok(entries) => Ok(entries),
        Err(e) if e.is_not_found() => {
            tracing::debug!(dir = %dir.display(), "Content directory missing, treating as empty");
            Ok(Vec::new())
        }
        Err(e) => Err(e.into()),
    }
}

/// Read a file, or `None` if it vanished since it was listed.
pub(crate) fn read_optional(storage: &dyn Storage, path: &Path) -> Result<Option<String>, SiteError> {
    match storage.read(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Whether a name can be used as one segment of a content route.
///
/// Hidden entries and `_`-prefixed descriptor files never are.
pub(crate) fn is_route_segment(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with(['.', '_'])
        && !name.contains(['/', '\\'])
}

/// Readable label derived from a file or directory name.
pub(crate) fn humanize(name: &str) -> String {
    name.replace('-', " ")
}

#[cfg(test)]
mod tests {
    use trail_storage::MockStorage;

    use super::*;

    #[test]
    fn test_list_missing_dir_is_empty() {
        let storage = MockStorage::new();

        let entries = list_or_empty(&storage, Path::new("blog/posts")).unwrap();

        assert!(entries.is_empty());
    }

    #[test]
    fn test_read_missing_file_is_none() {
        let storage = MockStorage::new();

        assert!(read_optional(&storage, Path::new("a.md")).unwrap().is_none());
    }

    #[test]
    fn test_route_segments() {
        assert!(is_route_segment("linux"));
        assert!(is_route_segment("os-fundamentals"));
        assert!(!is_route_segment(""));
        assert!(!is_route_segment(".."));
        assert!(!is_route_segment("_path.md"));
        assert!(!is_route_segment("a/b"));
    }

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("shell-scripting"), "shell scripting");
    }
}
