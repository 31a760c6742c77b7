//! Read-only content storage for the Trail site generator.
//!
//! This crate provides a narrow [`Storage`] trait covering the three filesystem
//! operations content discovery needs: list a directory, read a file, and stat
//! a path. Keeping I/O behind the trait lets the blog and learn walkers run
//! against an in-memory tree in tests.
//!
//! # Architecture
//!
//! The crate provides:
//! - [`Storage`] trait with `list()`, `read()` and `stat()` methods
//! - [`FsStorage`] implementation rooted at a content directory
//! - [`MockStorage`] for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use std::path::{Path, PathBuf};
//! use trail_storage::{FsStorage, Storage};
//!
//! let storage = FsStorage::new(PathBuf::from("content"));
//! for entry in storage.list(Path::new("blog/posts"))? {
//!     println!("{}", entry.name);
//! }
//! ```

mod fs;
#[cfg(feature = "mock")]
mod mock;
mod storage;

pub use fs::FsStorage;
#[cfg(feature = "mock")]
pub use mock::MockStorage;
pub use storage::{Entry, EntryKind, Storage, StorageError, StorageErrorKind};
