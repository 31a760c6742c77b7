//! Error types for content discovery and resolution.

use std::path::PathBuf;

use trail_storage::StorageError;

use crate::page::RenderError;

/// Error returned by listing and resolution operations.
///
/// A missing content root or a missing route is never an error: listings
/// come back empty and resolution returns `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    /// Content exists but could not be read.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    /// A page body failed to render.
    #[error("Failed to render {}: {source}", path.display())]
    Render {
        /// Source file, relative to the content root.
        path: PathBuf,
        #[source]
        source: RenderError,
    },
}
