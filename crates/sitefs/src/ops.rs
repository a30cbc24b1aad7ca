//! Backend trait.
//!
//! The read-only capability set every content source implements. The facade
//! and everything above it depend on this trait only.

use crate::error::FsResult;
use crate::node::Node;
use crate::types::Metadata;

/// A read-only content source.
///
/// Paths arrive normalized (see [`crate::path::normalize`]): slash-separated,
/// relative to the root, no leading separator, `""` for the root itself.
pub trait Backend: Send + Sync {
    /// Short name identifying the backend.
    fn name(&self) -> &str;

    /// Fetch a file with its full content, or a directory with its listing.
    ///
    /// Every call fetches again; nothing is cached.
    fn open(&self, path: &str) -> FsResult<Node>;

    /// Metadata for a path.
    ///
    /// Defaults to a full `open`; backends with a cheaper classification call
    /// override it.
    fn stat(&self, path: &str) -> FsResult<Metadata> {
        Ok(self.open(path)?.metadata())
    }
}
