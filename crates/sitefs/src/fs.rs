//! Filesystem facade.
//!
//! [`SiteFs`] presents any [`Backend`] through one read-only surface:
//! it normalizes paths, rejects write intent, and wraps fetched nodes in
//! [`File`] handles.

use std::io::Read;
use std::sync::Arc;
use std::time::SystemTime;

use crate::error::{FsError, FsResult};
use crate::node::File;
use crate::ops::Backend;
use crate::path;
use crate::types::{DirEntry, Metadata, OpenFlags};

/// Read-only filesystem over a single backend.
///
/// Cheap to clone; clones share the backend.
#[derive(Clone)]
pub struct SiteFs {
    backend: Arc<dyn Backend>,
}

impl std::fmt::Debug for SiteFs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteFs")
            .field("backend", &self.backend.name())
            .finish()
    }
}

impl SiteFs {
    /// Wrap a backend.
    pub fn new(backend: impl Backend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Wrap a backend that is already shared.
    pub fn from_arc(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Name of the backend underneath.
    pub fn name(&self) -> &str {
        self.backend.name()
    }

    // ========================================================================
    // Reading
    // ========================================================================

    /// Open a file or directory.
    pub fn open(&self, name: &str) -> FsResult<File> {
        let path = clean(name)?;
        tracing::trace!(backend = self.name(), %path, "open");
        Ok(self.backend.open(&path)?.into_file())
    }

    /// Open with flags. Any write intent fails before the backend is asked.
    pub fn open_file(&self, name: &str, flags: OpenFlags) -> FsResult<File> {
        if flags.wants_write() {
            return Err(FsError::ReadOnly);
        }
        self.open(name)
    }

    /// Metadata for a path.
    pub fn stat(&self, name: &str) -> FsResult<Metadata> {
        let path = clean(name)?;
        self.backend.stat(&path)
    }

    // ========================================================================
    // Writing (always rejected)
    // ========================================================================

    /// Create a file. Always fails with `ReadOnly`.
    pub fn create(&self, _name: &str) -> FsResult<File> {
        Err(FsError::ReadOnly)
    }

    /// Create a directory. Always fails with `ReadOnly`.
    pub fn mkdir(&self, _name: &str, _perm: u32) -> FsResult<()> {
        Err(FsError::ReadOnly)
    }

    /// Create a directory and its parents. Always fails with `ReadOnly`.
    pub fn mkdir_all(&self, _path: &str, _perm: u32) -> FsResult<()> {
        Err(FsError::ReadOnly)
    }

    /// Remove a file or empty directory. Always fails with `ReadOnly`.
    pub fn remove(&self, _name: &str) -> FsResult<()> {
        Err(FsError::ReadOnly)
    }

    /// Remove a tree. Always fails with `ReadOnly`.
    pub fn remove_all(&self, _path: &str) -> FsResult<()> {
        Err(FsError::ReadOnly)
    }

    /// Rename an entry. Always fails with `ReadOnly`.
    pub fn rename(&self, _from: &str, _to: &str) -> FsResult<()> {
        Err(FsError::ReadOnly)
    }

    /// Change permissions. Always fails with `ReadOnly`.
    pub fn chmod(&self, _name: &str, _perm: u32) -> FsResult<()> {
        Err(FsError::ReadOnly)
    }

    /// Change access and modification times. Always fails with `ReadOnly`.
    pub fn chtimes(&self, _name: &str, _atime: SystemTime, _mtime: SystemTime) -> FsResult<()> {
        Err(FsError::ReadOnly)
    }

    // ========================================================================
    // Convenience methods
    // ========================================================================

    /// Check if a path exists. Errors other than not-found are returned.
    pub fn exists(&self, name: &str) -> FsResult<bool> {
        match self.stat(name) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Read entire file contents.
    pub fn read_to_end(&self, name: &str) -> FsResult<Vec<u8>> {
        let mut file = self.open(name)?;
        if file.node().is_dir() {
            return Err(FsError::is_a_directory(file.name()));
        }
        let mut buf = Vec::with_capacity(file.node().size() as usize);
        file.read_to_end(&mut buf)?;
        Ok(buf)
    }

    /// Read entire file contents as UTF-8.
    pub fn read_to_string(&self, name: &str) -> FsResult<String> {
        let bytes = self.read_to_end(name)?;
        String::from_utf8(bytes).map_err(|e| {
            FsError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })
    }

    /// All entries of a directory, in backend order.
    pub fn read_dir(&self, name: &str) -> FsResult<Vec<DirEntry>> {
        self.open(name)?.readdir(None)
    }
}

/// Normalize a caller path. NUL bytes never reach a backend.
fn clean(name: &str) -> FsResult<String> {
    if name.contains('\0') {
        return Err(FsError::InvalidPath(name.escape_default().to_string()));
    }
    Ok(path::normalize(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use parking_lot::Mutex;

    /// Backend serving a fixed tree and recording every path it is asked for.
    #[derive(Default)]
    struct FixtureBackend {
        calls: Mutex<Vec<String>>,
    }

    impl Backend for FixtureBackend {
        fn name(&self) -> &str {
            "fixture"
        }

        fn open(&self, path: &str) -> FsResult<Node> {
            self.calls.lock().push(path.to_string());
            match path {
                "" => Ok(Node::directory(
                    "",
                    vec![DirEntry::file("config.yaml", 9), DirEntry::directory("content")],
                )),
                "config.yaml" => Ok(Node::file(path, b"title: x\n".to_vec())),
                "content" => Ok(Node::directory(path, vec![DirEntry::file("a.md", 5)])),
                "content/a.md" => Ok(Node::file(path, b"# hi\n".to_vec())),
                _ => Err(FsError::not_found(path)),
            }
        }
    }

    fn fixture() -> (SiteFs, Arc<FixtureBackend>) {
        let backend = Arc::new(FixtureBackend::default());
        (SiteFs::from_arc(backend.clone()), backend)
    }

    #[test]
    fn test_open_normalizes_leading_separator() {
        let (fs, backend) = fixture();
        let file = fs.open("/content/a.md").unwrap();
        assert_eq!(file.name(), "content/a.md");
        assert_eq!(backend.calls.lock().as_slice(), ["content/a.md"]);
    }

    #[test]
    fn test_open_file_rejects_write_intent_before_fetch() {
        let (fs, backend) = fixture();
        for flags in [
            OpenFlags::write(),
            OpenFlags::append(),
            OpenFlags::create(),
            OpenFlags::create_truncate(),
        ] {
            assert!(fs.open_file("content/a.md", flags).unwrap_err().is_read_only());
        }
        assert!(backend.calls.lock().is_empty());

        assert!(fs.open_file("content/a.md", OpenFlags::read()).is_ok());
    }

    #[test]
    fn test_write_side_calls_are_rejected() {
        let (fs, backend) = fixture();
        let now = SystemTime::now();
        assert!(fs.create("new.md").unwrap_err().is_read_only());
        assert!(fs.mkdir("d", 0o755).unwrap_err().is_read_only());
        assert!(fs.mkdir_all("d/e", 0o755).unwrap_err().is_read_only());
        assert!(fs.remove("config.yaml").unwrap_err().is_read_only());
        assert!(fs.remove_all("content").unwrap_err().is_read_only());
        assert!(fs.rename("config.yaml", "x").unwrap_err().is_read_only());
        assert!(fs.chmod("config.yaml", 0o644).unwrap_err().is_read_only());
        assert!(fs.chtimes("config.yaml", now, now).unwrap_err().is_read_only());
        assert!(backend.calls.lock().is_empty());

        // Still there, unchanged
        assert_eq!(fs.read_to_string("config.yaml").unwrap(), "title: x\n");
    }

    #[test]
    fn test_nul_bytes_are_rejected() {
        let (fs, backend) = fixture();
        assert!(matches!(fs.open("a\0.md"), Err(FsError::InvalidPath(_))));
        assert!(matches!(fs.stat("a\0.md"), Err(FsError::InvalidPath(_))));
        assert!(backend.calls.lock().is_empty());
    }

    #[test]
    fn test_stat_delegates_to_open() {
        let (fs, backend) = fixture();
        let meta = fs.stat("content").unwrap();
        assert!(meta.is_dir());
        assert_eq!(meta.name, "content");
        assert!(fs.stat("missing.md").unwrap_err().is_not_found());
        assert_eq!(backend.calls.lock().len(), 2);
    }

    #[test]
    fn test_reopen_fetches_again() {
        let (fs, backend) = fixture();
        fs.open("config.yaml").unwrap();
        fs.open("config.yaml").unwrap();
        assert_eq!(backend.calls.lock().len(), 2);
    }

    #[test]
    fn test_helpers() {
        let (fs, _) = fixture();
        assert!(fs.exists("/content").unwrap());
        assert!(!fs.exists("nope").unwrap());
        assert_eq!(fs.read_to_end("content/a.md").unwrap(), b"# hi\n");
        let names: Vec<_> = fs.read_dir("/").unwrap().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["config.yaml", "content"]);
        assert!(matches!(fs.read_to_end("content"), Err(FsError::IsADirectory(_))));
        assert!(matches!(fs.read_to_string("/"), Err(FsError::IsADirectory(_))));
        assert_eq!(format!("{fs:?}"), "SiteFs { backend: \"fixture\" }");
    }
}
