//! Fetched entries and the handles that read them.
//!
//! A [`Node`] is an immutable snapshot of one file or directory, taken when
//! the path was opened. A [`File`] is a Node plus a read cursor. Both
//! backends hand out the same handle type, so callers never see which
//! backend produced it.

use std::io;

use crate::error::{FsError, FsResult};
use crate::path;
use crate::types::{DirEntry, FileType, Metadata};

#[derive(Debug, Clone)]
enum Body {
    File(Vec<u8>),
    Directory(Vec<DirEntry>),
}

/// Snapshot of one fetched file or directory.
///
/// Content and listing are fetched once, at open time, and never refreshed.
#[derive(Debug, Clone)]
pub struct Node {
    path: String,
    body: Body,
}

impl Node {
    /// A file node holding its full decoded content.
    pub fn file(path: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            body: Body::File(content),
        }
    }

    /// A directory node holding its ordered child entries.
    pub fn directory(path: impl Into<String>, children: Vec<DirEntry>) -> Self {
        Self {
            path: path.into(),
            body: Body::Directory(children),
        }
    }

    /// Normalized path relative to the filesystem root.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns true for directory nodes.
    pub fn is_dir(&self) -> bool {
        matches!(self.body, Body::Directory(_))
    }

    /// Byte length for files, 0 for directories.
    pub fn size(&self) -> u64 {
        match &self.body {
            Body::File(content) => content.len() as u64,
            Body::Directory(_) => 0,
        }
    }

    /// File content, `None` for directories.
    pub fn content(&self) -> Option<&[u8]> {
        match &self.body {
            Body::File(content) => Some(content),
            Body::Directory(_) => None,
        }
    }

    /// Child entries, `None` for files.
    pub fn children(&self) -> Option<&[DirEntry]> {
        match &self.body {
            Body::File(_) => None,
            Body::Directory(children) => Some(children),
        }
    }

    /// Metadata projection of this node.
    pub fn metadata(&self) -> Metadata {
        let kind = if self.is_dir() {
            FileType::Directory
        } else {
            FileType::File
        };
        Metadata {
            name: path::base_name(&self.path).to_string(),
            size: self.size(),
            kind,
        }
    }

    /// Wrap this node in a handle positioned at the start.
    pub fn into_file(self) -> File {
        File { node: self, pos: 0 }
    }
}

/// Read-only handle over a [`Node`].
///
/// Implements [`io::Read`] and [`io::Seek`] for files. Directory handles
/// reject byte operations with `IsADirectory`; file handles reject listings
/// with `NotADirectory`. Every write-side operation fails with `ReadOnly`.
#[derive(Debug, Clone)]
pub struct File {
    node: Node,
    pos: u64,
}

impl File {
    /// The underlying snapshot.
    pub fn node(&self) -> &Node {
        &self.node
    }

    /// Path this handle was opened with (normalized).
    pub fn name(&self) -> &str {
        self.node.path()
    }

    /// Metadata of the opened entry.
    pub fn stat(&self) -> FsResult<Metadata> {
        Ok(self.node.metadata())
    }

    fn bytes(&self) -> FsResult<&[u8]> {
        self.node
            .content()
            .ok_or_else(|| FsError::is_a_directory(self.node.path()))
    }

    fn entries(&self) -> FsResult<&[DirEntry]> {
        self.node
            .children()
            .ok_or_else(|| FsError::not_a_directory(self.node.path()))
    }

    /// Read into `buf` starting at `offset`, without moving the cursor.
    ///
    /// Returns fewer bytes than `buf.len()` when the end is reached, and 0 at
    /// or past the end.
    pub fn read_at(&self, buf: &mut [u8], offset: u64) -> FsResult<usize> {
        let data = self.bytes()?;
        let Ok(start) = usize::try_from(offset) else {
            return Ok(0);
        };
        if start >= data.len() {
            return Ok(0);
        }
        let n = buf.len().min(data.len() - start);
        buf[..n].copy_from_slice(&data[start..start + n]);
        Ok(n)
    }

    /// Directory entries: all of them for `None`, the first `n` for `Some(n)`.
    pub fn readdir(&self, count: Option<usize>) -> FsResult<Vec<DirEntry>> {
        let entries = self.entries()?;
        let n = count.map_or(entries.len(), |n| n.min(entries.len()));
        Ok(entries[..n].to_vec())
    }

    /// Names of the directory entries, in listing order.
    pub fn readdirnames(&self, count: Option<usize>) -> FsResult<Vec<String>> {
        Ok(self
            .readdir(count)?
            .into_iter()
            .map(|entry| entry.name)
            .collect())
    }

    /// Nothing to release; content was fetched at open time.
    pub fn close(self) -> FsResult<()> {
        Ok(())
    }

    /// Nothing to flush.
    pub fn sync(&self) -> FsResult<()> {
        Ok(())
    }

    /// Write at an offset. Always fails with `ReadOnly`.
    pub fn write_at(&mut self, _data: &[u8], _offset: u64) -> FsResult<usize> {
        Err(FsError::ReadOnly)
    }

    /// Write a string. Always fails with `ReadOnly`.
    pub fn write_str(&mut self, _s: &str) -> FsResult<usize> {
        Err(FsError::ReadOnly)
    }

    /// Change the file size. Always fails with `ReadOnly`.
    pub fn truncate(&mut self, _size: u64) -> FsResult<()> {
        Err(FsError::ReadOnly)
    }
}

impl io::Read for File {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.read_at(buf, self.pos)?;
        self.pos += n as u64;
        Ok(n)
    }
}

impl io::Seek for File {
    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        let len = self.bytes()?.len() as i128;
        let target = match pos {
            io::SeekFrom::Start(offset) => offset as i128,
            io::SeekFrom::Current(delta) => self.pos as i128 + delta as i128,
            io::SeekFrom::End(delta) => len + delta as i128,
        };
        if target < 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "invalid seek to a negative position",
            ));
        }
        self.pos = u64::try_from(target)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "seek position overflow"))?;
        Ok(self.pos)
    }
}

impl io::Write for File {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(FsError::ReadOnly.into())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
