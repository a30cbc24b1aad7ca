//! Core filesystem types.
//!
//! Shared by both backends and by the handles they produce.

use serde::{Deserialize, Serialize};

/// File type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileType {
    /// Regular file.
    File,
    /// Directory.
    Directory,
}

impl FileType {
    /// Returns true if this is a regular file.
    pub fn is_file(&self) -> bool {
        matches!(self, FileType::File)
    }

    /// Returns true if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, FileType::Directory)
    }
}

/// Metadata about a file or directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Base name of the entry.
    pub name: String,
    /// Size in bytes (0 for directories).
    pub size: u64,
    /// Entry type.
    pub kind: FileType,
}

impl Metadata {
    /// Metadata for a file.
    pub fn file(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            kind: FileType::File,
        }
    }

    /// Metadata for a directory.
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: 0,
            kind: FileType::Directory,
        }
    }

    /// Returns true if this is a regular file.
    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }

    /// Returns true if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }

    /// Unix permission bits. Everything is readable, nothing is writable.
    pub fn perm(&self) -> u32 {
        match self.kind {
            FileType::File => 0o444,
            FileType::Directory => 0o555,
        }
    }
}

/// Directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    /// Entry name (not full path).
    pub name: String,
    /// Size in bytes as reported by the backend.
    pub size: u64,
    /// Entry type.
    pub kind: FileType,
}

impl DirEntry {
    /// Create a new directory entry.
    pub fn new(name: impl Into<String>, size: u64, kind: FileType) -> Self {
        Self {
            name: name.into(),
            size,
            kind,
        }
    }

    /// Create a file entry.
    pub fn file(name: impl Into<String>, size: u64) -> Self {
        Self::new(name, size, FileType::File)
    }

    /// Create a directory entry.
    pub fn directory(name: impl Into<String>) -> Self {
        Self::new(name, 0, FileType::Directory)
    }

    /// Project the entry as metadata.
    pub fn metadata(&self) -> Metadata {
        Metadata {
            name: self.name.clone(),
            size: self.size,
            kind: self.kind,
        }
    }
}

/// Open file flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenFlags {
    /// Read access requested.
    pub read: bool,
    /// Write access requested.
    pub write: bool,
    /// Append mode.
    pub append: bool,
    /// Create if not exists.
    pub create: bool,
    /// Truncate on open.
    pub truncate: bool,
    /// Exclusive create (fail if exists).
    pub exclusive: bool,
}

impl Default for OpenFlags {
    fn default() -> Self {
        Self {
            read: true,
            write: false,
            append: false,
            create: false,
            truncate: false,
            exclusive: false,
        }
    }
}

impl OpenFlags {
    /// Read-only access.
    pub fn read() -> Self {
        Self::default()
    }

    /// Write access (also enables read).
    pub fn write() -> Self {
        Self {
            write: true,
            ..Default::default()
        }
    }

    /// Append to the end of the file.
    pub fn append() -> Self {
        Self {
            write: true,
            append: true,
            ..Default::default()
        }
    }

    /// Create with write access.
    pub fn create() -> Self {
        Self {
            write: true,
            create: true,
            ..Default::default()
        }
    }

    /// Create and truncate.
    pub fn create_truncate() -> Self {
        Self {
            write: true,
            create: true,
            truncate: true,
            ..Default::default()
        }
    }

    /// True if any flag asks for mutation.
    pub fn wants_write(&self) -> bool {
        self.write || self.append || self.create || self.truncate || self.exclusive
    }
}
