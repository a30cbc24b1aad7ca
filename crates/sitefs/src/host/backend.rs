//! Host-bridge backend.
//!
//! Classifies a path with `stat`, then fetches it with `readFile` or
//! `listDir`. Payloads are checked field by field; a host that sends the
//! wrong kind of value gets a protocol error, never a coerced result.

use super::bridge::{HostBridge, HostMethod};
use super::value::{HostValue, ValueKind};
use crate::error::{BridgeError, FsResult};
use crate::node::Node;
use crate::ops::Backend;
use crate::types::{DirEntry, FileType, Metadata};

/// Filesystem backend served by a host object through a [`HostBridge`].
#[derive(Debug, Clone)]
pub struct HostBackend {
    bridge: HostBridge,
}

impl HostBackend {
    /// Serve files through `bridge`.
    pub fn new(bridge: HostBridge) -> Self {
        Self { bridge }
    }

    fn stat_entry(&self, path: &str) -> FsResult<DirEntry> {
        let values = self.bridge.request(HostMethod::Stat, path)?;
        Ok(entry_from_value(first(&values, "stat result")?)?)
    }

    fn read_file(&self, path: &str) -> FsResult<Vec<u8>> {
        let mut values = self.bridge.request(HostMethod::ReadFile, path)?;
        if values.is_empty() {
            return Err(BridgeError::MissingValue("file content").into());
        }
        match values.swap_remove(0) {
            HostValue::Bytes(bytes) => Ok(bytes),
            other => Err(unexpected("file content", ValueKind::Bytes, &other).into()),
        }
    }

    fn list_dir(&self, path: &str) -> FsResult<Vec<DirEntry>> {
        let values = self.bridge.request(HostMethod::ListDir, path)?;
        match first(&values, "directory listing")? {
            HostValue::Array(items) => Ok(items
                .iter()
                .map(entry_from_value)
                .collect::<Result<Vec<_>, _>>()?),
            other => Err(unexpected("directory listing", ValueKind::Array, other).into()),
        }
    }
}

impl Backend for HostBackend {
    fn name(&self) -> &str {
        "host"
    }

    fn open(&self, path: &str) -> FsResult<Node> {
        let entry = self.stat_entry(path)?;
        if entry.kind.is_dir() {
            let children = self.list_dir(path)?;
            tracing::debug!(%path, entries = children.len(), "host directory");
            return Ok(Node::directory(path, children));
        }

        let content = self.read_file(path)?;
        if content.len() as u64 != entry.size {
            tracing::warn!(
                %path,
                declared = entry.size,
                actual = content.len(),
                "host stat size differs from file content"
            );
        }
        tracing::debug!(%path, bytes = content.len(), "host file");
        Ok(Node::file(path, content))
    }

    fn stat(&self, path: &str) -> FsResult<Metadata> {
        Ok(self.stat_entry(path)?.metadata())
    }
}

fn first<'a>(values: &'a [HostValue], what: &'static str) -> Result<&'a HostValue, BridgeError> {
    values.first().ok_or(BridgeError::MissingValue(what))
}

fn unexpected(field: &'static str, expected: ValueKind, found: &HostValue) -> BridgeError {
    BridgeError::UnexpectedKind {
        field,
        expected,
        found: found.kind(),
    }
}

/// Decode `{ name: string, size: number, isDir: truthy }`.
pub(crate) fn entry_from_value(value: &HostValue) -> Result<DirEntry, BridgeError> {
    if value.kind() != ValueKind::Object {
        return Err(unexpected("file info", ValueKind::Object, value));
    }

    let name = match value.get("name") {
        HostValue::String(name) => name.clone(),
        other => return Err(unexpected("name", ValueKind::String, other)),
    };

    let size = match value.get("size") {
        HostValue::Number(n) => size_from_number(*n)?,
        other => return Err(unexpected("size", ValueKind::Number, other)),
    };

    let kind = if value.get("isDir").is_truthy() {
        FileType::Directory
    } else {
        FileType::File
    };

    Ok(DirEntry::new(name, size, kind))
}

fn size_from_number(n: f64) -> Result<u64, BridgeError> {
    if !n.is_finite() || n < 0.0 || n.fract() != 0.0 || n > u64::MAX as f64 {
        return Err(BridgeError::InvalidNumber("size"));
    }
    Ok(n as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_from_value() {
        let entry = entry_from_value(&HostValue::file_info("a.md", 5, false)).unwrap();
        assert_eq!(entry, DirEntry::file("a.md", 5));

        let entry = entry_from_value(&HostValue::file_info("x", 0, true)).unwrap();
        assert!(entry.kind.is_dir());
    }

    #[test]
    fn test_missing_is_dir_means_file() {
        let value = HostValue::object([
            ("name", HostValue::from("a.md")),
            ("size", HostValue::from(5.0)),
        ]);
        assert!(entry_from_value(&value).unwrap().kind.is_file());
    }

    #[test]
    fn test_wrong_kinds_are_rejected() {
        assert_eq!(
            entry_from_value(&HostValue::from("a.md")),
            Err(BridgeError::UnexpectedKind {
                field: "file info",
                expected: ValueKind::Object,
                found: ValueKind::String,
            })
        );

        let value = HostValue::object([
            ("name", HostValue::from(1.0)),
            ("size", HostValue::from(5.0)),
        ]);
        assert!(matches!(
            entry_from_value(&value),
            Err(BridgeError::UnexpectedKind { field: "name", .. })
        ));

        let value = HostValue::object([
            ("name", HostValue::from("a.md")),
            ("size", HostValue::from("5")),
        ]);
        assert!(matches!(
            entry_from_value(&value),
            Err(BridgeError::UnexpectedKind { field: "size", found: ValueKind::String, .. })
        ));
    }

    #[test]
    fn test_bad_sizes() {
        for n in [-1.0, 1.5, f64::NAN, f64::INFINITY] {
            let value = HostValue::object([
                ("name", HostValue::from("a.md")),
                ("size", HostValue::from(n)),
            ]);
            assert_eq!(entry_from_value(&value), Err(BridgeError::InvalidNumber("size")));
        }
    }
}
