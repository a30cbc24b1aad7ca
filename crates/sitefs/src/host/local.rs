//! Host object serving a local directory.
//!
//! Behaves like a cooperative host should: `call` only schedules work, and
//! the callback fires from a later task on the host loop. Paths are confined
//! to the root; attempts to escape it are refused.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::bridge::{HostMethod, HostObject};
use super::callback::Callback;
use super::value::{HostValue, ValueKind};
use crate::path;

/// Serves `stat`/`readFile`/`listDir` from a directory on disk.
#[derive(Debug, Clone)]
pub struct LocalDirHost {
    root: PathBuf,
}

impl LocalDirHost {
    /// Serve the directory at `root`.
    ///
    /// The root is canonicalized here so symlinked roots (e.g. macOS `/tmp`)
    /// still pass the containment check.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root: PathBuf = root.into();
        let root = root.canonicalize().unwrap_or(root);
        Self { root }
    }

    /// Get the root path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn answer(&self, method: &str, rel: &str) -> Result<HostValue, HostValue> {
        let rel = path::normalize(rel);
        let full = self.resolve(&rel)?;
        match method {
            m if m == HostMethod::Stat.as_ref() => {
                let meta = fs::metadata(&full).map_err(io_error)?;
                let size = if meta.is_dir() { 0 } else { meta.len() };
                Ok(HostValue::file_info(path::base_name(&rel), size, meta.is_dir()))
            }
            m if m == HostMethod::ReadFile.as_ref() => {
                fs::read(&full).map(HostValue::Bytes).map_err(io_error)
            }
            m if m == HostMethod::ListDir.as_ref() => {
                let mut entries = Vec::new();
                for entry in fs::read_dir(&full).map_err(io_error)? {
                    let entry = entry.map_err(io_error)?;
                    let meta = entry.metadata().map_err(io_error)?;
                    let size = if meta.is_dir() { 0 } else { meta.len() };
                    entries.push((
                        entry.file_name().to_string_lossy().into_owned(),
                        size,
                        meta.is_dir(),
                    ));
                }
                entries.sort_by(|a, b| a.0.cmp(&b.0));
                Ok(HostValue::Array(
                    entries
                        .into_iter()
                        .map(|(name, size, is_dir)| HostValue::file_info(name, size, is_dir))
                        .collect(),
                ))
            }
            other => Err(HostValue::from(format!("unknown method: {other}"))),
        }
    }

    /// Resolve a root-relative path, refusing anything outside the root.
    fn resolve(&self, rel: &str) -> Result<PathBuf, HostValue> {
        let full = if rel.is_empty() {
            self.root.clone()
        } else {
            self.root.join(rel)
        };
        let canonical = full.canonicalize().map_err(io_error)?;
        if !canonical.starts_with(&self.root) {
            return Err(error_object("EACCES", &format!("{rel} escapes the root")));
        }
        Ok(canonical)
    }
}

impl HostObject for LocalDirHost {
    fn member_kind(&self, name: &str) -> ValueKind {
        if HostMethod::ALL.iter().any(|m| m.as_ref() == name) {
            ValueKind::Function
        } else {
            ValueKind::Undefined
        }
    }

    fn call(&self, method: &str, path: &str, callback: Callback) {
        let host = self.clone();
        let method = method.to_string();
        let path = path.to_string();
        tokio::task::spawn_local(async move {
            // Answer on a later turn of the loop, not inside `call`.
            tokio::task::yield_now().await;
            let result = match host.answer(&method, &path) {
                Ok(value) => callback.resolve(vec![value]),
                Err(err) => callback.reject(err),
            };
            if let Err(e) = result {
                tracing::warn!(%method, %path, "callback rejected: {e}");
            }
        });
    }
}

fn error_object(code: &str, message: &str) -> HostValue {
    HostValue::object([
        ("code", HostValue::from(code)),
        ("message", HostValue::from(message)),
    ])
}

fn io_error(e: io::Error) -> HostValue {
    let code = match e.kind() {
        io::ErrorKind::NotFound => "ENOENT",
        io::ErrorKind::PermissionDenied => "EACCES",
        io::ErrorKind::NotADirectory => "ENOTDIR",
        io::ErrorKind::IsADirectory => "EISDIR",
        _ => "EIO",
    };
    error_object(code, &e.to_string())
}
