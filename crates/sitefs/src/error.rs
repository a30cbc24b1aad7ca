//! Filesystem error types.

use std::io;
use thiserror::Error;

use crate::host::ValueKind;

/// Filesystem error type.
#[derive(Debug, Error)]
pub enum FsError {
    /// File or directory not found in the backend.
    #[error("not found: {0}")]
    NotFound(String),

    /// Filesystem is read-only.
    #[error("operation not supported: filesystem is read-only")]
    ReadOnly,

    /// Byte operation on a directory handle.
    #[error("is a directory: {0}")]
    IsADirectory(String),

    /// Listing operation on a file handle.
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// The host broke the callback contract, or the bridge could not deliver.
    #[error("host bridge: {0}")]
    Bridge(#[from] BridgeError),

    /// Network, status or decoding failure from the remote content API.
    #[error("transport error: {0}")]
    Transport(String),

    /// Error reported by the host object.
    #[error("host error: {0}")]
    Host(String),

    /// Backend does not provide a required capability.
    #[error("backend unsupported: {0}")]
    Unsupported(String),

    /// Invalid path.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl FsError {
    /// Create a NotFound error.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    /// Create an IsADirectory error.
    pub fn is_a_directory(path: impl Into<String>) -> Self {
        Self::IsADirectory(path.into())
    }

    /// Create a NotADirectory error.
    pub fn not_a_directory(path: impl Into<String>) -> Self {
        Self::NotADirectory(path.into())
    }

    /// Create a Transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// True if the entry does not exist in the backend.
    ///
    /// Overlay layers probe for this to fall through to a writable layer.
    pub fn is_not_found(&self) -> bool {
        match self {
            FsError::NotFound(_) => true,
            FsError::Io(e) => e.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// True for write-side rejections.
    pub fn is_read_only(&self) -> bool {
        matches!(self, FsError::ReadOnly)
    }
}

/// Violations of the host callback protocol and delivery failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// Callback invoked without arguments.
    #[error("too few arguments")]
    TooFewArguments,

    /// First callback argument was neither null, a string, nor an error object.
    #[error("invalid error type: {0}")]
    InvalidErrorKind(ValueKind),

    /// Success payload lacked a value the operation needs.
    #[error("missing result value: {0}")]
    MissingValue(&'static str),

    /// A payload field had the wrong value kind.
    #[error("invalid type for {field}: expected {expected}, got {found}")]
    UnexpectedKind {
        field: &'static str,
        expected: ValueKind,
        found: ValueKind,
    },

    /// A numeric field was out of range (negative, fractional, not finite).
    #[error("invalid value for {0}")]
    InvalidNumber(&'static str),

    /// Callback invoked more than once. Reported to the host, never the caller.
    #[error("callback already invoked")]
    AlreadyInvoked,

    /// The host dropped the callback without invoking it.
    #[error("callback dropped without a result")]
    CallbackDropped,

    /// The host loop has stopped.
    #[error("host loop shut down")]
    HostShutdown,

    /// Blocking request issued from the host's own loop thread.
    #[error("cannot wait for a host callback on the host thread")]
    HostThread,
}

/// Convert FsError to std::io::Error for the std I/O traits.
impl From<FsError> for io::Error {
    fn from(e: FsError) -> Self {
        match e {
            FsError::NotFound(msg) => io::Error::new(io::ErrorKind::NotFound, msg),
            FsError::ReadOnly => io::Error::new(
                io::ErrorKind::PermissionDenied,
                "filesystem is read-only",
            ),
            FsError::IsADirectory(msg) => io::Error::new(io::ErrorKind::IsADirectory, msg),
            FsError::NotADirectory(msg) => io::Error::new(io::ErrorKind::NotADirectory, msg),
            FsError::Bridge(e) => io::Error::other(e),
            FsError::Transport(msg) => io::Error::other(msg),
            FsError::Host(msg) => io::Error::other(msg),
            FsError::Unsupported(msg) => io::Error::new(io::ErrorKind::Unsupported, msg),
            FsError::InvalidPath(msg) => io::Error::new(io::ErrorKind::InvalidInput, msg),
            FsError::InvalidConfig(msg) => io::Error::new(io::ErrorKind::InvalidInput, msg),
            FsError::Io(e) => e,
        }
    }
}

/// Filesystem result type.
pub type FsResult<T> = Result<T, FsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_distinguishable() {
        assert!(FsError::not_found("a.md").is_not_found());
        assert!(!FsError::transport("connection reset").is_not_found());
        assert!(!FsError::Host("ENOENT-ish".into()).is_not_found());

        let io_err: io::Error = FsError::not_found("a.md").into();
        assert_eq!(io_err.kind(), io::ErrorKind::NotFound);
        assert!(FsError::Io(io_err).is_not_found());
    }

    #[test]
    fn test_io_kinds() {
        let e: io::Error = FsError::ReadOnly.into();
        assert_eq!(e.kind(), io::ErrorKind::PermissionDenied);

        let e: io::Error = FsError::is_a_directory("content").into();
        assert_eq!(e.kind(), io::ErrorKind::IsADirectory);

        let e: io::Error = FsError::not_a_directory("a.md").into();
        assert_eq!(e.kind(), io::ErrorKind::NotADirectory);

        let e: io::Error = FsError::from(BridgeError::TooFewArguments).into();
        assert_eq!(e.kind(), io::ErrorKind::Other);
    }

    #[test]
    fn test_bridge_error_display() {
        let e = BridgeError::UnexpectedKind {
            field: "size",
            expected: ValueKind::Number,
            found: ValueKind::String,
        };
        assert_eq!(e.to_string(), "invalid type for size: expected number, got string");
    }
}
