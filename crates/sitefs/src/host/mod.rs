//! Host-bridge backend.
//!
//! Content comes from a host object exposing `stat`, `readFile` and
//! `listDir`, each of which answers through a callback on the host's own
//! cooperative loop. The bridge turns each call into a blocking request for
//! filesystem callers on other threads.

mod backend;
mod bridge;
mod callback;
mod local;
mod thread;
mod value;

pub use backend::HostBackend;
pub use bridge::{HostBridge, HostMethod, HostObject, probe};
pub use callback::{Callback, PendingRequest};
pub use local::LocalDirHost;
pub use thread::HostThread;
pub use value::{HostValue, ValueKind};
