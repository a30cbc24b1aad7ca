//! Request loop between callers and the host object.
//!
//! The host object is `!Send` and lives on a single cooperative thread (a
//! `LocalSet`). [`HostBridge`] is the `Send + Sync` handle other threads use
//! to reach it: each request travels over an mpsc channel to the host loop,
//! which calls into the host with a fresh [`Callback`], and the caller blocks
//! on the matching [`PendingRequest`].
//!
//! ```text
//!   HostBridge (Send+Sync)     mpsc      host loop (spawn_local, !Send)
//!   ┌─────────────────────┐  ────────▶  ┌──────────────────────────────┐
//!   │ .request(stat, p)   │             │ host.call("stat", p, cb)     │
//!   │   blocks on slot    │  ◀────────  │ cb fires when host is idle   │
//!   └─────────────────────┘   sync(1)   └──────────────────────────────┘
//! ```

use std::thread::{self, ThreadId};

use strum::{AsRefStr, Display};
use tokio::sync::mpsc;

use super::callback::{Callback, PendingRequest};
use super::value::{HostValue, ValueKind};
use crate::error::{BridgeError, FsError, FsResult};

/// The three calls a host object must provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
pub enum HostMethod {
    #[strum(serialize = "stat")]
    Stat,
    #[strum(serialize = "readFile")]
    ReadFile,
    #[strum(serialize = "listDir")]
    ListDir,
}

impl HostMethod {
    /// Every method, in probe order.
    pub const ALL: [HostMethod; 3] = [HostMethod::Stat, HostMethod::ReadFile, HostMethod::ListDir];
}

/// A host-provided, callback-style content source.
///
/// Duck-typed like a script object: the bridge probes [`member_kind`] once
/// at construction and then dispatches by method name. `call` must not block;
/// the host answers by invoking `callback` exactly once, now or from a later
/// turn of its loop.
///
/// [`member_kind`]: HostObject::member_kind
pub trait HostObject {
    /// Kind of the host value itself. Anything but an object is rejected.
    fn kind(&self) -> ValueKind {
        ValueKind::Object
    }

    /// Kind of a named member; callable members report `Function`.
    fn member_kind(&self, name: &str) -> ValueKind;

    /// Invoke `method(path, callback)`.
    fn call(&self, method: &str, path: &str, callback: Callback);
}

/// Check the host exposes every required call.
pub fn probe(host: &dyn HostObject) -> FsResult<()> {
    if host.kind() != ValueKind::Object {
        return Err(FsError::Unsupported(format!(
            "host backend must be an object, got {}",
            host.kind()
        )));
    }
    for method in HostMethod::ALL {
        let kind = host.member_kind(method.as_ref());
        if kind != ValueKind::Function {
            return Err(FsError::Unsupported(format!(
                "invalid type for {method}: expected function, got {kind}"
            )));
        }
    }
    Ok(())
}

/// Internal request sent from HostBridge → host loop via mpsc.
struct HostCall {
    method: HostMethod,
    path: String,
    callback: Callback,
}

/// Send+Sync handle to a host object running in a LocalSet.
///
/// Can be cloned and shared across threads. Requests block the calling
/// thread, so they must never be issued from the host loop's own thread.
#[derive(Clone)]
pub struct HostBridge {
    tx: mpsc::UnboundedSender<HostCall>,
    host_thread: ThreadId,
}

impl std::fmt::Debug for HostBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostBridge")
            .field("host_thread", &self.host_thread)
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

impl HostBridge {
    /// Probe `host` and start its request loop in the current `LocalSet`.
    ///
    /// # Panics
    ///
    /// Must be called from within a `tokio::task::LocalSet` context, the same
    /// way any `spawn_local` is.
    pub fn spawn_local<H: HostObject + 'static>(host: H) -> FsResult<Self> {
        probe(&host)?;
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::task::spawn_local(run(host, rx));
        Ok(Self {
            tx,
            host_thread: thread::current().id(),
        })
    }

    /// Issue one call and block until its callback fires.
    ///
    /// Returns the success payload (the callback arguments after the error
    /// marker).
    pub fn request(&self, method: HostMethod, path: &str) -> FsResult<Vec<HostValue>> {
        if thread::current().id() == self.host_thread {
            return Err(BridgeError::HostThread.into());
        }

        let (pending, callback) = PendingRequest::new(path);
        self.tx
            .send(HostCall {
                method,
                path: path.to_string(),
                callback,
            })
            .map_err(|_| BridgeError::HostShutdown)?;
        pending.wait()
    }

    /// True once the host loop has stopped accepting requests.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Dispatch requests until every handle is dropped.
///
/// The loop only hands calls to the host; callbacks fire whenever the host
/// gets to them, interleaved with later requests.
async fn run<H: HostObject>(host: H, mut rx: mpsc::UnboundedReceiver<HostCall>) {
    while let Some(call) = rx.recv().await {
        tracing::trace!(method = %call.method, path = %call.path, "host call");
        host.call(call.method.as_ref(), &call.path, call.callback);
    }
    tracing::debug!("host loop shutting down: channel closed");
}
