//! Callback bridge: one host callback, one synchronous result.
//!
//! ```text
//!   caller thread                         host loop thread
//!   ┌──────────────────────┐  HostCall   ┌──────────────────────────┐
//!   │ PendingRequest::wait │ ──────────▶ │ host.call(.., Callback)  │
//!   │   (blocks)           │             │   ... later ...          │
//!   │                      │ ◀────────── │ callback.invoke(args)    │
//!   └──────────────────────┘  sync(1)    └──────────────────────────┘
//! ```
//!
//! Each request gets its own pair; pairs are never reused. The slot is taken
//! on the first invocation, so a second invocation cannot reach the caller.

use std::sync::Arc;
use std::sync::mpsc::{Receiver, SyncSender, TrySendError, sync_channel};

use parking_lot::Mutex;

use super::value::HostValue;
use crate::error::{BridgeError, FsError, FsResult};

type Outcome = FsResult<Vec<HostValue>>;

/// The callback handed to the host for one request.
///
/// Clones share the same single slot.
#[derive(Clone)]
pub struct Callback {
    path: Arc<str>,
    slot: Arc<Mutex<Option<SyncSender<Outcome>>>>,
}

impl std::fmt::Debug for Callback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callback")
            .field("path", &self.path)
            .field("invoked", &self.slot.lock().is_none())
            .finish()
    }
}

impl Callback {
    /// Deliver the host's answer: `(error | null, ...values)`.
    ///
    /// Never blocks. Returns `AlreadyInvoked` on every call after the first;
    /// the waiting caller only ever sees the first result.
    pub fn invoke(&self, args: Vec<HostValue>) -> Result<(), BridgeError> {
        let Some(tx) = self.slot.lock().take() else {
            tracing::warn!(path = %self.path, "host invoked callback more than once");
            return Err(BridgeError::AlreadyInvoked);
        };
        match tx.try_send(interpret(&self.path, args)) {
            // Disconnected: the caller is gone, nobody left to tell.
            Ok(()) | Err(TrySendError::Disconnected(_)) => Ok(()),
            // Capacity is one and the sender was just taken out of the slot.
            Err(TrySendError::Full(_)) => Err(BridgeError::AlreadyInvoked),
        }
    }

    /// Shorthand for `invoke([null, ...values])`.
    pub fn resolve(&self, values: Vec<HostValue>) -> Result<(), BridgeError> {
        let mut args = Vec::with_capacity(values.len() + 1);
        args.push(HostValue::Null);
        args.extend(values);
        self.invoke(args)
    }

    /// Shorthand for `invoke([error])`.
    pub fn reject(&self, error: impl Into<HostValue>) -> Result<(), BridgeError> {
        self.invoke(vec![error.into()])
    }

    /// True once the callback has fired.
    pub fn is_spent(&self) -> bool {
        self.slot.lock().is_none()
    }
}

/// One in-flight host request awaiting its callback.
#[derive(Debug)]
pub struct PendingRequest {
    rx: Receiver<Outcome>,
}

impl PendingRequest {
    /// Create the result slot and the callback that fills it.
    pub fn new(path: &str) -> (Self, Callback) {
        let (tx, rx) = sync_channel(1);
        let callback = Callback {
            path: Arc::from(path),
            slot: Arc::new(Mutex::new(Some(tx))),
        };
        (Self { rx }, callback)
    }

    /// Block until the callback fires.
    ///
    /// There is no timeout. If every copy of the callback is dropped without
    /// firing, the request fails with `CallbackDropped`.
    pub fn wait(self) -> Outcome {
        self.rx
            .recv()
            .unwrap_or_else(|_| Err(FsError::Bridge(BridgeError::CallbackDropped)))
    }
}

/// Apply the calling convention to the raw callback arguments.
fn interpret(path: &str, mut args: Vec<HostValue>) -> Outcome {
    if args.is_empty() {
        return Err(BridgeError::TooFewArguments.into());
    }
    let values = args.split_off(1);
    match args.pop() {
        Some(HostValue::Null) => Ok(values),
        Some(HostValue::String(msg)) if msg.is_empty() => Ok(values),
        Some(HostValue::String(msg)) => Err(FsError::Host(msg)),
        Some(err @ HostValue::Object(_)) => Err(host_error(path, &err)),
        Some(other) => Err(BridgeError::InvalidErrorKind(other.kind()).into()),
        None => Err(BridgeError::TooFewArguments.into()),
    }
}

/// Error objects carry an optional `code` and `message`. `ENOENT` is the one
/// code the filesystem cares about.
fn host_error(path: &str, err: &HostValue) -> FsError {
    let code = err.get("code").as_str();
    if code == Some("ENOENT") {
        return FsError::not_found(path);
    }
    let message = err
        .get("message")
        .as_str()
        .or(code)
        .unwrap_or("unknown host error");
    match code {
        Some(code) if code != message => FsError::Host(format!("{code}: {message}")),
        _ => FsError::Host(message.to_string()),
    }
}
