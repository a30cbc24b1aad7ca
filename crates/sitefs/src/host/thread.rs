//! Dedicated host loop thread.
//!
//! Runs a current-thread tokio runtime driving a `LocalSet`, so `!Send` host
//! objects can be built and served there while the rest of the program calls
//! in through a [`HostBridge`].

use std::sync::mpsc as std_mpsc;
use std::thread::{self, JoinHandle};

use tokio::sync::oneshot;

use super::bridge::{HostBridge, HostObject};
use crate::error::{BridgeError, FsError, FsResult};

/// Owns the host loop thread. Dropping it stops the loop.
///
/// Requests still waiting when the loop stops fail with `CallbackDropped`;
/// later requests fail with `HostShutdown`.
#[derive(Debug)]
pub struct HostThread {
    bridge: HostBridge,
    stop: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl HostThread {
    /// Start the loop thread, build the host on it, probe it and start
    /// serving requests.
    pub fn spawn<H, F>(make_host: F) -> FsResult<Self>
    where
        H: HostObject + 'static,
        F: FnOnce() -> H + Send + 'static,
    {
        let (ready_tx, ready_rx) = std_mpsc::channel::<FsResult<HostBridge>>();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        let handle = thread::Builder::new()
            .name("sitefs-host".to_string())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        let _ = ready_tx.send(Err(FsError::Io(e)));
                        return;
                    }
                };
                let local = tokio::task::LocalSet::new();
                local.block_on(&runtime, async move {
                    let bridge = HostBridge::spawn_local(make_host());
                    let serving = bridge.is_ok();
                    let _ = ready_tx.send(bridge);
                    if serving {
                        // Either an explicit stop or the HostThread being dropped.
                        let _ = stop_rx.await;
                    }
                });
                tracing::debug!("host thread exiting");
            })?;

        let bridge = ready_rx
            .recv()
            .map_err(|_| FsError::Bridge(BridgeError::HostShutdown))??;

        Ok(Self {
            bridge,
            stop: Some(stop_tx),
            handle: Some(handle),
        })
    }

    /// A handle for issuing requests from any thread but the host's.
    pub fn bridge(&self) -> HostBridge {
        self.bridge.clone()
    }

    /// Stop the loop and wait for the thread to finish.
    pub fn shutdown(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("host thread panicked");
            }
        }
    }
}

impl Drop for HostThread {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}
