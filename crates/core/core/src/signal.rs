//! Cancellation primitives for asynchronous acquisition calls.
//!
//! `AbortController` and `AbortSignal` mirror the platform abort controller:
//! the controller is held by whoever may cancel, the signal travels with the
//! asynchronous call.

use std::sync::Arc;
use tokio::sync::watch;

/// The cancelling side of an abort pair.
#[derive(Debug, Clone)]
pub struct AbortController {
    tx: Arc<watch::Sender<bool>>,
}

impl AbortController {
    /// Creates a controller that has not fired.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Returns a signal observing this controller.
    pub fn signal(&self) -> AbortSignal {
        AbortSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Fires the controller. Returns false if it had already fired.
    pub fn abort(&self) -> bool {
        self.tx.send_if_modified(|aborted| {
            if *aborted {
                false
            } else {
                *aborted = true;
                true
            }
        })
    }

    /// Returns true once the controller has fired.
    pub fn is_aborted(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for AbortController {
    fn default() -> Self {
        Self::new()
    }
}

/// The observing side of an abort pair.
#[derive(Debug, Clone)]
pub struct AbortSignal {
    rx: watch::Receiver<bool>,
}

impl AbortSignal {
    /// A signal that never fires.
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { rx }
    }

    /// Returns true once the controller has fired.
    pub fn is_aborted(&self) -> bool {
        *self.rx.borrow()
    }

    /// Completes when the controller fires.
    ///
    /// If the controller is dropped without firing, this never completes.
    pub async fn aborted(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|aborted| *aborted).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
