//! Credential source double resolved by the test or simulator.

use async_trait::async_trait;
use otp_autofill_core::error::{AutofillError, AutofillResult};
use otp_autofill_core::signal::AbortSignal;
use otp_autofill_core::traits::CredentialSource;
use otp_autofill_core::types::Transport;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

#[derive(Debug)]
struct CredentialInner {
    supported: bool,
    outcome: Option<AutofillResult<String>>,
    delay: Option<Duration>,
    requests: usize,
    aborted: usize,
    last_transports: Vec<Transport>,
}

impl Default for CredentialInner {
    fn default() -> Self {
        Self {
            supported: true,
            outcome: None,
            delay: None,
            requests: 0,
            aborted: 0,
            last_transports: Vec::new(),
        }
    }
}

/// A credential source whose requests stay pending until `deliver` or
/// `fail` is called.
///
/// An outcome set before the request arrives is handed to the next
/// request. Requests honour their abort signal.
#[derive(Debug, Clone, Default)]
pub struct ScriptedCredentialSource {
    inner: Arc<Mutex<CredentialInner>>,
    ready: Arc<Notify>,
}

impl ScriptedCredentialSource {
    /// Creates a supported source with no outcome yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source the platform does not support.
    pub fn unsupported() -> Self {
        let source = Self::new();
        source.inner.lock().supported = false;
        source
    }

    /// Delays every outcome by `delay` after the request is made.
    pub fn with_delay(self, delay: Duration) -> Self {
        self.inner.lock().delay = Some(delay);
        self
    }

    /// Resolves the pending (or next) request with `code`.
    pub fn deliver(&self, code: impl Into<String>) {
        self.inner.lock().outcome = Some(Ok(code.into()));
        self.ready.notify_one();
    }

    /// Rejects the pending (or next) request with `error`.
    pub fn fail(&self, error: AutofillError) {
        self.inner.lock().outcome = Some(Err(error));
        self.ready.notify_one();
    }

    /// Returns the number of requests made.
    pub fn request_count(&self) -> usize {
        self.inner.lock().requests
    }

    /// Returns the number of requests ended by their abort signal.
    pub fn aborted_count(&self) -> usize {
        self.inner.lock().aborted
    }

    /// Returns the transports of the last request.
    pub fn last_transports(&self) -> Vec<Transport> {
        self.inner.lock().last_transports.clone()
    }

    fn take_outcome(&self) -> Option<AutofillResult<String>> {
        self.inner.lock().outcome.take()
    }

    fn record_abort(&self) -> AutofillError {
        self.inner.lock().aborted += 1;
        AutofillError::Aborted
    }
}

#[async_trait]
impl CredentialSource for ScriptedCredentialSource {
    fn is_supported(&self) -> bool {
        self.inner.lock().supported
    }

    async fn get(&self, transports: &[Transport], signal: AbortSignal) -> AutofillResult<String> {
        let delay = {
            let mut inner = self.inner.lock();
            if !inner.supported {
                return Err(AutofillError::unsupported("OTPCredential"));
            }
            inner.requests += 1;
            inner.last_transports = transports.to_vec();
            inner.delay
        };

        if signal.is_aborted() {
            return Err(self.record_abort());
        }

        if let Some(delay) = delay {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = signal.aborted() => return Err(self.record_abort()),
            }
        }

        loop {
            if let Some(outcome) = self.take_outcome() {
                return outcome;
            }
            tokio::select! {
                _ = self.ready.notified() => {}
                _ = signal.aborted() => return Err(self.record_abort()),
            }
        }
    }
}
