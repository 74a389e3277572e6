//! The OTP acquisition coordinator.

use otp_autofill_core::config::CoordinatorConfig;
use otp_autofill_core::error::{AutofillError, AutofillResult};
use otp_autofill_core::signal::AbortController;
use otp_autofill_core::traits::Collaborators;
use otp_autofill_core::types::{
    AcceptedCode, CandidateCode, ChannelKind, CoordinatorState, UserNotice, Visibility,
};
use otp_autofill_events::{autofill_events, EventBus};
use otp_autofill_otp_utils::extract_code;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch, Mutex};
use tokio::task::JoinHandle;

use crate::arbiter::{Arbiter, Arbitration, ChannelMessage};
use crate::context::CoordinatorContext;
use crate::{poll, push};

const CHANNEL_CAPACITY: usize = 32;

/// Handles of one running pass.
struct Running {
    shutdown: AbortController,
    push: AbortController,
    sender: mpsc::Sender<ChannelMessage>,
    tasks: Vec<JoinHandle<()>>,
}

/// Reconciles the push and poll channels into exactly one form update.
///
/// One coordinator corresponds to one page lifetime: the accepted code is
/// set at most once and the form is submitted at most once, across any
/// number of `start`/`stop` passes.
pub struct Coordinator {
    ctx: Arc<CoordinatorContext>,
    visibility: watch::Sender<Visibility>,
    running: Mutex<Option<Running>>,
}

impl Coordinator {
    /// Creates a coordinator without an event bus.
    pub fn new(collaborators: Collaborators, config: CoordinatorConfig) -> AutofillResult<Self> {
        Self::build(collaborators, config, None)
    }

    /// Creates a coordinator publishing to `events`.
    pub fn with_events(
        collaborators: Collaborators,
        config: CoordinatorConfig,
        events: Arc<EventBus>,
    ) -> AutofillResult<Self> {
        Self::build(collaborators, config, Some(events))
    }

    fn build(
        collaborators: Collaborators,
        config: CoordinatorConfig,
        events: Option<Arc<EventBus>>,
    ) -> AutofillResult<Self> {
        config.validate()?;
        let (visibility, _) = watch::channel(Visibility::Visible);

        Ok(Self {
            ctx: Arc::new(CoordinatorContext::new(collaborators, config, events)),
            visibility,
            running: Mutex::new(None),
        })
    }

    /// Gets the configuration.
    pub fn config(&self) -> &CoordinatorConfig {
        &self.ctx.config
    }

    /// Gets the attached event bus.
    pub fn events(&self) -> Option<&Arc<EventBus>> {
        self.ctx.events()
    }

    /// Starts a pass: clears the clipboard, then runs the push and poll
    /// channels until `stop`.
    ///
    /// Does nothing beyond the clipboard clear once the flow has settled,
    /// and nothing at all while already running.
    pub async fn start(&self) {
        let mut running = self.running.lock().await;
        if running.is_some() {
            tracing::debug!("coordinator already running");
            return;
        }

        self.ctx.clear_clipboard("start").await;

        if self.ctx.config.restore_from_cache {
            self.restore_from_cache().await;
        }

        let settled = self.ctx.state.borrow().is_settled();
        if settled {
            tracing::info!("flow already settled, channels stay idle");
            return;
        }

        let collaborators = &self.ctx.collaborators;
        if !collaborators.form.has_input() {
            tracing::warn!("no OTP input on the page, channels not started");
            if let Some(notice) = UserNotice::from_error(&AutofillError::NoInputTarget) {
                self.ctx.show_notice(notice).await;
            }
            return;
        }

        let (sender, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let shutdown = AbortController::new();
        let push_abort = AbortController::new();
        let mut tasks = Vec::with_capacity(3);

        let arbiter = Arbiter::new(self.ctx.clone(), push_abort.clone(), shutdown.signal());
        tasks.push(tokio::spawn(arbiter.run(rx)));

        if collaborators.credentials.is_supported() {
            tasks.push(tokio::spawn(push::run(
                self.ctx.clone(),
                sender.clone(),
                self.visibility.subscribe(),
                push_abort.signal(),
            )));
        } else {
            self.channel_unavailable(ChannelKind::Push, "credential retrieval unsupported")
                .await;
        }

        if collaborators.clipboard.is_readable() {
            tasks.push(tokio::spawn(poll::run(
                self.ctx.clone(),
                sender.clone(),
                self.visibility.subscribe(),
                shutdown.signal(),
            )));
        } else {
            self.channel_unavailable(ChannelKind::Clipboard, "clipboard reads unsupported")
                .await;
        }

        self.ctx.state.send_modify(|state| state.running = true);
        tracing::info!(
            poll_interval_ms = self.ctx.config.poll_interval_ms,
            "coordinator started"
        );

        *running = Some(Running {
            shutdown,
            push: push_abort,
            sender,
            tasks,
        });
    }

    /// Stops the pass: cancels the credential request and the poll timer,
    /// then clears the clipboard. Safe to call repeatedly.
    pub async fn stop(&self) {
        let running = self.running.lock().await.take();

        if let Some(running) = running {
            // Channels go quiet before any event handler runs.
            running.shutdown.abort();
            let cancelled = running.push.abort();
            drop(running.sender);

            if cancelled {
                self.ctx
                    .publish(autofill_events::PUSH_CANCELLED, json!({ "reason": "stop" }))
                    .await;
            }

            for task in running.tasks {
                if let Err(error) = task.await {
                    if error.is_panic() {
                        tracing::error!("channel task panicked: {}", error);
                    }
                }
            }

            self.ctx.state.send_modify(|state| {
                state.running = false;
                state.polling_active = false;
                state.push_pending = false;
            });
            tracing::info!("coordinator stopped");
        }

        self.ctx.clear_clipboard("stop").await;
    }

    /// Offers a candidate to arbitration.
    ///
    /// Channels call this indirectly; hosts may call it for codes obtained
    /// elsewhere. Returns `Arbitration::Inactive` while stopped.
    pub async fn on_candidate(&self, candidate: CandidateCode) -> Arbitration {
        let sender = match self.running.lock().await.as_ref() {
            Some(running) => running.sender.clone(),
            None => {
                tracing::debug!(source = %candidate.source, "coordinator stopped, ignoring candidate");
                return Arbitration::Inactive;
            }
        };

        let (reply, outcome) = oneshot::channel();
        let message = ChannelMessage::Candidate {
            candidate,
            reply: Some(reply),
        };
        if sender.send(message).await.is_err() {
            return Arbitration::Inactive;
        }

        outcome.await.unwrap_or(Arbitration::Inactive)
    }

    /// Offers the code found in a cross-window message.
    pub async fn offer_message(&self, text: &str) -> Arbitration {
        match extract_code(text, &self.ctx.format) {
            Some(code) => {
                self.on_candidate(CandidateCode::new(code, ChannelKind::Message))
                    .await
            }
            None => {
                tracing::debug!(length = text.len(), "message carries no code");
                Arbitration::Rejected(AutofillError::invalid_format(text))
            }
        }
    }

    /// Reports a page visibility change.
    pub fn set_visibility(&self, visibility: Visibility) {
        let changed = self.visibility.send_if_modified(|current| {
            if *current == visibility {
                false
            } else {
                *current = visibility;
                true
            }
        });
        if changed {
            tracing::debug!(?visibility, "page visibility changed");
        }
    }

    /// Reports that the form was submitted by another path.
    ///
    /// Cancels the credential request; no later candidate will submit.
    pub async fn notify_form_submitted(&self) {
        let first = self.ctx.state.send_if_modified(|state| {
            if state.completed {
                false
            } else {
                state.completed = true;
                true
            }
        });
        if first {
            tracing::info!("form submitted by the page");
            self.ctx
                .publish(autofill_events::FORM_SUBMITTED_EXTERNALLY, json!({}))
                .await;
        }

        let push = self
            .running
            .lock()
            .await
            .as_ref()
            .map(|running| running.push.clone());
        if let Some(push) = push {
            if push.abort() {
                self.ctx
                    .publish(
                        autofill_events::PUSH_CANCELLED,
                        json!({ "reason": "form_submitted" }),
                    )
                    .await;
            }
        }
    }

    /// Returns a snapshot of the coordinator state.
    pub fn state(&self) -> CoordinatorState {
        self.ctx.snapshot()
    }

    /// Returns the accepted code, if any.
    pub fn accepted(&self) -> Option<AcceptedCode> {
        self.ctx.state.borrow().accepted.clone()
    }

    /// Waits until a code is accepted.
    pub async fn wait_for_acceptance(&self) -> AcceptedCode {
        let mut rx = self.ctx.state.subscribe();
        if let Ok(state) = rx.wait_for(|state| state.accepted.is_some()).await {
            if let Some(accepted) = state.accepted.clone() {
                return accepted;
            }
        }
        std::future::pending().await
    }

    /// Returns the code stored in the session cache.
    pub fn cached_code(&self) -> Option<String> {
        self.ctx.collaborators.cache.get(&self.ctx.config.cache_key)
    }

    async fn restore_from_cache(&self) {
        let Some(cached) = self.cached_code() else {
            return;
        };
        let Ok(code) = self.ctx.format.normalize(&cached) else {
            tracing::debug!("cached value is not a code, ignoring");
            return;
        };

        let restored = AcceptedCode::new(code, ChannelKind::Cache);
        let changed = self.ctx.state.send_if_modified(|state| {
            if state.is_settled() {
                false
            } else {
                state.accepted = Some(restored.clone());
                true
            }
        });
        if changed {
            tracing::info!(digits = restored.value.len(), "accepted code restored from cache");
            self.ctx
                .publish(
                    autofill_events::CODE_ACCEPTED,
                    json!({ "source": ChannelKind::Cache, "digits": restored.value.len() }),
                )
                .await;
        }
    }

    async fn channel_unavailable(&self, channel: ChannelKind, reason: &'static str) {
        tracing::info!(%channel, reason, "channel unavailable");
        self.ctx
            .publish(
                autofill_events::CHANNEL_UNAVAILABLE,
                json!({ "channel": channel, "reason": reason }),
            )
            .await;
    }
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("config", &self.ctx.config)
            .field("state", &self.ctx.snapshot())
            .finish()
    }
}
