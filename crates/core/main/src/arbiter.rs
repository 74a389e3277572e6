//! Arbitration between the acquisition channels.
//!
//! Every channel sends its results into one arbiter task. The arbiter is
//! the only place that sets the accepted code, and it does so with a single
//! check-and-set on the coordinator state, so the first valid candidate
//! wins no matter which channel produced it.

use otp_autofill_core::error::AutofillError;
use otp_autofill_core::signal::{AbortController, AbortSignal};
use otp_autofill_core::types::{AcceptedCode, CandidateCode, ChannelKind, UserNotice};
use otp_autofill_events::autofill_events;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

use crate::context::CoordinatorContext;

/// Outcome of offering one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arbitration {
    /// The candidate won and was committed to the form.
    Accepted(AcceptedCode),
    /// The candidate failed validation.
    Rejected(AutofillError),
    /// A code was already accepted or the form was already submitted.
    Discarded,
    /// The coordinator is not running.
    Inactive,
}

impl Arbitration {
    /// Returns the accepted code, if the candidate won.
    pub fn accepted(&self) -> Option<&AcceptedCode> {
        match self {
            Arbitration::Accepted(code) => Some(code),
            _ => None,
        }
    }
}

/// A message from a channel to the arbiter.
pub(crate) enum ChannelMessage {
    Candidate {
        candidate: CandidateCode,
        reply: Option<oneshot::Sender<Arbitration>>,
    },
    Failure {
        channel: ChannelKind,
        error: AutofillError,
    },
}

impl ChannelMessage {
    pub(crate) fn candidate(candidate: CandidateCode) -> Self {
        Self::Candidate {
            candidate,
            reply: None,
        }
    }

    pub(crate) fn failure(channel: ChannelKind, error: AutofillError) -> Self {
        Self::Failure { channel, error }
    }
}

pub(crate) struct Arbiter {
    ctx: Arc<CoordinatorContext>,
    push: AbortController,
    shutdown: AbortSignal,
}

impl Arbiter {
    pub(crate) fn new(ctx: Arc<CoordinatorContext>, push: AbortController, shutdown: AbortSignal) -> Self {
        Self { ctx, push, shutdown }
    }

    pub(crate) async fn run(self, mut rx: mpsc::Receiver<ChannelMessage>) {
        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.aborted() => break,
                message = rx.recv() => match message {
                    Some(message) => self.handle(message).await,
                    None => break,
                },
            }
        }
        tracing::debug!("arbiter stopped");
    }

    async fn handle(&self, message: ChannelMessage) {
        match message {
            ChannelMessage::Candidate { candidate, reply } => {
                let outcome = self.arbitrate(candidate).await;
                if let Some(reply) = reply {
                    let _ = reply.send(outcome);
                }
            }
            ChannelMessage::Failure { channel, error } => {
                self.ctx.report_failure(channel, &error).await;
            }
        }
    }

    async fn arbitrate(&self, candidate: CandidateCode) -> Arbitration {
        let source = candidate.source;
        self.ctx
            .publish(autofill_events::CANDIDATE_OBSERVED, json!({ "source": source }))
            .await;

        let settled = self.ctx.state.borrow().is_settled();
        if settled {
            tracing::debug!(%source, "flow settled, discarding candidate");
            self.ctx
                .publish(autofill_events::CANDIDATE_DISCARDED, json!({ "source": source }))
                .await;
            return Arbitration::Discarded;
        }

        let code = match self.ctx.format.normalize(&candidate.value) {
            Ok(code) => code,
            Err(error) => {
                tracing::debug!(%source, length = candidate.value.len(), "candidate rejected");
                self.ctx
                    .publish(
                        autofill_events::CANDIDATE_REJECTED,
                        json!({ "source": source, "code": error.code() }),
                    )
                    .await;
                return Arbitration::Rejected(error);
            }
        };

        // A candidate still in flight when stop() fires must not submit.
        if self.shutdown.is_aborted() {
            tracing::debug!(%source, "coordinator stopping, dropping candidate");
            return Arbitration::Inactive;
        }

        let accepted = AcceptedCode::new(code, source);
        let won = self.ctx.state.send_if_modified(|state| {
            if state.is_settled() {
                false
            } else {
                state.accepted = Some(accepted.clone());
                true
            }
        });
        if !won {
            return Arbitration::Discarded;
        }

        tracing::info!(%source, digits = accepted.value.len(), "code accepted");
        self.ctx
            .publish(
                autofill_events::CODE_ACCEPTED,
                json!({ "source": source, "digits": accepted.value.len() }),
            )
            .await;

        self.commit(&accepted).await;
        Arbitration::Accepted(accepted)
    }

    /// Writes the accepted code to the form, caches it and submits once.
    async fn commit(&self, accepted: &AcceptedCode) {
        let collaborators = &self.ctx.collaborators;
        let form = &collaborators.form;

        let written = form
            .set_value(&accepted.value)
            .and_then(|()| form.dispatch_change_notification());
        if let Err(error) = written {
            tracing::error!(code = error.code(), "failed to write accepted code: {}", error);
            self.ctx
                .publish(autofill_events::FORM_WRITE_FAILED, json!({ "code": error.code() }))
                .await;
            if let Some(notice) = UserNotice::from_error(&error) {
                self.ctx.show_notice(notice).await;
            }
            self.cancel_push("form_write_failed").await;
            return;
        }

        collaborators.cache.set(&self.ctx.config.cache_key, &accepted.value);
        self.cancel_push("form_submitted").await;

        match form.submit() {
            Ok(()) => {
                self.ctx.state.send_modify(|state| {
                    state.submissions += 1;
                    state.completed = true;
                });
                tracing::info!(source = %accepted.source, "form submitted");
                self.ctx
                    .publish(
                        autofill_events::FORM_SUBMITTED,
                        json!({ "source": accepted.source }),
                    )
                    .await;
            }
            Err(error) => {
                tracing::error!(code = error.code(), "form submission failed: {}", error);
                self.ctx
                    .publish(autofill_events::FORM_WRITE_FAILED, json!({ "code": error.code() }))
                    .await;
            }
        }
    }

    async fn cancel_push(&self, reason: &'static str) {
        if self.push.abort() {
            tracing::debug!(reason, "credential request cancelled");
            self.ctx
                .publish(autofill_events::PUSH_CANCELLED, json!({ "reason": reason }))
                .await;
        }
    }
}
