//! Shared context of one coordinator: collaborators, configuration,
//! observable state and the observability hook.

use otp_autofill_core::config::CoordinatorConfig;
use otp_autofill_core::error::AutofillError;
use otp_autofill_core::traits::Collaborators;
use otp_autofill_core::types::{ChannelKind, CoordinatorState, NoticeKind, UserNotice};
use otp_autofill_events::{autofill_events, EventBuilder, EventBus};
use otp_autofill_otp_utils::CodeFormat;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};

pub(crate) struct CoordinatorContext {
    pub(crate) collaborators: Collaborators,
    pub(crate) config: CoordinatorConfig,
    pub(crate) format: CodeFormat,
    pub(crate) state: watch::Sender<CoordinatorState>,
    events: Option<Arc<EventBus>>,
    builder: EventBuilder,
    notices_shown: Mutex<HashSet<(NoticeKind, Option<ChannelKind>)>>,
}

impl CoordinatorContext {
    pub(crate) fn new(
        collaborators: Collaborators,
        config: CoordinatorConfig,
        events: Option<Arc<EventBus>>,
    ) -> Self {
        let (state, _) = watch::channel(CoordinatorState::default());
        let builder = EventBuilder::new(&config.event_source)
            .with_correlation_id(uuid::Uuid::new_v4().to_string());

        Self {
            format: CodeFormat::from_config(&config),
            collaborators,
            config,
            state,
            events,
            builder,
            notices_shown: Mutex::new(HashSet::new()),
        }
    }

    pub(crate) fn events(&self) -> Option<&Arc<EventBus>> {
        self.events.as_ref()
    }

    pub(crate) fn snapshot(&self) -> CoordinatorState {
        self.state.borrow().clone()
    }

    /// Publishes an event on the bus, if one is attached.
    pub(crate) async fn publish(&self, event_type: &str, payload: Value) {
        if let Some(bus) = &self.events {
            bus.emit_sync(self.builder.build(event_type, payload)).await;
        }
    }

    /// Shows a notice once per (kind, channel) for this coordinator.
    pub(crate) async fn show_notice(&self, notice: UserNotice) {
        let first = self
            .notices_shown
            .lock()
            .await
            .insert((notice.kind, notice.channel));
        if !first {
            return;
        }

        self.collaborators.notices.show(&notice);
        self.publish(
            autofill_events::NOTICE_SHOWN,
            json!({ "kind": notice.kind, "channel": notice.channel, "message": notice.message }),
        )
        .await;
    }

    /// Records a failed channel attempt. Never propagates.
    pub(crate) async fn report_failure(&self, channel: ChannelKind, error: &AutofillError) {
        if error.is_abort() {
            tracing::debug!(%channel, "channel attempt aborted");
            return;
        }

        tracing::warn!(%channel, code = error.code(), "channel attempt failed: {}", error);
        self.publish(
            autofill_events::CHANNEL_FAILED,
            json!({ "channel": channel, "code": error.code(), "message": error.to_string() }),
        )
        .await;

        if let Some(notice) = UserNotice::from_error(error) {
            self.show_notice(notice).await;
        }
    }

    /// Overwrites the clipboard with an empty string, if writable.
    pub(crate) async fn clear_clipboard(&self, reason: &'static str) {
        let clipboard = &self.collaborators.clipboard;
        if !clipboard.is_writable() {
            tracing::debug!(reason, "clipboard not writable, skipping clear");
            return;
        }

        match clipboard.write("").await {
            Ok(()) => {
                tracing::debug!(reason, "clipboard cleared");
                self.publish(autofill_events::CLIPBOARD_CLEARED, json!({ "reason": reason }))
                    .await;
            }
            Err(error) => {
                tracing::warn!(reason, code = error.code(), "failed to clear clipboard: {}", error);
                self.publish(
                    autofill_events::CLIPBOARD_CLEAR_FAILED,
                    json!({ "reason": reason, "code": error.code() }),
                )
                .await;
            }
        }
    }
}
