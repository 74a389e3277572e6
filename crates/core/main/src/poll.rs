//! Poll channel: periodic clipboard reads while the page is visible.

use otp_autofill_core::signal::AbortSignal;
use otp_autofill_core::types::{CandidateCode, ChannelKind, Visibility};
use otp_autofill_events::autofill_events;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::arbiter::ChannelMessage;
use crate::context::CoordinatorContext;

pub(crate) async fn run(
    ctx: Arc<CoordinatorContext>,
    tx: mpsc::Sender<ChannelMessage>,
    mut visibility: watch::Receiver<Visibility>,
    shutdown: AbortSignal,
) {
    let period = ctx.config.poll_interval();
    let mut last_seen: Option<String> = None;
    let mut suspended = false;

    loop {
        let visible = visibility.borrow_and_update().is_visible();

        if !visible {
            set_polling(&ctx, false);
            if !suspended {
                suspended = true;
                tracing::debug!("page hidden, clipboard polling suspended");
                ctx.publish(autofill_events::POLLING_SUSPENDED, json!({})).await;
            }
            tokio::select! {
                biased;
                _ = shutdown.aborted() => break,
                changed = visibility.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
            continue;
        }

        set_polling(&ctx, true);
        if suspended {
            suspended = false;
            tracing::debug!("page visible, clipboard polling resumed");
            ctx.publish(autofill_events::POLLING_RESUMED, json!({})).await;
        }

        // First read one full period after (re)arming.
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let keep_running = loop {
            tokio::select! {
                biased;
                _ = shutdown.aborted() => break false,
                changed = visibility.changed() => {
                    if changed.is_err() {
                        break false;
                    }
                    let hidden = !visibility.borrow().is_visible();
                    if hidden {
                        break true;
                    }
                }
                _ = ticker.tick() => {
                    if !poll_once(&ctx, &tx, &shutdown, &mut last_seen).await {
                        break false;
                    }
                }
            }
        };

        if !keep_running {
            break;
        }
    }

    set_polling(&ctx, false);
    tracing::debug!("clipboard polling stopped");
}

fn set_polling(ctx: &CoordinatorContext, active: bool) {
    ctx.state.send_if_modified(|state| {
        if state.polling_active == active {
            false
        } else {
            state.polling_active = active;
            true
        }
    });
}

/// Reads the clipboard once. Returns false once the channel must stop.
async fn poll_once(
    ctx: &CoordinatorContext,
    tx: &mpsc::Sender<ChannelMessage>,
    shutdown: &AbortSignal,
    last_seen: &mut Option<String>,
) -> bool {
    let result = tokio::select! {
        biased;
        _ = shutdown.aborted() => return false,
        result = ctx.collaborators.clipboard.read() => result,
    };

    let message = match result {
        Ok(text) => {
            if last_seen.as_deref() == Some(text.as_str()) {
                return true;
            }
            *last_seen = Some(text.clone());

            if text.trim().is_empty() {
                tracing::trace!("clipboard empty");
                return true;
            }
            ChannelMessage::candidate(CandidateCode::clipboard(text))
        }
        Err(error) => ChannelMessage::failure(ChannelKind::Clipboard, error),
    };

    tx.send(message).await.is_ok()
}
