//! Push channel: a credential request per pass, re-armed after a failure
//! once the page is shown again.

use otp_autofill_core::error::AutofillError;
use otp_autofill_core::signal::AbortSignal;
use otp_autofill_core::types::{CandidateCode, ChannelKind, Visibility};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

use crate::arbiter::ChannelMessage;
use crate::context::CoordinatorContext;

pub(crate) async fn run(
    ctx: Arc<CoordinatorContext>,
    tx: mpsc::Sender<ChannelMessage>,
    mut visibility: watch::Receiver<Visibility>,
    signal: AbortSignal,
) {
    let credentials = ctx.collaborators.credentials.clone();
    let transports = ctx.config.transports.clone();

    loop {
        ctx.state.send_modify(|state| state.push_pending = true);
        tracing::debug!(?transports, "waiting for credential");

        // The race against the signal also covers sources that ignore it.
        let result = tokio::select! {
            biased;
            _ = signal.aborted() => Err(AutofillError::Aborted),
            result = credentials.get(&transports, signal.clone()) => result,
        };

        ctx.state.send_modify(|state| state.push_pending = false);

        let message = match result {
            Ok(code) => ChannelMessage::candidate(CandidateCode::push(code)),
            Err(AutofillError::Aborted) => {
                tracing::debug!("credential request aborted");
                return;
            }
            Err(error) => ChannelMessage::failure(ChannelKind::Push, error),
        };

        let failed = matches!(message, ChannelMessage::Failure { .. });
        if tx.send(message).await.is_err() {
            tracing::debug!("arbiter gone, dropping credential result");
            return;
        }
        if !failed {
            return;
        }

        if !page_shown_again(&mut visibility, &signal).await {
            return;
        }
        tracing::debug!("page shown again, re-requesting credential");
    }
}

/// Waits for a hidden-to-visible transition. Returns false once aborted.
async fn page_shown_again(visibility: &mut watch::Receiver<Visibility>, signal: &AbortSignal) -> bool {
    let mut was_hidden = !visibility.borrow_and_update().is_visible();

    loop {
        tokio::select! {
            biased;
            _ = signal.aborted() => return false,
            changed = visibility.changed() => {
                if changed.is_err() {
                    return false;
                }
            }
        }

        let visible = visibility.borrow_and_update().is_visible();
        if !visible {
            was_hidden = true;
        } else if was_hidden {
            return true;
        }
    }
}
