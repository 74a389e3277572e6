//! # OTP Autofill Simulator
//!
//! Runs a coordinator against in-memory collaborators scripted by a TOML
//! scenario and reports what happened to the page.

mod config;

pub use config::{
    load_scenario, parse_scenario, ClipboardConfig, ConfigError, CredentialConfig, CredentialFailure,
    FormConfig, ScenarioConfig, SimulatorConfig, VisibilityChange,
};

use otp_autofill::prelude::*;
use otp_autofill_adapter_memory::{MemoryClipboard, MemoryFormSink, MemoryPage, ScriptedCredentialSource};
use otp_autofill_events::TracingHandler;
use otp_autofill_otp_utils::OtpGenerator;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Simulator error.
#[derive(Debug, thiserror::Error)]
pub enum SimulatorError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Autofill(#[from] AutofillError),
}

/// One published event, as reported.
#[derive(Debug, Clone, Serialize)]
pub struct ReportedEvent {
    /// Event type, e.g. `code.accepted`.
    pub event_type: String,
    /// Event payload.
    pub payload: Value,
}

/// Outcome of a simulated page lifetime.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    /// The accepted code, if any.
    pub accepted: Option<AcceptedCode>,
    /// Final input value.
    pub form_value: String,
    /// Form submissions issued.
    pub submissions: u32,
    /// Credential requests made.
    pub credential_requests: usize,
    /// Clipboard reads made.
    pub clipboard_reads: usize,
    /// Clipboard writes made (all clears).
    pub clipboard_writes: usize,
    /// Notices shown to the user.
    pub notices: Vec<UserNotice>,
    /// Published events, oldest first.
    pub events: Vec<ReportedEvent>,
}

/// A scenario ready to run.
pub struct Simulation {
    scenario: ScenarioConfig,
}

impl Simulation {
    /// Creates a simulation.
    pub fn new(scenario: ScenarioConfig) -> Self {
        Self { scenario }
    }

    /// Gets the scenario.
    pub fn scenario(&self) -> &ScenarioConfig {
        &self.scenario
    }

    /// Builds the in-memory page the scenario describes.
    pub fn page(&self) -> MemoryPage {
        let credential = &self.scenario.credential;
        let credentials = if credential.supported {
            ScriptedCredentialSource::new().with_delay(Duration::from_millis(credential.deliver_after_ms))
        } else {
            ScriptedCredentialSource::unsupported()
        };

        if let Some(failure) = credential.fail {
            credentials.fail(failure.to_error());
        } else if let Some(code) = &credential.code {
            credentials.deliver(code.clone());
        } else if let Some(length) = credential.generate_length {
            credentials.deliver(OtpGenerator::new(length).generate());
        }

        let clipboard_config = &self.scenario.clipboard;
        let mut clipboard = MemoryClipboard::new();
        if !clipboard_config.readable {
            clipboard = clipboard.unreadable();
        }
        if !clipboard_config.writable {
            clipboard = clipboard.unwritable();
        }
        for text in &clipboard_config.reads {
            clipboard.push_read(text.clone());
        }
        if clipboard_config.deny_reads {
            clipboard.fail_reads_with(AutofillError::permission_denied(ChannelKind::Clipboard));
        }

        let form = if self.scenario.form.has_input {
            MemoryFormSink::new()
        } else {
            MemoryFormSink::missing_input()
        };

        MemoryPage {
            credentials,
            clipboard,
            form,
            ..MemoryPage::new()
        }
    }

    /// Runs the scenario until a code is accepted or the run time elapses.
    pub async fn run(&self) -> Result<SimulationReport, SimulatorError> {
        let page = self.page();
        let events = Arc::new(EventBus::new());
        events.on_all(TracingHandler).await;
        let coordinator = Arc::new(Coordinator::with_events(
            page.collaborators(),
            self.scenario.coordinator.clone(),
            events.clone(),
        )?);

        let mut changes = self.scenario.visibility.clone();
        changes.sort_by_key(|change| change.at_ms);
        let visibility = tokio::spawn({
            let coordinator = coordinator.clone();
            async move {
                let started = tokio::time::Instant::now();
                for change in changes {
                    tokio::time::sleep_until(started + Duration::from_millis(change.at_ms)).await;
                    coordinator.set_visibility(change.state);
                }
            }
        });

        coordinator.start().await;

        let run_for = Duration::from_millis(self.scenario.simulator.run_for_ms);
        match tokio::time::timeout(run_for, coordinator.wait_for_acceptance()).await {
            Ok(accepted) => tracing::info!(source = %accepted.source, "simulation settled"),
            Err(_) => tracing::info!(run_for_ms = self.scenario.simulator.run_for_ms, "no code accepted"),
        }

        visibility.abort();
        coordinator.stop().await;

        Ok(SimulationReport {
            accepted: coordinator.accepted(),
            form_value: page.form.value(),
            submissions: page.form.submissions(),
            credential_requests: page.credentials.request_count(),
            clipboard_reads: page.clipboard.read_count(),
            clipboard_writes: page.clipboard.writes().len(),
            notices: page.notices.shown(),
            events: events
                .history()
                .await
                .into_iter()
                .map(|event| ReportedEvent {
                    event_type: event.type_string(),
                    payload: event.payload,
                })
                .collect(),
        })
    }
}
