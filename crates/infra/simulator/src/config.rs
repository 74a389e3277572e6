//! Scenario configuration.

use otp_autofill::prelude::*;
use serde::{Deserialize, Serialize};

/// A complete simulated page lifetime.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Runner settings.
    pub simulator: SimulatorConfig,
    /// Coordinator settings.
    pub coordinator: CoordinatorConfig,
    /// Push channel behaviour.
    pub credential: CredentialConfig,
    /// Clipboard behaviour.
    pub clipboard: ClipboardConfig,
    /// Form behaviour.
    pub form: FormConfig,
    /// Visibility changes, in any order.
    pub visibility: Vec<VisibilityChange>,
}

/// Runner-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Log level.
    pub log_level: String,
    /// How long to wait for acceptance before stopping.
    pub run_for_ms: u64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            run_for_ms: 10_000,
        }
    }
}

/// Failure the credential source reports instead of a code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialFailure {
    /// The user dismissed the prompt.
    PermissionDenied,
    /// Another request was already outstanding.
    InvalidState,
}

impl CredentialFailure {
    /// Maps the failure to the error the source reports.
    pub fn to_error(self) -> AutofillError {
        match self {
            CredentialFailure::PermissionDenied => AutofillError::permission_denied(ChannelKind::Push),
            CredentialFailure::InvalidState => AutofillError::invalid_state("a credential request is already pending"),
        }
    }
}

/// Push channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialConfig {
    /// Whether the platform offers credential retrieval.
    pub supported: bool,
    /// Code delivered by SMS.
    pub code: Option<String>,
    /// Length of a random code delivered when `code` is unset.
    pub generate_length: Option<usize>,
    /// Delay between the request and the delivery.
    pub deliver_after_ms: u64,
    /// Failure reported instead of a delivery.
    pub fail: Option<CredentialFailure>,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            supported: true,
            code: None,
            generate_length: None,
            deliver_after_ms: 0,
            fail: None,
        }
    }
}

/// Clipboard configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipboardConfig {
    /// Texts returned by successive reads.
    pub reads: Vec<String>,
    /// Deny every read.
    pub deny_reads: bool,
    /// Whether reads are supported at all.
    pub readable: bool,
    /// Whether writes are supported at all.
    pub writable: bool,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            reads: Vec::new(),
            deny_reads: false,
            readable: true,
            writable: true,
        }
    }
}

/// Form configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Whether the page has an OTP input.
    pub has_input: bool,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self { has_input: true }
    }
}

/// A page visibility change at a point in the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityChange {
    /// Offset from start.
    pub at_ms: u64,
    /// New visibility.
    pub state: Visibility,
}

/// Loads a scenario from a TOML file.
pub fn load_scenario(path: &str) -> Result<ScenarioConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
    parse_scenario(&content)
}

/// Parses and validates a scenario.
pub fn parse_scenario(content: &str) -> Result<ScenarioConfig, ConfigError> {
    let scenario: ScenarioConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

    scenario
        .coordinator
        .validate()
        .map_err(|e| ConfigError::Invalid(e.to_string()))?;
    if scenario.credential.code.is_some() && scenario.credential.generate_length.is_some() {
        return Err(ConfigError::Invalid(
            "credential.code and credential.generate_length are exclusive".to_string(),
        ));
    }
    if scenario.simulator.log_level.parse::<tracing::Level>().is_err() {
        return Err(ConfigError::Invalid(format!(
            "unknown log level {:?}",
            scenario.simulator.log_level
        )));
    }

    Ok(scenario)
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Invalid scenario: {0}")]
    Invalid(String),
}
