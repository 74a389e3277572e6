//! Integration tests for the OTP acquisition coordinator.
//!
//! This test suite covers:
//! - Candidate validation and first-wins arbitration
//! - The push and poll channels and their cancellation
//! - Page visibility handling
//! - Clipboard hygiene, notices and the event hook

use otp_autofill::prelude::*;
use otp_autofill::NoticeKind;
use otp_autofill_adapter_memory::{MemoryCache, MemoryFormSink, MemoryPage, ScriptedCredentialSource};
use std::sync::Arc;
use std::time::Duration;

fn coordinator_for(page: &MemoryPage) -> (Coordinator, Arc<EventBus>) {
    coordinator_with(page, CoordinatorConfig::default())
}

fn coordinator_with(page: &MemoryPage, config: CoordinatorConfig) -> (Coordinator, Arc<EventBus>) {
    let events = Arc::new(EventBus::new());
    let coordinator = Coordinator::with_events(page.collaborators(), config, events.clone())
        .expect("valid config");
    (coordinator, events)
}

async fn accepted_within(coordinator: &Coordinator, secs: u64) -> AcceptedCode {
    tokio::time::timeout(Duration::from_secs(secs), coordinator.wait_for_acceptance())
        .await
        .expect("a code should be accepted in time")
}

async fn idle(secs: u64) {
    tokio::time::sleep(Duration::from_secs(secs)).await;
}

mod arbitration_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_accepts_iff_trimmed_candidate_is_four_to_six_digits() {
        let cases = [
            ("4829", true),
            ("48291", true),
            ("482913", true),
            ("  482913 \n", true),
            ("\t0000", true),
            ("482", false),
            ("4829137", false),
            ("12-34", false),
            ("48 29", false),
            ("abcd", false),
            ("", false),
            ("   ", false),
            ("4829a", false),
        ];

        for (raw, valid) in cases {
            let page = MemoryPage::new();
            let (coordinator, _) = coordinator_for(&page);
            coordinator.start().await;

            let outcome = coordinator.on_candidate(CandidateCode::clipboard(raw)).await;
            if valid {
                let accepted = outcome.accepted().expect("valid candidate accepted");
                assert_eq!(accepted.value, raw.trim());
                assert_eq!(page.form.value(), raw.trim());
                assert_eq!(page.form.submissions(), 1);
            } else {
                assert!(
                    matches!(outcome, Arbitration::Rejected(AutofillError::InvalidFormat { .. })),
                    "{raw:?} should be rejected"
                );
                assert!(coordinator.accepted().is_none());
                assert_eq!(page.form.submissions(), 0);
            }

            coordinator.stop().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_later_candidates_are_no_ops() {
        let page = MemoryPage::new();
        let (coordinator, events) = coordinator_for(&page);
        coordinator.start().await;

        let first = coordinator.on_candidate(CandidateCode::clipboard("4829")).await;
        assert!(first.accepted().is_some());

        for candidate in [
            CandidateCode::push("482913"),
            CandidateCode::clipboard("4829"),
            CandidateCode::clipboard("not a code"),
        ] {
            assert_eq!(coordinator.on_candidate(candidate).await, Arbitration::Discarded);
        }

        let state = coordinator.state();
        assert_eq!(state.accepted.map(|a| a.value).as_deref(), Some("4829"));
        assert_eq!(state.submissions, 1);
        assert_eq!(page.form.value(), "4829");
        assert_eq!(page.form.submissions(), 1);
        assert_eq!(page.form.change_notifications(), 1);
        assert_eq!(events.count_of_type(autofill_events::CANDIDATE_DISCARDED).await, 3);

        coordinator.stop().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_candidates_submit_once() {
        let page = MemoryPage::new();
        let (coordinator, _) = coordinator_for(&page);
        let coordinator = Arc::new(coordinator);
        coordinator.start().await;

        let mut handles = Vec::new();
        for i in 0..16 {
            let coordinator = coordinator.clone();
            handles.push(tokio::spawn(async move {
                let candidate = if i % 2 == 0 {
                    CandidateCode::push(format!("{:06}", i))
                } else {
                    CandidateCode::clipboard(format!("{:04}", i))
                };
                coordinator.on_candidate(candidate).await
            }));
        }

        let mut accepted = 0;
        for handle in handles {
            if handle.await.unwrap().accepted().is_some() {
                accepted += 1;
            }
        }

        assert_eq!(accepted, 1);
        assert_eq!(page.form.submissions(), 1);
        assert_eq!(coordinator.state().submissions, 1);

        coordinator.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_accepted_code_is_cached() {
        let page = MemoryPage::new();
        let (coordinator, _) = coordinator_with(&page, CoordinatorConfig::new().cache_key("session-otp"));
        coordinator.start().await;

        coordinator.on_candidate(CandidateCode::push(" 482913 ")).await;

        assert_eq!(coordinator.cached_code().as_deref(), Some("482913"));
        assert_eq!(page.cache.get("session-otp").as_deref(), Some("482913"));

        coordinator.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_message_channel_extracts_code() {
        let page = MemoryPage::new();
        let (coordinator, _) = coordinator_for(&page);
        coordinator.start().await;

        let outcome = coordinator.offer_message("hello from the other window").await;
        assert!(matches!(outcome, Arbitration::Rejected(_)));

        let outcome = coordinator
            .offer_message("Your verification code is 482913. Do not share it.")
            .await;
        let accepted = outcome.accepted().expect("code extracted from message");
        assert_eq!(accepted.value, "482913");
        assert_eq!(accepted.source, ChannelKind::Message);

        coordinator.stop().await;
    }
}

mod scenario_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_push_resolves_before_any_poll_tick() {
        let page = MemoryPage::new();
        let (coordinator, events) = coordinator_for(&page);
        coordinator.start().await;

        page.credentials.deliver("482913");
        let accepted = accepted_within(&coordinator, 1).await;

        assert_eq!(accepted.value, "482913");
        assert_eq!(accepted.source, ChannelKind::Push);
        assert_eq!(page.form.value(), "482913");
        assert_eq!(page.form.submissions(), 1);

        page.clipboard.set_text("482913");
        idle(5).await;
        page.clipboard.set_text("1111");
        idle(5).await;

        assert!(page.clipboard.read_count() >= 4);
        assert_eq!(page.form.value(), "482913");
        assert_eq!(page.form.submissions(), 1);
        assert_eq!(events.count_of_type(autofill_events::CANDIDATE_DISCARDED).await, 2);

        coordinator.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_clipboard_invalid_then_valid_before_push() {
        let page = MemoryPage::new();
        let (coordinator, events) = coordinator_for(&page);
        page.clipboard.push_read("12-34");
        page.clipboard.push_read("4829");

        coordinator.start().await;
        let accepted = accepted_within(&coordinator, 5).await;

        assert_eq!(accepted.value, "4829");
        assert_eq!(accepted.source, ChannelKind::Clipboard);
        assert_eq!(page.form.submissions(), 1);
        assert_eq!(events.count_of_type(autofill_events::CANDIDATE_REJECTED).await, 1);
        assert_eq!(events.count_of_type(autofill_events::PUSH_CANCELLED).await, 1);

        page.credentials.deliver("482913");
        idle(5).await;

        assert_eq!(coordinator.accepted().map(|a| a.value).as_deref(), Some("4829"));
        assert_eq!(page.form.value(), "4829");
        assert_eq!(page.form.submissions(), 1);
        assert!(!coordinator.state().push_pending);

        coordinator.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_permission_denied_everywhere_shows_one_notice() {
        let page = MemoryPage {
            credentials: ScriptedCredentialSource::unsupported(),
            ..MemoryPage::new()
        };
        page.clipboard
            .fail_reads_with(AutofillError::permission_denied(ChannelKind::Clipboard));
        let (coordinator, events) = coordinator_for(&page);

        coordinator.start().await;
        idle(20).await;

        assert!(coordinator.accepted().is_none());
        assert_eq!(page.form.submissions(), 0);
        assert!(page.clipboard.read_count() >= 5);
        assert_eq!(page.notices.shown().len(), 1);
        assert_eq!(page.notices.count(NoticeKind::PermissionDenied), 1);
        assert_eq!(page.notices.shown()[0].channel, Some(ChannelKind::Clipboard));
        assert_eq!(events.count_of_type(autofill_events::CHANNEL_UNAVAILABLE).await, 1);
        assert!(events.count_of_type(autofill_events::CHANNEL_FAILED).await >= 5);

        coordinator.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_push_failure_leaves_clipboard_channel_active() {
        let page = MemoryPage::new();
        page.credentials
            .fail(AutofillError::permission_denied(ChannelKind::Push));
        page.clipboard.push_read("4829");
        let (coordinator, _) = coordinator_for(&page);

        coordinator.start().await;
        let accepted = accepted_within(&coordinator, 5).await;

        assert_eq!(accepted.source, ChannelKind::Clipboard);
        assert_eq!(page.notices.count(NoticeKind::PermissionDenied), 1);
        assert_eq!(page.notices.shown()[0].channel, Some(ChannelKind::Push));

        coordinator.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_clipboard_errors_are_silent() {
        let page = MemoryPage::new();
        page.clipboard.push_read_error(AutofillError::clipboard("document not focused"));
        page.clipboard.push_read("482913");
        let (coordinator, events) = coordinator_for(&page);

        coordinator.start().await;
        let accepted = accepted_within(&coordinator, 10).await;

        assert_eq!(accepted.value, "482913");
        assert!(page.notices.shown().is_empty());
        assert_eq!(events.count_of_type(autofill_events::CHANNEL_FAILED).await, 1);

        coordinator.stop().await;
    }
}

mod lifecycle_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_stop_deactivates_channels() {
        let page = MemoryPage::new();
        let (coordinator, _) = coordinator_for(&page);

        coordinator.start().await;
        idle(1).await;
        assert_eq!(page.credentials.request_count(), 1);
        assert!(coordinator.state().push_pending);

        coordinator.stop().await;
        let reads_at_stop = page.clipboard.read_count();

        page.credentials.deliver("482913");
        page.clipboard.set_text("4829");
        idle(10).await;

        assert_eq!(page.clipboard.read_count(), reads_at_stop);
        assert!(coordinator.accepted().is_none());
        assert_eq!(page.form.submissions(), 0);
        assert_eq!(
            coordinator.on_candidate(CandidateCode::push("482913")).await,
            Arbitration::Inactive
        );

        let state = coordinator.state();
        assert!(!state.running);
        assert!(!state.polling_active);
        assert!(!state.push_pending);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_idempotent() {
        let page = MemoryPage::new();
        let (coordinator, _) = coordinator_for(&page);

        coordinator.stop().await;
        coordinator.start().await;
        coordinator.stop().await;
        coordinator.stop().await;

        assert!(!coordinator.state().running);
        assert!(page.clipboard.writes().iter().all(|text| text.is_empty()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_twice_is_a_no_op() {
        let page = MemoryPage::new();
        let (coordinator, _) = coordinator_for(&page);

        coordinator.start().await;
        coordinator.start().await;
        idle(1).await;

        assert_eq!(page.credentials.request_count(), 1);
        assert_eq!(page.clipboard.writes().len(), 1);

        coordinator.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_clipboard_cleared_on_start_and_stop() {
        let page = MemoryPage::new();
        page.clipboard.set_text("old code 4829");
        let (coordinator, events) = coordinator_for(&page);

        coordinator.start().await;
        assert_eq!(page.clipboard.text(), "");
        assert_eq!(page.clipboard.writes(), vec![String::new()]);

        page.clipboard.set_text("copied elsewhere");
        coordinator.stop().await;

        assert_eq!(page.clipboard.text(), "");
        assert_eq!(page.clipboard.writes(), vec![String::new(), String::new()]);
        assert_eq!(events.count_of_type(autofill_events::CLIPBOARD_CLEARED).await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_accepted_code_never_copied_to_clipboard() {
        let page = MemoryPage::new();
        let (coordinator, _) = coordinator_for(&page);

        coordinator.start().await;
        page.credentials.deliver("482913");
        accepted_within(&coordinator, 1).await;
        coordinator.stop().await;

        assert!(page.clipboard.writes().iter().all(|text| text.is_empty()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unwritable_clipboard_is_not_cleared() {
        let page = MemoryPage {
            clipboard: otp_autofill_adapter_memory::MemoryClipboard::with_text("4829").unwritable(),
            ..MemoryPage::new()
        };
        let (coordinator, events) = coordinator_for(&page);

        coordinator.start().await;
        coordinator.stop().await;

        assert_eq!(page.clipboard.text(), "4829");
        assert_eq!(events.count_of_type(autofill_events::CLIPBOARD_CLEARED).await, 0);
        assert_eq!(events.count_of_type(autofill_events::CLIPBOARD_CLEAR_FAILED).await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_input_starts_no_channel() {
        let page = MemoryPage {
            form: MemoryFormSink::missing_input(),
            ..MemoryPage::new()
        };
        page.clipboard.push_read("4829");
        let (coordinator, _) = coordinator_for(&page);

        coordinator.start().await;
        idle(10).await;

        assert_eq!(page.credentials.request_count(), 0);
        assert_eq!(page.clipboard.read_count(), 0);
        assert_eq!(page.clipboard.writes(), vec![String::new()]);
        assert_eq!(page.notices.count(NoticeKind::NoInputTarget), 1);
        assert!(!coordinator.state().running);

        coordinator.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_input_removed_before_acceptance() {
        let page = MemoryPage::new();
        let (coordinator, events) = coordinator_for(&page);

        coordinator.start().await;
        page.form.remove_input();
        page.credentials.deliver("482913");
        accepted_within(&coordinator, 1).await;

        assert_eq!(page.form.submissions(), 0);
        assert_eq!(coordinator.state().submissions, 0);
        assert_eq!(page.notices.count(NoticeKind::NoInputTarget), 1);
        assert_eq!(events.count_of_type(autofill_events::FORM_WRITE_FAILED).await, 1);

        coordinator.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_external_submit_cancels_push_and_blocks_acceptance() {
        let page = MemoryPage::new();
        let (coordinator, events) = coordinator_for(&page);

        coordinator.start().await;
        idle(1).await;
        coordinator.notify_form_submitted().await;
        idle(1).await;

        assert!(!coordinator.state().push_pending);
        assert_eq!(events.count_of_type(autofill_events::PUSH_CANCELLED).await, 1);

        page.credentials.deliver("482913");
        page.clipboard.set_text("4829");
        idle(5).await;

        assert!(coordinator.accepted().is_none());
        assert_eq!(page.form.submissions(), 0);
        assert!(coordinator.state().completed);

        coordinator.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_settled_flow_stays_idle_on_restart() {
        let page = MemoryPage::new();
        let (coordinator, _) = coordinator_for(&page);

        coordinator.start().await;
        idle(1).await;
        coordinator.on_candidate(CandidateCode::clipboard("4829")).await;
        coordinator.stop().await;

        coordinator.start().await;
        page.credentials.deliver("482913");
        idle(5).await;

        assert!(!coordinator.state().running);
        assert_eq!(page.credentials.request_count(), 1);
        assert_eq!(page.form.submissions(), 1);

        coordinator.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_restore_from_cache() {
        let page = MemoryPage {
            cache: MemoryCache::with_entry("otp", "482913"),
            ..MemoryPage::new()
        };
        let (coordinator, _) = coordinator_with(&page, CoordinatorConfig::new().restore_from_cache());

        coordinator.start().await;

        let accepted = coordinator.accepted().expect("cached code restored");
        assert_eq!(accepted.value, "482913");
        assert_eq!(accepted.source, ChannelKind::Cache);
        assert_eq!(page.credentials.request_count(), 0);
        assert_eq!(page.form.submissions(), 0);

        coordinator.stop().await;
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let page = MemoryPage::new();
        let result = Coordinator::new(page.collaborators(), CoordinatorConfig::new().poll_interval_ms(0));
        assert!(matches!(result, Err(AutofillError::Configuration { .. })));
    }
}

mod visibility_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_no_reads_while_hidden() {
        let page = MemoryPage::new();
        let (coordinator, events) = coordinator_for(&page);

        coordinator.set_visibility(Visibility::Hidden);
        coordinator.start().await;
        page.clipboard.set_text("4829");
        idle(30).await;

        assert_eq!(page.clipboard.read_count(), 0);
        assert!(!coordinator.state().polling_active);
        assert!(coordinator.accepted().is_none());
        assert_eq!(events.count_of_type(autofill_events::POLLING_SUSPENDED).await, 1);

        coordinator.set_visibility(Visibility::Visible);
        let accepted = tokio::time::timeout(Duration::from_millis(2100), coordinator.wait_for_acceptance())
            .await
            .expect("polling resumes within one interval");

        assert_eq!(accepted.value, "4829");
        assert_eq!(events.count_of_type(autofill_events::POLLING_RESUMED).await, 1);

        coordinator.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_hiding_suspends_running_poll() {
        let page = MemoryPage::new();
        let (coordinator, _) = coordinator_for(&page);

        coordinator.start().await;
        idle(5).await;
        let reads_while_visible = page.clipboard.read_count();
        assert!(reads_while_visible >= 2);
        assert!(coordinator.state().polling_active);

        coordinator.set_visibility(Visibility::Hidden);
        idle(20).await;

        assert_eq!(page.clipboard.read_count(), reads_while_visible);
        assert!(!coordinator.state().polling_active);

        coordinator.set_visibility(Visibility::Visible);
        idle(5).await;
        assert!(page.clipboard.read_count() > reads_while_visible);

        coordinator.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_push_channel_unaffected_by_visibility() {
        let page = MemoryPage::new();
        let (coordinator, _) = coordinator_for(&page);

        coordinator.start().await;
        coordinator.set_visibility(Visibility::Hidden);
        page.credentials.deliver("482913");

        let accepted = accepted_within(&coordinator, 1).await;
        assert_eq!(accepted.source, ChannelKind::Push);
        assert_eq!(page.clipboard.read_count(), 0);

        coordinator.stop().await;
    }
}

mod event_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_events_share_source_and_correlation() {
        let page = MemoryPage::new();
        let (coordinator, events) = coordinator_for(&page);

        coordinator.start().await;
        page.credentials.deliver("482913");
        accepted_within(&coordinator, 1).await;
        coordinator.stop().await;

        let history = events.history().await;
        let types: Vec<String> = history.iter().map(|e| e.type_string()).collect();
        for expected in [
            autofill_events::CLIPBOARD_CLEARED,
            autofill_events::CANDIDATE_OBSERVED,
            autofill_events::CODE_ACCEPTED,
            autofill_events::FORM_SUBMITTED,
        ] {
            assert!(types.iter().any(|t| t == expected), "missing {expected}");
        }

        let correlation = history[0].correlation_id.clone();
        assert!(correlation.is_some());
        assert!(history.iter().all(|e| e.correlation_id == correlation));
        assert!(history.iter().all(|e| e.source == "otp_autofill.coordinator"));

        let accepted = events.events_of_type(autofill_events::CODE_ACCEPTED).await;
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].payload_str("source"), Some("push"));
        assert!(!accepted[0].payload.to_string().contains("482913"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_without_event_bus() {
        let page = MemoryPage::new();
        let coordinator = Coordinator::new(page.collaborators(), CoordinatorConfig::default()).unwrap();
        assert!(coordinator.events().is_none());

        coordinator.start().await;
        page.clipboard.push_read("4829");
        let accepted = accepted_within(&coordinator, 3).await;
        assert_eq!(accepted.value, "4829");

        coordinator.stop().await;
    }
}

mod cancellation_tests {
    use super::*;
    use async_trait::async_trait;
    use otp_autofill::AbortSignal;
    use otp_autofill_events::{Event, EventError, EventHandler};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// A credential source that never looks at its abort signal.
    #[derive(Clone)]
    struct DeafCredentials {
        code: String,
        resolve_after: Duration,
        resolved: Arc<AtomicUsize>,
    }

    impl DeafCredentials {
        fn new(code: &str, resolve_after: Duration) -> Self {
            Self {
                code: code.to_string(),
                resolve_after,
                resolved: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn resolved(&self) -> usize {
            self.resolved.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CredentialSource for DeafCredentials {
        async fn get(&self, _transports: &[Transport], _signal: AbortSignal) -> AutofillResult<String> {
            tokio::time::sleep(self.resolve_after).await;
            self.resolved.fetch_add(1, Ordering::SeqCst);
            Ok(self.code.clone())
        }
    }

    /// An event handler that takes its time.
    struct SlowHandler(Duration);

    #[async_trait]
    impl EventHandler for SlowHandler {
        fn id(&self) -> &str {
            "slow"
        }

        async fn handle(&self, _event: &Event) -> Result<(), EventError> {
            tokio::time::sleep(self.0).await;
            Ok(())
        }
    }

    fn coordinator_with_credentials(page: &MemoryPage, credentials: &DeafCredentials) -> (Coordinator, Arc<EventBus>) {
        let mut collaborators = page.collaborators();
        collaborators.credentials = Arc::new(credentials.clone());
        let events = Arc::new(EventBus::new());
        let coordinator =
            Coordinator::with_events(collaborators, CoordinatorConfig::default(), events.clone())
                .expect("valid config");
        (coordinator, events)
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_abandons_source_ignoring_signal() {
        let page = MemoryPage::new();
        let credentials = DeafCredentials::new("482913", Duration::from_secs(3600));
        let (coordinator, _) = coordinator_with_credentials(&page, &credentials);

        coordinator.start().await;
        idle(1).await;
        assert!(coordinator.state().push_pending);

        tokio::time::timeout(Duration::from_secs(1), coordinator.stop())
            .await
            .expect("stop does not wait for the credential source");
        assert!(!coordinator.state().push_pending);

        idle(7200).await;
        assert_eq!(credentials.resolved(), 0);
        assert!(coordinator.accepted().is_none());
        assert_eq!(page.form.submissions(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_source_ignoring_signal_abandoned_after_clipboard_wins() {
        let page = MemoryPage::new();
        page.clipboard.push_read("4829");
        let credentials = DeafCredentials::new("482913", Duration::from_secs(10));
        let (coordinator, events) = coordinator_with_credentials(&page, &credentials);

        coordinator.start().await;
        let accepted = accepted_within(&coordinator, 5).await;
        assert_eq!(accepted.source, ChannelKind::Clipboard);

        idle(1).await;
        assert!(!coordinator.state().push_pending);

        idle(20).await;
        assert_eq!(credentials.resolved(), 0);
        assert_eq!(page.form.value(), "4829");
        assert_eq!(page.form.submissions(), 1);
        assert_eq!(events.count_of_type(autofill_events::CANDIDATE_OBSERVED).await, 1);

        coordinator.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_handlers_cannot_outlive_stop() {
        let page = MemoryPage::new();
        let (coordinator, events) = coordinator_for(&page);
        events
            .on(autofill_events::PUSH_CANCELLED, SlowHandler(Duration::from_secs(3)))
            .await;

        coordinator.start().await;
        tokio::time::sleep(Duration::from_millis(500)).await;
        page.clipboard.set_text("4829");
        coordinator.stop().await;

        assert_eq!(events.count_of_type(autofill_events::PUSH_CANCELLED).await, 1);
        assert_eq!(page.clipboard.read_count(), 0);
        assert!(coordinator.accepted().is_none());
        assert_eq!(page.form.value(), "");
        assert_eq!(page.form.submissions(), 0);
        assert_eq!(events.count_of_type(autofill_events::CANDIDATE_OBSERVED).await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_push_rearmed_when_page_shown_again() {
        let page = MemoryPage::new();
        page.credentials
            .fail(AutofillError::invalid_state("a request is already pending"));
        let (coordinator, events) = coordinator_for(&page);

        coordinator.start().await;
        idle(1).await;
        assert_eq!(page.credentials.request_count(), 1);
        assert_eq!(events.count_of_type(autofill_events::CHANNEL_FAILED).await, 1);
        assert!(!coordinator.state().push_pending);

        idle(10).await;
        assert_eq!(page.credentials.request_count(), 1);

        coordinator.set_visibility(Visibility::Hidden);
        idle(1).await;
        assert_eq!(page.credentials.request_count(), 1);
        coordinator.set_visibility(Visibility::Visible);
        idle(1).await;

        assert_eq!(page.credentials.request_count(), 2);
        assert!(coordinator.state().push_pending);

        page.credentials.deliver("482913");
        let accepted = accepted_within(&coordinator, 1).await;
        assert_eq!(accepted.source, ChannelKind::Push);
        assert!(page.notices.shown().is_empty());

        coordinator.stop().await;
    }
}
