//! Demonstrates the clipboard channel winning the race.
//!
//! Run with: cargo run --example autofill_demo

use otp_autofill::prelude::*;
use otp_autofill_adapter_memory::MemoryPage;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> AutofillResult<()> {
    let page = MemoryPage::new();
    let events = Arc::new(EventBus::new());
    let config = CoordinatorConfig::new().poll_interval_ms(200);
    let coordinator = Coordinator::with_events(page.collaborators(), config, events.clone())?;

    coordinator.start().await;
    println!("Coordinator started, clipboard cleared: {:?}", page.clipboard.writes());

    // The user copies an invalid string, then the real code.
    page.clipboard.push_read("12-34");
    page.clipboard.push_read("4829");

    let accepted = tokio::time::timeout(Duration::from_secs(2), coordinator.wait_for_acceptance())
        .await
        .map_err(|_| AutofillError::internal("no code accepted in time"))?;
    println!("Accepted {} from the {} channel", accepted.value, accepted.source);

    // The SMS arrives too late to matter.
    page.credentials.deliver("482913");
    tokio::time::sleep(Duration::from_millis(500)).await;

    coordinator.stop().await;

    println!("Form value: {}", page.form.value());
    println!("Submissions: {}", page.form.submissions());
    for event in events.history().await {
        println!("  {} {}", event.event_type, event.payload);
    }

    Ok(())
}
