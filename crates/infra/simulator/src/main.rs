//! OTP Autofill simulator binary.
//!
//! Usage: `otp-autofill-sim [scenario.toml]`

use otp_autofill_simulator::{load_scenario, ScenarioConfig, Simulation};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load the scenario
    let scenario = match std::env::args().nth(1) {
        Some(path) => load_scenario(&path)?,
        None => ScenarioConfig::default(),
    };

    // Initialize tracing; stdout carries the report
    let level: tracing::Level = scenario.simulator.log_level.parse()?;
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let report = Simulation::new(scenario).run().await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
