// src/pipeline/check.rs

//! One-shot check for operational smoke testing.

use crate::config::Config;
use crate::error::Result;
use crate::services::StatusChecker;

/// Fetch and parse the status page once, printing the snapshot as JSON.
pub async fn run_check_once(config: &Config) -> Result<()> {
    let checker = StatusChecker::from_config(&config.status)?;
    let snapshot = checker.fetch_status().await?;

    log::info!(
        "Overall: {} ({})",
        snapshot.overall.description,
        snapshot.overall.level.as_str()
    );
    log::info!(
        "Components: {}, incidents: {}",
        snapshot.components.len(),
        snapshot.incidents.len()
    );

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
