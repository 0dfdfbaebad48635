// src/pipeline/watch.rs

//! The scheduled watch loop.

use std::time::Duration;

use tokio::time::MissedTickBehavior;

use crate::config::Config;
use crate::error::Result;
use crate::notify::WebhookNotifier;
use crate::services::StatusChecker;

/// Run the polling loop until a shutdown signal arrives.
///
/// One check runs to completion per tick; a failure inside a check is
/// logged at this boundary and never stops the schedule.
pub async fn run_watch(config: &Config) -> Result<()> {
    let mut checker = StatusChecker::from_config(&config.status)?;
    let mut notifier = match &config.notify.webhook_url {
        Some(url) => Some(WebhookNotifier::new(url.clone())?),
        None => {
            log::warn!("notify.webhook_url not set; changes will only be logged");
            None
        }
    };

    let period = Duration::from_secs(config.status.check_interval_mins * 60);
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    log::info!(
        "Watching {} every {} minute(s)",
        config.status.url,
        config.status.check_interval_mins
    );

    // Keep one listener alive across ticks so a signal arriving during an
    // in-flight check is still observed once that check completes
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    // The first tick fires immediately: one eager check at startup
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                run_check(&mut checker, notifier.as_mut()).await;
            }
            signal = &mut shutdown => {
                if let Err(error) = signal {
                    log::error!("Shutdown signal listener failed: {error}");
                }
                log::info!("Shutdown signal received; stopping scheduled checks");
                break;
            }
        }
    }

    Ok(())
}

/// One check cycle: detect changes, then hand the snapshot and surviving
/// events to the notifier. The status message is refreshed even on
/// eventless cycles so its last-updated marker stays current.
async fn run_check(checker: &mut StatusChecker, notifier: Option<&mut WebhookNotifier>) {
    let events = checker.check_for_updates().await.unwrap_or_default();

    for event in &events {
        log::info!("Change detected: {}", event.kind());
    }

    let Some(snapshot) = checker.current_state() else {
        // No fetch has succeeded yet; nothing to deliver
        return;
    };

    if let Some(notifier) = notifier {
        if let Err(error) = notifier.handle_update(snapshot, &events).await {
            log::error!("Notification delivery failed: {error}");
        }
    }
}
