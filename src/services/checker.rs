// src/services/checker.rs

//! The stateful status checker.
//!
//! Owns the previous/current snapshot pair and turns each fetch into the
//! events worth reporting. The fetch step is an injected capability so
//! tests can feed fixed documents.

use async_trait::async_trait;

use crate::config::StatusConfig;
use crate::error::Result;
use crate::models::{ChangeEvent, Snapshot};
use crate::services::dedupe::RecentMessages;
use crate::services::differ;
use crate::services::extractor::StatusExtractor;
use crate::utils::http::FetchClient;

/// Supplies the raw status page document.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch(&self) -> Result<String>;
}

#[async_trait]
impl DocumentSource for FetchClient {
    async fn fetch(&self) -> Result<String> {
        self.fetch_text().await
    }
}

/// Periodically compares status page snapshots and reports changes.
pub struct StatusChecker {
    source: Box<dyn DocumentSource>,
    extractor: StatusExtractor,
    recent: RecentMessages,
    previous: Option<Snapshot>,
    current: Option<Snapshot>,
}

impl StatusChecker {
    /// Build a checker with an injected document source.
    pub fn new(config: &StatusConfig, source: Box<dyn DocumentSource>) -> Result<Self> {
        Ok(Self {
            source,
            extractor: StatusExtractor::new(config.components.iter().cloned())?,
            recent: RecentMessages::new(),
            previous: None,
            current: None,
        })
    }

    /// Build a checker fetching over HTTP per the configuration.
    pub fn from_config(config: &StatusConfig) -> Result<Self> {
        let client = FetchClient::new(config)?;
        Self::new(config, Box::new(client))
    }

    /// The most recently fetched snapshot, if any fetch has succeeded.
    pub fn current_state(&self) -> Option<&Snapshot> {
        self.current.as_ref()
    }

    /// Fetch and parse the status page once.
    pub async fn fetch_status(&self) -> Result<Snapshot> {
        let html = self.source.fetch().await?;
        Ok(self.extractor.extract(&html))
    }

    /// Run one check cycle.
    ///
    /// Returns `None` when the fetch failed or nothing changed; the
    /// `Initial` sentinel on the first successful check; otherwise the
    /// deduplicated change events.
    pub async fn check_for_updates(&mut self) -> Option<Vec<ChangeEvent>> {
        let current = match self.fetch_status().await {
            Ok(snapshot) => snapshot,
            Err(error) => {
                log::warn!("Failed to fetch status update: {error}");
                return None;
            }
        };

        self.current = Some(current.clone());

        let Some(previous) = self.previous.take() else {
            log::info!(
                "Status monitoring initialized: {}",
                current.overall.description
            );
            let message = format!(
                "Status monitoring initialized.\nCurrent Status: {}\n{}",
                current.overall.description,
                current.component_lines()
            );
            let timestamp = current.fetched_at;
            self.previous = Some(current);
            return Some(vec![ChangeEvent::Initial { message, timestamp }]);
        };

        let events = differ::diff(&previous, &current);
        self.previous = Some(current);

        let mut survivors = Vec::new();
        for event in events? {
            if self.suppressed(&event) {
                continue;
            }
            survivors.push(event);
        }

        if survivors.is_empty() {
            None
        } else {
            Some(survivors)
        }
    }

    /// Deduplicate status/component messages; incident events carry
    /// stable identity through their incident id and pass through.
    fn suppressed(&mut self, event: &ChangeEvent) -> bool {
        let (message, timestamp) = match event {
            ChangeEvent::StatusChange {
                message, timestamp, ..
            }
            | ChangeEvent::ComponentUpdate {
                message, timestamp, ..
            } => (message, timestamp),
            _ => return false,
        };

        let duplicate = self.recent.is_duplicate(message, &timestamp.to_rfc3339());
        if duplicate {
            log::debug!("Suppressed duplicate message: {message}");
        }
        duplicate
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::error::AppError;

    /// Feeds a scripted sequence of documents, then fails when exhausted.
    struct ScriptedSource {
        pages: Mutex<Vec<std::result::Result<String, ()>>>,
    }

    impl ScriptedSource {
        fn new(pages: Vec<std::result::Result<&str, ()>>) -> Self {
            Self {
                pages: Mutex::new(
                    pages
                        .into_iter()
                        .rev()
                        .map(|page| page.map(str::to_string))
                        .collect(),
                ),
            }
        }
    }

    #[async_trait]
    impl DocumentSource for ScriptedSource {
        async fn fetch(&self) -> Result<String> {
            let mut pages = self.pages.lock().unwrap();
            match pages.pop() {
                Some(Ok(html)) => Ok(html),
                Some(Err(())) | None => Err(AppError::HttpStatus {
                    status: 503,
                    url: "https://status.anthropic.com".into(),
                }),
            }
        }
    }

    fn config() -> StatusConfig {
        StatusConfig::default()
    }

    fn checker_with(pages: Vec<std::result::Result<&str, ()>>) -> StatusChecker {
        StatusChecker::new(&config(), Box::new(ScriptedSource::new(pages))).unwrap()
    }

    const OPERATIONAL: &str = r#"
        <div class="overall-status">
          <span class="overall-status__description">All Systems Operational</span>
        </div>
        <div class="component-container">
          <span class="name">api.anthropic.com</span>
          <span class="component-status">Operational</span>
        </div>
    "#;

    const DEGRADED: &str = r#"
        <div class="overall-status degraded">
          <span class="overall-status__description">Degraded Performance</span>
        </div>
        <div class="component-container">
          <span class="name">api.anthropic.com</span>
          <span class="component-status">Degraded</span>
        </div>
    "#;

    #[tokio::test]
    async fn first_check_returns_initial_sentinel() {
        let mut checker = checker_with(vec![Ok(DEGRADED)]);

        let events = checker.check_for_updates().await.unwrap();
        assert_eq!(events.len(), 1);
        match &events[0] {
            ChangeEvent::Initial { message, .. } => {
                assert!(message.starts_with("Status monitoring initialized."));
                assert!(message.contains("Degraded Performance"));
                assert!(message.contains("api.anthropic.com: Degraded"));
            }
            other => panic!("expected initial sentinel, got {}", other.kind()),
        }
        assert!(checker.current_state().is_some());
    }

    #[tokio::test]
    async fn unchanged_page_reports_nothing() {
        let mut checker = checker_with(vec![Ok(OPERATIONAL), Ok(OPERATIONAL)]);

        checker.check_for_updates().await.unwrap();
        assert!(checker.check_for_updates().await.is_none());
    }

    #[tokio::test]
    async fn changed_page_reports_events_once() {
        let mut checker = checker_with(vec![Ok(OPERATIONAL), Ok(DEGRADED), Ok(DEGRADED)]);

        checker.check_for_updates().await.unwrap();

        let events = checker.check_for_updates().await.unwrap();
        let kinds: Vec<&str> = events.iter().map(|e| e.kind()).collect();
        assert_eq!(kinds, vec!["status_change", "component_update"]);

        // Third fetch matches the second: nothing further to report
        assert!(checker.check_for_updates().await.is_none());
    }

    #[tokio::test]
    async fn fetch_failure_yields_none_and_keeps_state() {
        let mut checker = checker_with(vec![Ok(OPERATIONAL), Err(()), Ok(DEGRADED)]);

        checker.check_for_updates().await.unwrap();
        assert!(checker.check_for_updates().await.is_none());

        // The failed cycle did not advance the previous snapshot
        let events = checker.check_for_updates().await.unwrap();
        assert!(!events.is_empty());
    }

    #[tokio::test]
    async fn fetch_failure_on_first_check_reports_nothing() {
        let mut checker = checker_with(vec![Err(())]);
        assert!(checker.check_for_updates().await.is_none());
        assert!(checker.current_state().is_none());
    }
}
