// src/services/extractor.rs

//! HTML extraction for the status page.
//!
//! Turns the raw status page document into a [`Snapshot`]. The CSS
//! selectors below are the sole wire contract with the page; a structural
//! change to that markup is a breaking change here.

use std::collections::{BTreeMap, HashSet};

use chrono::Utc;
use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{ComponentState, Impact, Incident, OverallStatus, Snapshot, StatusLevel, Update};
use crate::services::timestamp;

/// Description shown when the page carries no overall-status text.
const DEFAULT_DESCRIPTION: &str = "All Systems Operational";

/// Status an incident reports before any update has been posted.
const DEFAULT_INCIDENT_STATUS: &str = "investigating";

/// Parsed selectors for every page region, built once per extractor.
struct Selectors {
    overall_status: Selector,
    overall_description: Selector,
    component_container: Selector,
    component_name: Selector,
    component_status: Selector,
    status_day: Selector,
    incident_container: Selector,
    incident_title: Selector,
    anchor: Selector,
    update: Selector,
    update_status: Selector,
    update_message: Selector,
    update_meta: Selector,
    date_day: Selector,
    date_time: Selector,
    date_year: Selector,
}

impl Selectors {
    fn parse() -> Result<Self> {
        Ok(Self {
            overall_status: parse_selector(".overall-status")?,
            overall_description: parse_selector(".overall-status__description")?,
            component_container: parse_selector(".component-container")?,
            component_name: parse_selector(".name")?,
            component_status: parse_selector(".component-status")?,
            status_day: parse_selector(".status-day")?,
            incident_container: parse_selector(".incident-container")?,
            incident_title: parse_selector(".incident-title")?,
            anchor: parse_selector("a")?,
            update: parse_selector(".update")?,
            update_status: parse_selector("strong")?,
            update_message: parse_selector(".whitespace-pre-wrap")?,
            update_meta: parse_selector("small")?,
            date_day: parse_selector("var[data-var=\"date\"]")?,
            date_time: parse_selector("var[data-var=\"time\"]")?,
            date_year: parse_selector("var[data-var=\"year\"]")?,
        })
    }
}

/// Extracts structured snapshots from status page HTML.
pub struct StatusExtractor {
    allowed: HashSet<String>,
    selectors: Selectors,
}

impl StatusExtractor {
    /// Create an extractor tracking the given component names.
    pub fn new(allowed_components: impl IntoIterator<Item = String>) -> Result<Self> {
        Ok(Self {
            allowed: allowed_components.into_iter().collect(),
            selectors: Selectors::parse()?,
        })
    }

    /// Parse a status page document into a snapshot.
    ///
    /// Missing or malformed regions degrade to defaults; this never fails
    /// on document content.
    pub fn extract(&self, html: &str) -> Snapshot {
        let document = Html::parse_document(html);

        Snapshot {
            overall: self.parse_overall(&document),
            components: self.parse_components(&document),
            incidents: self.parse_incidents(&document),
            fetched_at: Utc::now(),
        }
    }

    fn parse_overall(&self, document: &Html) -> OverallStatus {
        let description = document
            .select(&self.selectors.overall_description)
            .next()
            .map(element_text)
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());

        let class = document
            .select(&self.selectors.overall_status)
            .next()
            .and_then(|status| status.value().attr("class"))
            .unwrap_or("");

        OverallStatus {
            description,
            level: StatusLevel::from_class(class),
        }
    }

    fn parse_components(&self, document: &Html) -> BTreeMap<String, ComponentState> {
        let observed_at = Utc::now();
        let mut components = BTreeMap::new();

        for container in document.select(&self.selectors.component_container) {
            let name = container
                .select(&self.selectors.component_name)
                .next()
                .map(element_text)
                .unwrap_or_default();

            // Unlisted components are filtered, not an error
            if !self.allowed.contains(&name) {
                continue;
            }

            let status = container
                .select(&self.selectors.component_status)
                .next()
                .map(element_text)
                .unwrap_or_default();

            components.insert(name, ComponentState { status, observed_at });
        }

        components
    }

    fn parse_incidents(&self, document: &Html) -> Vec<Incident> {
        let mut incidents = Vec::new();

        for day in document.select(&self.selectors.status_day) {
            for container in day.select(&self.selectors.incident_container) {
                incidents.push(self.parse_incident(&container));
            }
        }

        incidents
    }

    fn parse_incident(&self, container: &ElementRef) -> Incident {
        let title = container.select(&self.selectors.incident_title).next();
        let link = title.and_then(|t| t.select(&self.selectors.anchor).next());

        let id = link
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| href.rsplit('/').next())
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .unwrap_or_else(fallback_id);

        let name = link.map(element_text).unwrap_or_default();
        let impact = Impact::from_class(
            title
                .and_then(|t| t.value().attr("class"))
                .unwrap_or_default(),
        );

        let updates = self.parse_updates(container);
        let status = updates
            .first()
            .map(|update| update.status.clone())
            .unwrap_or_else(|| DEFAULT_INCIDENT_STATUS.to_string());

        Incident {
            id,
            name,
            impact,
            status,
            updates,
        }
    }

    fn parse_updates(&self, container: &ElementRef) -> Vec<Update> {
        let mut updates = Vec::new();

        for update in container.select(&self.selectors.update) {
            let status = update
                .select(&self.selectors.update_status)
                .next()
                .map(element_text)
                .unwrap_or_default()
                .to_lowercase();

            let message = update
                .select(&self.selectors.update_message)
                .next()
                .map(element_text)
                .unwrap_or_default();

            let timestamp = update
                .select(&self.selectors.update_meta)
                .next()
                .map(|meta| self.parse_update_timestamp(&meta))
                .unwrap_or_else(Utc::now);

            updates.push(Update {
                status,
                message,
                timestamp,
            });
        }

        updates
    }

    /// Reassemble the fragmented date markup under an update's `<small>`.
    ///
    /// The month is the first text token; day, time and year sit in
    /// dedicated `var` elements. Year is often omitted within the current
    /// calendar year.
    fn parse_update_timestamp(&self, meta: &ElementRef) -> chrono::DateTime<Utc> {
        let month = element_text(*meta)
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_string();
        let day = meta
            .select(&self.selectors.date_day)
            .next()
            .map(element_text)
            .unwrap_or_default();
        let time = meta
            .select(&self.selectors.date_time)
            .next()
            .map(element_text)
            .unwrap_or_default();
        let year = meta
            .select(&self.selectors.date_year)
            .next()
            .map(element_text);

        timestamp::normalize(&month, &day, &time, year.as_deref())
    }
}

/// Collect an element's text with whitespace collapsed, as the page's
/// markup nests text across indented child nodes.
fn element_text(element: ElementRef) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Clock-derived id for incidents missing a permalink. Only compared
/// within a single process run.
fn fallback_id() -> String {
    Utc::now().timestamp_millis().to_string()
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| AppError::selector(selector, format!("{e:?}")))
}
