//! Snapshot of the monitored page at one fetch.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Incident;

/// Overall status severity, derived from the page's class markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    Operational,
    Degraded,
    Outage,
    Maintenance,
}

/// Class-string markers checked in order; first match wins. The page's
/// class strings are not guaranteed mutually exclusive, so the order is
/// part of the contract.
const LEVEL_MARKERS: [(&str, StatusLevel); 3] = [
    ("degraded", StatusLevel::Degraded),
    ("outage", StatusLevel::Outage),
    ("maintenance", StatusLevel::Maintenance),
];

impl StatusLevel {
    /// Derive the level from an element's class string.
    pub fn from_class(class: &str) -> Self {
        LEVEL_MARKERS
            .iter()
            .find(|(marker, _)| class.contains(marker))
            .map(|(_, level)| *level)
            .unwrap_or(StatusLevel::Operational)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusLevel::Operational => "operational",
            StatusLevel::Degraded => "degraded",
            StatusLevel::Outage => "outage",
            StatusLevel::Maintenance => "maintenance",
        }
    }
}

/// The page-wide status banner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverallStatus {
    pub description: String,
    pub level: StatusLevel,
}

/// Status of a single tracked component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentState {
    pub status: String,
    pub observed_at: DateTime<Utc>,
}

/// Fully parsed view of the status page at one fetch.
///
/// `components` holds only allow-listed names; `incidents` preserves the
/// document order (most recent first).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub overall: OverallStatus,
    pub components: BTreeMap<String, ComponentState>,
    pub incidents: Vec<Incident>,
    pub fetched_at: DateTime<Utc>,
}

impl Snapshot {
    /// One "name: status" line per component, for log and message output.
    pub fn component_lines(&self) -> String {
        self.components
            .iter()
            .map(|(name, state)| format!("{}: {}", name, state.status))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
