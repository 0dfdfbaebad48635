//! Incident and update data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Incident severity, derived from the title's class markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    None,
    Minor,
    Major,
    Critical,
}

/// Checked in order; first match wins.
const IMPACT_MARKERS: [(&str, Impact); 3] = [
    ("impact-minor", Impact::Minor),
    ("impact-major", Impact::Major),
    ("impact-critical", Impact::Critical),
];

impl Impact {
    /// Derive the impact from an incident title's class string.
    pub fn from_class(class: &str) -> Self {
        IMPACT_MARKERS
            .iter()
            .find(|(marker, _)| class.contains(marker))
            .map(|(_, impact)| *impact)
            .unwrap_or(Impact::None)
    }

    /// Sort weight for display, highest impact first.
    pub fn priority(&self) -> u8 {
        match self {
            Impact::Critical => 3,
            Impact::Major => 2,
            Impact::Minor => 1,
            Impact::None => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Impact::None => "none",
            Impact::Minor => "minor",
            Impact::Major => "major",
            Impact::Critical => "critical",
        }
    }
}

/// One status line within an incident's timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
    /// Lowercased status label ("investigating", "monitoring", ...)
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// A reported incident with its timeline of updates.
///
/// Built fresh on every fetch; identity across fetches is `id` equality
/// only. `updates` preserves the page order, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub id: String,
    pub name: String,
    pub impact: Impact,
    pub status: String,
    pub updates: Vec<Update>,
}

impl Incident {
    /// Copy of this incident marked resolved, with a synthesized
    /// resolution update prepended to the carried-forward timeline.
    pub fn into_resolved(self, now: DateTime<Utc>) -> Self {
        let Self {
            id,
            name,
            impact,
            updates: carried,
            ..
        } = self;

        let mut updates = Vec::with_capacity(carried.len() + 1);
        updates.push(Update {
            status: "resolved".to_string(),
            message: "Incident resolved".to_string(),
            timestamp: now,
        });
        updates.extend(carried);

        Self {
            id,
            name,
            impact,
            status: "resolved".to_string(),
            updates,
        }
    }
}
