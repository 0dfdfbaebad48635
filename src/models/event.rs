//! Change events produced by comparing two snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Incident, StatusLevel};

/// A notification-worthy difference between two consecutive snapshots.
///
/// `Initial` is a sentinel emitted exactly once, when monitoring starts
/// and there is no previous snapshot to diff against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeEvent {
    Initial {
        message: String,
        timestamp: DateTime<Utc>,
    },
    StatusChange {
        message: String,
        level: StatusLevel,
        timestamp: DateTime<Utc>,
    },
    ComponentUpdate {
        message: String,
        component: String,
        timestamp: DateTime<Utc>,
    },
    NewIncident {
        incident: Incident,
    },
    IncidentUpdate {
        incident: Incident,
    },
    IncidentResolved {
        incident: Incident,
    },
}

impl ChangeEvent {
    /// Short label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            ChangeEvent::Initial { .. } => "initial",
            ChangeEvent::StatusChange { .. } => "status_change",
            ChangeEvent::ComponentUpdate { .. } => "component_update",
            ChangeEvent::NewIncident { .. } => "new_incident",
            ChangeEvent::IncidentUpdate { .. } => "incident_update",
            ChangeEvent::IncidentResolved { .. } => "incident_resolved",
        }
    }
}
