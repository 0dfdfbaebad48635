// src/services/differ.rs

//! Snapshot comparison.
//!
//! Produces the ordered list of change events between two consecutive
//! snapshots: overall status first, then components, then incidents.

use std::collections::HashSet;

use chrono::Utc;

use crate::models::{ChangeEvent, Snapshot};

/// Compare two snapshots and return the resulting change events.
///
/// Returns `None` when nothing changed, so callers can distinguish
/// "nothing to report" from a reported set of events.
pub fn diff(previous: &Snapshot, current: &Snapshot) -> Option<Vec<ChangeEvent>> {
    let mut events = Vec::new();

    if previous.overall.description != current.overall.description {
        events.push(ChangeEvent::StatusChange {
            message: format!(
                "System status changed to: {}",
                current.overall.description
            ),
            level: current.overall.level,
            timestamp: current.fetched_at,
        });
    }

    compare_components(previous, current, &mut events);
    compare_incidents(previous, current, &mut events);

    if events.is_empty() { None } else { Some(events) }
}

fn compare_components(previous: &Snapshot, current: &Snapshot, events: &mut Vec<ChangeEvent>) {
    for (name, state) in &current.components {
        let changed = previous
            .components
            .get(name)
            .is_none_or(|prev| prev.status != state.status);

        if changed {
            events.push(ChangeEvent::ComponentUpdate {
                message: format!("{} status changed to: {}", name, state.status),
                component: name.clone(),
                timestamp: state.observed_at,
            });
        }
    }
    // Components present only in the previous snapshot produce no event;
    // the page simply did not carry them this time.
}

fn compare_incidents(previous: &Snapshot, current: &Snapshot, events: &mut Vec<ChangeEvent>) {
    if current.incidents.is_empty() {
        return;
    }

    let previous_ids: HashSet<&str> = previous.incidents.iter().map(|i| i.id.as_str()).collect();
    let current_ids: HashSet<&str> = current.incidents.iter().map(|i| i.id.as_str()).collect();

    for incident in &current.incidents {
        if !previous_ids.contains(incident.id.as_str()) {
            events.push(ChangeEvent::NewIncident {
                incident: incident.clone(),
            });
            continue;
        }

        // Top status and update count are the only change signals; an
        // edited update that moves neither stays invisible.
        let updated = previous
            .incidents
            .iter()
            .find(|prev| prev.id == incident.id)
            .is_some_and(|prev| {
                prev.status != incident.status || prev.updates.len() != incident.updates.len()
            });

        if updated {
            events.push(ChangeEvent::IncidentUpdate {
                incident: incident.clone(),
            });
        }
    }

    for prev in &previous.incidents {
        if !current_ids.contains(prev.id.as_str()) {
            events.push(ChangeEvent::IncidentResolved {
                incident: prev.clone().into_resolved(Utc::now()),
            });
        }
    }
}
