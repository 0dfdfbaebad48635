//! Embed rendering for Discord messages.

use chrono::Utc;
use serde_json::{json, Value};

use crate::models::{Impact, Incident, Snapshot, StatusLevel};

const COLOR_GREEN: u32 = 0x2ECC71;
const COLOR_YELLOW: u32 = 0xF1C40F;
const COLOR_RED: u32 = 0xE74C3C;
const COLOR_BLUE: u32 = 0x3498DB;
const COLOR_GRAY: u32 = 0x95A5A6;

fn level_color(level: StatusLevel) -> u32 {
    match level {
        StatusLevel::Operational => COLOR_GREEN,
        StatusLevel::Degraded => COLOR_YELLOW,
        StatusLevel::Outage => COLOR_RED,
        StatusLevel::Maintenance => COLOR_BLUE,
    }
}

fn impact_color(impact: Impact) -> u32 {
    match impact {
        Impact::None => COLOR_GRAY,
        Impact::Minor => COLOR_YELLOW,
        Impact::Major | Impact::Critical => COLOR_RED,
    }
}

/// Filled dot for settled states, hollow for everything in flight.
fn status_dot(status: &str) -> &'static str {
    let status = status.to_lowercase();
    if ["operational", "maintenance", "resolved"]
        .iter()
        .any(|settled| status.contains(settled))
    {
        "●"
    } else {
        "○"
    }
}

/// Display form of a component name.
fn format_name(name: &str) -> String {
    name.to_lowercase().replace("- beta features", " (beta)")
}

/// Render the page-wide status embed.
pub fn status_embed(snapshot: &Snapshot) -> Value {
    let mut embed = json!({
        "title": "anthropic status",
        "description": format!(
            "{} {}",
            status_dot(snapshot.overall.level.as_str()),
            snapshot.overall.description.to_lowercase()
        ),
        "color": level_color(snapshot.overall.level),
        "timestamp": Utc::now().to_rfc3339(),
        "footer": { "text": "last updated" },
        "fields": [],
    });

    let fields = embed["fields"].as_array_mut().expect("fields is an array");

    let component_lines = snapshot
        .components
        .iter()
        .map(|(name, state)| {
            format!(
                "{} {} · {}",
                status_dot(&state.status),
                format_name(name),
                state.status.to_lowercase()
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    if !component_lines.is_empty() {
        fields.push(json!({ "name": "components", "value": component_lines }));
    }

    let mut active: Vec<&Incident> = snapshot
        .incidents
        .iter()
        .filter(|incident| incident.status != "resolved")
        .collect();
    active.sort_by(|a, b| b.impact.priority().cmp(&a.impact.priority()));

    if !active.is_empty() {
        let incident_lines = active
            .iter()
            .map(|incident| {
                format!(
                    "{} {}\n    status: {}",
                    status_dot(&incident.status),
                    incident.name.to_lowercase(),
                    incident.status
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");
        fields.push(json!({ "name": "active incidents", "value": incident_lines }));
    }

    embed
}

/// Render a single incident's timeline embed.
pub fn incident_embed(incident: &Incident) -> Value {
    let mut embed = json!({
        "title": incident.name.to_lowercase(),
        "color": impact_color(incident.impact),
        "timestamp": Utc::now().to_rfc3339(),
        "description": format!(
            "impact: {}\n{} status: {}\n\ntimeline:",
            incident.impact.as_str(),
            status_dot(&incident.status),
            incident.status
        ),
        "fields": [],
    });

    if !incident.updates.is_empty() {
        let timeline = incident
            .updates
            .iter()
            .map(|update| {
                format!(
                    "{} {}  ·  {}\n    {}",
                    status_dot(&update.status),
                    update.status,
                    update.timestamp.format("%b %-d, %Y %H:%M UTC"),
                    update.message.to_lowercase()
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        let fields = embed["fields"].as_array_mut().expect("fields is an array");
        fields.push(json!({ "name": "updates", "value": timeline }));
    }

    embed
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::models::{ComponentState, OverallStatus, Update};

    fn snapshot() -> Snapshot {
        let mut components = BTreeMap::new();
        components.insert(
            "api.anthropic.com - Beta Features".to_string(),
            ComponentState {
                status: "Operational".to_string(),
                observed_at: Utc::now(),
            },
        );
        Snapshot {
            overall: OverallStatus {
                description: "All Systems Operational".to_string(),
                level: StatusLevel::Operational,
            },
            components,
            incidents: vec![],
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn settled_statuses_get_filled_dots() {
        assert_eq!(status_dot("Operational"), "●");
        assert_eq!(status_dot("resolved"), "●");
        assert_eq!(status_dot("maintenance"), "●");
        assert_eq!(status_dot("Degraded Performance"), "○");
        assert_eq!(status_dot("investigating"), "○");
    }

    #[test]
    fn beta_feature_names_are_rewritten() {
        assert_eq!(
            format_name("api.anthropic.com - Beta Features"),
            "api.anthropic.com  (beta)"
        );
        assert_eq!(format_name("anthropic.com"), "anthropic.com");
    }

    #[test]
    fn status_embed_lists_components() {
        let embed = status_embed(&snapshot());
        assert_eq!(embed["title"], "anthropic status");
        assert_eq!(embed["color"], COLOR_GREEN);

        let fields = embed["fields"].as_array().unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0]["name"], "components");
        let value = fields[0]["value"].as_str().unwrap();
        assert!(value.contains("api.anthropic.com  (beta)"));
        assert!(value.contains("● "));
    }

    #[test]
    fn status_embed_sorts_active_incidents_by_impact() {
        let mut snap = snapshot();
        snap.incidents = vec![
            Incident {
                id: "low".into(),
                name: "Minor one".into(),
                impact: Impact::Minor,
                status: "investigating".into(),
                updates: vec![],
            },
            Incident {
                id: "done".into(),
                name: "Resolved one".into(),
                impact: Impact::Critical,
                status: "resolved".into(),
                updates: vec![],
            },
            Incident {
                id: "high".into(),
                name: "Critical one".into(),
                impact: Impact::Critical,
                status: "identified".into(),
                updates: vec![],
            },
        ];

        let embed = status_embed(&snap);
        let fields = embed["fields"].as_array().unwrap();
        let incidents = fields
            .iter()
            .find(|f| f["name"] == "active incidents")
            .unwrap();
        let value = incidents["value"].as_str().unwrap();

        // Resolved incidents are excluded; critical sorts first
        assert!(!value.contains("resolved one"));
        let critical_pos = value.find("critical one").unwrap();
        let minor_pos = value.find("minor one").unwrap();
        assert!(critical_pos < minor_pos);
    }

    #[test]
    fn incident_embed_includes_timeline() {
        let incident = Incident {
            id: "abc".into(),
            name: "Elevated Errors".into(),
            impact: Impact::Major,
            status: "monitoring".into(),
            updates: vec![Update {
                status: "monitoring".into(),
                message: "A fix is in place".into(),
                timestamp: Utc::now(),
            }],
        };

        let embed = incident_embed(&incident);
        assert_eq!(embed["title"], "elevated errors");
        assert_eq!(embed["color"], COLOR_RED);
        assert!(embed["description"]
            .as_str()
            .unwrap()
            .starts_with("impact: major"));

        let fields = embed["fields"].as_array().unwrap();
        assert_eq!(fields[0]["name"], "updates");
        assert!(fields[0]["value"].as_str().unwrap().contains("a fix is in place"));
    }

    #[test]
    fn incident_embed_without_updates_has_no_fields() {
        let incident = Incident {
            id: "abc".into(),
            name: "Quiet".into(),
            impact: Impact::None,
            status: "investigating".into(),
            updates: vec![],
        };
        let embed = incident_embed(&incident);
        assert!(embed["fields"].as_array().unwrap().is_empty());
        assert_eq!(embed["color"], COLOR_GRAY);
    }
}
