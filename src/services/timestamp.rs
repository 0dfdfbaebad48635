//! Timestamp reconstruction from fragmented date markup.
//!
//! Incident updates carry their date as separate fragments (month token,
//! day, time, optional year) with no timezone marker. The page publishes
//! in US Pacific time; the original feed treats that as a fixed -08:00
//! offset, and so do we.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDateTime, Utc};

/// The page's implicit publication offset (US Pacific, written as PST).
const SOURCE_OFFSET_HOURS: i32 = -8;

/// Accepted time fragment shapes: 12-hour with AM/PM, then 24-hour.
const DATETIME_FORMATS: [&str; 2] = ["%b %d, %Y %I:%M %p", "%b %d, %Y %H:%M"];

/// Reconstruct an absolute timestamp from date fragments.
///
/// A missing year defaults to the current calendar year. Any parse
/// failure falls back to the current instant; a timestamp must always be
/// available even when its precision cannot be.
pub fn normalize(month: &str, day: &str, time: &str, year: Option<&str>) -> DateTime<Utc> {
    let current_year;
    let year = match year {
        Some(y) if !y.trim().is_empty() => y.trim(),
        _ => {
            current_year = Utc::now().year().to_string();
            &current_year
        }
    };

    let composed = format!("{} {}, {} {}", month.trim(), day.trim(), year, time.trim());
    parse_in_source_offset(&composed).unwrap_or_else(Utc::now)
}

fn parse_in_source_offset(composed: &str) -> Option<DateTime<Utc>> {
    let offset = FixedOffset::east_opt(SOURCE_OFFSET_HOURS * 3600)?;
    DATETIME_FORMATS.iter().find_map(|format| {
        NaiveDateTime::parse_from_str(composed, format)
            .ok()
            .and_then(|naive| naive.and_local_timezone(offset).single())
            .map(|local| local.with_timezone(&Utc))
    })
}
