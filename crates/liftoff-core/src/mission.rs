//! Normalised missions, the list-friendly shape of a launch record.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::launch::LaunchRecord;

/// Rendered in place of a date that cannot be parsed.
pub const INVALID_DATE: &str = "Invalid Date";

/// A launch reduced to what the mission lists need.
///
/// Carries no identity of its own beyond `id`, which always equals the source
/// [`LaunchRecord::id`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedMission {
  pub id:           String,
  pub mission_name: String,
  /// Human-readable UTC date, e.g. `Oct 06, 2022`.
  pub launch_date:  String,
  /// The upstream `date_utc` string, kept for sorting.
  pub date_utc:     String,
  pub upcoming:     bool,
}

impl NormalizedMission {
  pub fn launched_at(&self) -> Option<DateTime<Utc>> { parse_launch_date(&self.date_utc) }
}

impl From<&LaunchRecord> for NormalizedMission {
  fn from(record: &LaunchRecord) -> Self {
    Self {
      id:           record.id.clone(),
      mission_name: record.name.clone(),
      launch_date:  format_launch_date(&record.date_utc),
      date_utc:     record.date_utc.clone(),
      upcoming:     record.upcoming,
    }
  }
}

/// Map raw records to missions, one for one, preserving order.
pub fn normalize(records: &[LaunchRecord]) -> Vec<NormalizedMission> {
  records.iter().map(NormalizedMission::from).collect()
}

// ─── Dates ───────────────────────────────────────────────────────────────────

/// Parse an upstream date. Accepts RFC 3339 timestamps and bare `YYYY-MM-DD`
/// dates, the latter read as midnight UTC.
pub fn parse_launch_date(raw: &str) -> Option<DateTime<Utc>> {
  let raw = raw.trim();
  if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
    return Some(dt.with_timezone(&Utc));
  }
  NaiveDate::parse_from_str(raw, "%Y-%m-%d")
    .ok()
    .and_then(|d| d.and_hms_opt(0, 0, 0))
    .map(|naive| naive.and_utc())
}

/// Format an upstream date in UTC as `Oct 06, 2022`. Never fails; bad input
/// yields [`INVALID_DATE`].
pub fn format_launch_date(raw: &str) -> String {
  parse_launch_date(raw)
    .map(|dt| dt.format("%b %d, %Y").to_string())
    .unwrap_or_else(|| INVALID_DATE.to_string())
}

// ─── Display & search ────────────────────────────────────────────────────────

/// Some upstream names already contain the word "mission"; the rest get it
/// appended so list entries read consistently.
pub fn display_name(mission_name: &str) -> String {
  if mission_name.contains("mission") {
    mission_name.to_string()
  } else {
    format!("{mission_name} mission")
  }
}

/// Case-insensitive substring filter over mission names. A blank query
/// matches everything.
pub fn filter_by_name<'a>(
  missions: &'a [NormalizedMission],
  query: &str,
) -> Vec<&'a NormalizedMission> {
  let needle = query.trim().to_lowercase();
  missions
    .iter()
    .filter(|m| needle.is_empty() || m.mission_name.to_lowercase().contains(&needle))
    .collect()
}
