//! Launch records as returned by `GET /v5/launches`.
//!
//! These mirror the upstream JSON closely. Only the fields the browser reads
//! are modelled; everything else in the payload is ignored on decode.

use serde::{Deserialize, Serialize};

use crate::mission::format_launch_date;

// ─── Raw API shape ───────────────────────────────────────────────────────────

/// One booster core flown on a launch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Core {
  #[serde(default)]
  pub flight:          Option<u32>,
  /// `null` upstream for launches that have not flown yet.
  #[serde(default)]
  pub reused:          Option<bool>,
  #[serde(default)]
  pub landing_success: Option<bool>,
  #[serde(default)]
  pub landing_type:    Option<String>,
  /// Landpad id; absent when the core was expended or not recovered.
  #[serde(default)]
  pub landpad:         Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LaunchLinks {
  #[serde(default)]
  pub article: Option<String>,
  #[serde(default)]
  pub webcast: Option<String>,
}

/// A single launch as served by the upstream API.
///
/// Immutable for the lifetime of a browse session; the whole list is replaced
/// on refetch rather than patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchRecord {
  pub id:        String,
  pub name:      String,
  pub date_utc:  String,
  #[serde(default)]
  pub upcoming:  bool,
  #[serde(default)]
  pub success:   Option<bool>,
  #[serde(default)]
  pub cores:     Vec<Core>,
  #[serde(default)]
  pub links:     LaunchLinks,
  #[serde(default)]
  pub rocket:    Option<String>,
  #[serde(default)]
  pub launchpad: Option<String>,
  #[serde(default)]
  pub payloads:  Vec<String>,
}

impl LaunchRecord {
  /// The primary (first) core, if the record lists any.
  pub fn primary_core(&self) -> Option<&Core> { self.cores.first() }

  /// Landpad id of the primary core. `None` is a normal outcome.
  pub fn landpad_id(&self) -> Option<&str> {
    self
      .primary_core()
      .and_then(|c| c.landpad.as_deref())
      .filter(|id| !id.trim().is_empty())
  }
}

/// Look up a record by id.
pub fn find_launch<'a>(launches: &'a [LaunchRecord], id: &str) -> Option<&'a LaunchRecord> {
  launches.iter().find(|l| l.id == id)
}

// ─── Detail projection ───────────────────────────────────────────────────────

/// The view-friendly projection of a launch used by the detail pane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionDetails {
  pub id:           String,
  pub mission_name: String,
  pub launch_date:  String,
  pub upcoming:     bool,
  pub video:        Option<String>,
  pub article:      Option<String>,
  pub rocket:       Option<String>,
  pub launchpad:    Option<String>,
  /// Landpad of the primary core. `None` means there was no landing site,
  /// not that a lookup failed.
  pub landpad:      Option<String>,
  pub payloads:     Vec<String>,
}

impl From<&LaunchRecord> for MissionDetails {
  fn from(record: &LaunchRecord) -> Self {
    Self {
      id:           record.id.clone(),
      mission_name: record.name.clone(),
      launch_date:  format_launch_date(&record.date_utc),
      upcoming:     record.upcoming,
      video:        record.links.webcast.clone(),
      article:      record.links.article.clone(),
      rocket:       record.rocket.clone(),
      launchpad:    record.launchpad.clone(),
      landpad:      record.landpad_id().map(str::to_string),
      payloads:     record.payloads.clone(),
    }
  }
}
