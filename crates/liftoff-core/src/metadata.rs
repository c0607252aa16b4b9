//! Secondary metadata: rockets, launchpads and landpads.
//!
//! These are fetched lazily from `GET {base}{kind}/{id}` once a mission is
//! selected. The raw JSON body is what gets cached; the typed views below are
//! decoded from it on demand.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::{Error, Result, stats::progress_value};

// ─── Resource kinds ──────────────────────────────────────────────────────────

/// The category segment of the metadata endpoint path.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
  EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ResourceKind {
  Rockets,
  Launchpads,
  Landpads,
  Payloads,
  Cores,
}

impl ResourceKind {
  /// Validate an optional id for a request of this kind.
  ///
  /// Empty or whitespace-only ids count as missing.
  pub fn require_id(self, id: Option<&str>) -> Result<&str> {
    match id.map(str::trim) {
      Some(id) if !id.is_empty() => Ok(id),
      _ => Err(Error::MissingIdentifier { kind: self }),
    }
  }

  /// The memoisation key for `id` under this kind, e.g. `rockets:5e9d…`.
  pub fn cache_key(self, id: &str) -> String { format!("{self}:{id}") }
}

/// Decode a cached JSON body into one of the typed views.
pub fn decode<T: DeserializeOwned>(value: &serde_json::Value) -> Result<T> {
  Ok(T::deserialize(value)?)
}

// ─── Typed views ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rocket {
  pub id:               String,
  #[serde(default)]
  pub name:             String,
  #[serde(default)]
  pub stages:           Option<u32>,
  #[serde(default)]
  pub first_flight:     Option<String>,
  #[serde(default)]
  pub description:      Option<String>,
  #[serde(default)]
  pub success_rate_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Launchpad {
  pub id:               String,
  #[serde(default)]
  pub name:             String,
  #[serde(default)]
  pub full_name:        Option<String>,
  #[serde(default)]
  pub locality:         Option<String>,
  #[serde(default)]
  pub region:           Option<String>,
  #[serde(default)]
  pub launch_attempts:  Option<u32>,
  #[serde(default)]
  pub launch_successes: Option<u32>,
  #[serde(default)]
  pub details:          Option<String>,
}

impl Launchpad {
  /// Launch success rate as a rounded-up percentage.
  pub fn success_progress(&self) -> Option<u32> {
    progress_value(self.launch_successes, self.launch_attempts)
  }

  pub fn site(&self) -> Option<String> { join_site(&self.locality, &self.region) }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Landpad {
  pub id:                String,
  #[serde(default)]
  pub name:              String,
  #[serde(default)]
  pub full_name:         Option<String>,
  #[serde(default)]
  pub locality:          Option<String>,
  #[serde(default)]
  pub region:            Option<String>,
  #[serde(default)]
  pub landing_attempts:  Option<u32>,
  #[serde(default)]
  pub landing_successes: Option<u32>,
  #[serde(default)]
  pub details:           Option<String>,
}

impl Landpad {
  pub fn success_progress(&self) -> Option<u32> {
    progress_value(self.landing_successes, self.landing_attempts)
  }

  pub fn site(&self) -> Option<String> { join_site(&self.locality, &self.region) }
}

fn join_site(locality: &Option<String>, region: &Option<String>) -> Option<String> {
  match (locality.as_deref(), region.as_deref()) {
    (Some(l), Some(r)) => Some(format!("{l}, {r}")),
    (Some(one), None) | (None, Some(one)) => Some(one.to_string()),
    (None, None) => None,
  }
}
