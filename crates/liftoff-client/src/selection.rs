//! Selection coordinator and secondary metadata fetcher.
//!
//! Selecting a mission bumps a generation counter and hands back a
//! [`PendingFetch`]. The caller drives it (inline or on a spawned task) and
//! feeds the [`Resolution`] back through [`SelectionCoordinator::settle`],
//! which drops anything produced for an older generation. Last selection
//! wins no matter in which order responses arrive.

use std::sync::Arc;

use liftoff_core::{
  launch::{LaunchRecord, find_launch},
  metadata::{Landpad, Launchpad, ResourceKind, Rocket},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{Result, cache::MetadataCache, source::LaunchSource};

// ─── State ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
  /// Nothing selected.
  Idle,
  /// A selection is set and its metadata fetch is in flight.
  Resolving,
  /// The fetch settled, possibly with some fields missing.
  Resolved,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
  pub selected_mission_id: Option<String>,
}

/// Rocket, launchpad and landpad for the selected mission.
///
/// Each field degrades to `None` independently. `landpad` is also `None` when
/// the mission simply has no landpad.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecondaryMetadata {
  pub rocket:     Option<Rocket>,
  pub launchpad:  Option<Launchpad>,
  pub landpad:    Option<Landpad>,
  pub is_loading: bool,
}

impl SecondaryMetadata {
  fn loading() -> Self {
    Self {
      is_loading: true,
      ..Self::default()
    }
  }
}

/// Ids resolved from the selected launch record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataIds {
  pub rocket:    Option<String>,
  pub launchpad: Option<String>,
  /// From the first core only.
  pub landpad:   Option<String>,
}

impl From<&LaunchRecord> for MetadataIds {
  fn from(record: &LaunchRecord) -> Self {
    Self {
      rocket:    record.rocket.clone(),
      launchpad: record.launchpad.clone(),
      landpad:   record.landpad_id().map(str::to_string),
    }
  }
}

// ─── Fetch cycle ─────────────────────────────────────────────────────────────

/// One secondary-metadata fetch cycle, not yet started.
pub struct PendingFetch<S> {
  pub generation: u64,
  pub mission_id: String,
  pub ids:        MetadataIds,
  cache:          Arc<MetadataCache<S>>,
}

/// The settled outcome of a [`PendingFetch`].
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
  pub generation: u64,
  pub mission_id: String,
  pub metadata:   SecondaryMetadata,
}

impl<S: LaunchSource> PendingFetch<S> {
  /// Fetch all three records concurrently. Never fails: each branch that
  /// errors is logged and left empty, and the landpad branch issues no
  /// request at all when there is no landpad id.
  pub async fn resolve(self) -> Resolution {
    let ids = &self.ids;
    let cache = &self.cache;

    let landpad = async {
      match ids.landpad.as_deref() {
        Some(id) => settled(ResourceKind::Landpads, cache.landpad(Some(id)).await),
        None => None,
      }
    };

    let (rocket, launchpad, landpad) = tokio::join!(
      cache.rocket(ids.rocket.as_deref()),
      cache.launchpad(ids.launchpad.as_deref()),
      landpad,
    );

    Resolution {
      generation: self.generation,
      mission_id: self.mission_id.clone(),
      metadata:   SecondaryMetadata {
        rocket:     settled(ResourceKind::Rockets, rocket),
        launchpad:  settled(ResourceKind::Launchpads, launchpad),
        landpad,
        is_loading: false,
      },
    }
  }
}

fn settled<T>(kind: ResourceKind, result: Result<T>) -> Option<T> {
  match result {
    Ok(value) => Some(value),
    Err(e) => {
      warn!(%kind, error = %e, "secondary metadata unavailable");
      None
    }
  }
}

// ─── Coordinator ─────────────────────────────────────────────────────────────

pub struct SelectionCoordinator<S> {
  cache:      Arc<MetadataCache<S>>,
  selection:  SelectionState,
  generation: u64,
  phase:      Phase,
  metadata:   SecondaryMetadata,
}

impl<S: LaunchSource> SelectionCoordinator<S> {
  pub fn new(cache: Arc<MetadataCache<S>>) -> Self {
    Self {
      cache,
      selection: SelectionState::default(),
      generation: 0,
      phase: Phase::Idle,
      metadata: SecondaryMetadata::default(),
    }
  }

  /// Select `id` and start a new fetch cycle, superseding any cycle still in
  /// flight. Re-selecting the current mission also starts a new cycle.
  ///
  /// Unknown ids are rejected and leave the current state untouched.
  pub fn select(&mut self, launches: &[LaunchRecord], id: &str) -> Result<PendingFetch<S>> {
    let record = find_launch(launches, id)
      .ok_or_else(|| liftoff_core::Error::UnknownMission(id.to_string()))?;

    self.generation += 1;
    self.selection.selected_mission_id = Some(record.id.clone());
    self.phase = Phase::Resolving;
    self.metadata = SecondaryMetadata::loading();
    debug!(mission = %record.id, generation = self.generation, "mission selected");

    Ok(PendingFetch {
      generation: self.generation,
      mission_id: record.id.clone(),
      ids:        MetadataIds::from(record),
      cache:      self.cache.clone(),
    })
  }

  /// Drop the selection. Results still in flight will be discarded.
  pub fn clear(&mut self) {
    self.generation += 1;
    self.selection = SelectionState::default();
    self.phase = Phase::Idle;
    self.metadata = SecondaryMetadata::default();
  }

  /// Apply `resolution` if it belongs to the current cycle. Returns whether
  /// it was applied.
  pub fn settle(&mut self, resolution: Resolution) -> bool {
    let current = resolution.generation == self.generation
      && self.selection.selected_mission_id.as_deref() == Some(resolution.mission_id.as_str());
    if !current {
      debug!(
        mission = %resolution.mission_id,
        generation = resolution.generation,
        current = self.generation,
        "discarding stale metadata"
      );
      return false;
    }

    self.metadata = resolution.metadata;
    self.phase = Phase::Resolved;
    true
  }

  pub fn selection(&self) -> &SelectionState { &self.selection }

  pub fn selected_id(&self) -> Option<&str> { self.selection.selected_mission_id.as_deref() }

  pub fn phase(&self) -> Phase { self.phase }

  pub fn metadata(&self) -> &SecondaryMetadata { &self.metadata }

  pub fn generation(&self) -> u64 { self.generation }

  pub fn cache(&self) -> &Arc<MetadataCache<S>> { &self.cache }
}
