//! The presentation boundary.
//!
//! [`Browser`] owns the launch list and everything derived from it, and is the
//! only type a front end needs to talk to. Its entry points are
//! [`Browser::load`], [`Browser::select_mission`], [`Browser::clear_selection`]
//! and [`Browser::retry_initial_load`]; everything else is read-only state.

use std::{
  sync::Arc,
  time::{Duration, Instant},
};

use liftoff_core::{
  groups::{MissionGroups, build_groups},
  launch::{LaunchRecord, MissionDetails, find_launch},
  mission::{NormalizedMission, normalize},
  stats::LaunchStats,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::{
  Error, Result,
  cache::MetadataCache,
  retry::RetryGate,
  selection::{PendingFetch, Phase, Resolution, SecondaryMetadata, SelectionCoordinator, SelectionState},
  source::LaunchSource,
};

/// How long a transient notice stays up.
pub const NOTICE_DURATION: Duration = Duration::from_secs(3);

pub const RETRY_LIMIT_MESSAGE: &str = "Retry limit reached. Please try again later.";
pub const RETRY_UNAVAILABLE_MESSAGE: &str = "Could not start a retry. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
  Loading,
  Success,
  Error,
}

/// A short-lived user notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
  pub message:    String,
  pub expires_at: Instant,
}

impl Notice {
  pub fn new(message: impl Into<String>, now: Instant) -> Self {
    Self {
      message:    message.into(),
      expires_at: now + NOTICE_DURATION,
    }
  }

  pub fn is_expired(&self, now: Instant) -> bool { now >= self.expires_at }
}

/// A granted refetch of the launch list. Owns everything it needs, so it
/// can be spawned.
pub struct PendingLoad<S> {
  source: Arc<S>,
}

impl<S: LaunchSource> PendingLoad<S> {
  pub async fn fetch(self) -> Result<Vec<LaunchRecord>> { self.source.fetch_launches().await }
}

// ─── Browser ─────────────────────────────────────────────────────────────────

pub struct Browser<S> {
  source:      Arc<S>,
  retry_gate:  RetryGate,
  status:      LoadStatus,
  launches:    Vec<LaunchRecord>,
  missions:    Vec<NormalizedMission>,
  groups:      MissionGroups,
  stats:       LaunchStats,
  coordinator: SelectionCoordinator<S>,
  notice:      Option<Notice>,
}

impl<S: LaunchSource> Browser<S> {
  /// Create a browser in the `Loading` state with no data. Call
  /// [`Browser::load`] to populate it.
  pub fn new(source: Arc<S>, retry_gate: RetryGate) -> Self {
    let cache = Arc::new(MetadataCache::new(source.clone()));
    Self {
      source,
      retry_gate,
      status: LoadStatus::Loading,
      launches: Vec::new(),
      missions: Vec::new(),
      groups: MissionGroups::default(),
      stats: LaunchStats::default(),
      coordinator: SelectionCoordinator::new(cache),
      notice: None,
    }
  }

  // ── Loading ───────────────────────────────────────────────────────────────

  /// Fetch the launch list. On failure the previous data is kept and the
  /// status becomes `Error`.
  pub async fn load(&mut self) -> Result<()> {
    self.status = LoadStatus::Loading;
    let result = self.source.fetch_launches().await;
    self.apply_launches(result)
  }

  /// Re-run [`Browser::load`] if the session still has retries left.
  /// Otherwise nothing is fetched and a notice is raised.
  pub async fn retry_initial_load(&mut self) -> Result<()> {
    let pending = self.begin_retry()?;
    let result = pending.fetch().await;
    self.apply_launches(result)
  }

  /// Spend a retry and hand back the refetch without running it, so a front
  /// end can keep drawing while it is in flight. Pass its result to
  /// [`Browser::finish_load`].
  ///
  /// Status becomes `Loading` only once the retry is granted.
  pub fn begin_retry(&mut self) -> Result<PendingLoad<S>> {
    let source = self.source.clone();
    match self.retry_gate.attempt_retry(|| PendingLoad { source }) {
      Ok(pending) => {
        self.status = LoadStatus::Loading;
        Ok(pending)
      }
      Err(e @ Error::RetryLimitReached { .. }) => {
        self.notice = Some(Notice::new(RETRY_LIMIT_MESSAGE, Instant::now()));
        Err(e)
      }
      Err(e) => {
        error!(error = %e, "could not record retry attempt");
        self.notice = Some(Notice::new(RETRY_UNAVAILABLE_MESSAGE, Instant::now()));
        Err(e)
      }
    }
  }

  /// Apply the outcome of a [`PendingLoad`].
  pub fn finish_load(&mut self, result: Result<Vec<LaunchRecord>>) -> Result<()> {
    self.apply_launches(result)
  }

  fn apply_launches(&mut self, result: Result<Vec<LaunchRecord>>) -> Result<()> {
    match result {
      Ok(launches) => {
        info!(count = launches.len(), "loaded launches");
        self.missions = normalize(&launches);
        self.groups = build_groups(&self.missions);
        self.stats = LaunchStats::from_launches(&launches);
        self.launches = launches;
        self.status = LoadStatus::Success;

        // A refetch can drop the selected launch; don't keep pointing at it.
        let orphaned = self
          .coordinator
          .selected_id()
          .is_some_and(|id| find_launch(&self.launches, id).is_none());
        if orphaned {
          self.coordinator.clear();
        }
        Ok(())
      }
      Err(e) => {
        error!(error = %e, "failed to load launches");
        self.status = LoadStatus::Error;
        Err(e)
      }
    }
  }

  // ── Selection ─────────────────────────────────────────────────────────────

  /// Select a mission and return the fetch cycle for its metadata. The
  /// caller runs [`PendingFetch::resolve`] and passes the result to
  /// [`Browser::settle`].
  pub fn select_mission(&mut self, id: &str) -> Result<PendingFetch<S>> {
    self.coordinator.select(&self.launches, id)
  }

  pub fn clear_selection(&mut self) { self.coordinator.clear(); }

  /// Apply a finished fetch cycle. Stale cycles are ignored; returns whether
  /// this one was applied.
  pub fn settle(&mut self, resolution: Resolution) -> bool { self.coordinator.settle(resolution) }

  // ── Notices ───────────────────────────────────────────────────────────────

  pub fn notice(&self) -> Option<&Notice> { self.notice.as_ref() }

  /// Drop the current notice once it has expired.
  pub fn expire_notice(&mut self, now: Instant) {
    if self.notice.as_ref().is_some_and(|n| n.is_expired(now)) {
      self.notice = None;
    }
  }

  // ── Read-only state ───────────────────────────────────────────────────────

  pub fn status(&self) -> LoadStatus { self.status }

  pub fn launches(&self) -> &[LaunchRecord] { &self.launches }

  pub fn missions(&self) -> &[NormalizedMission] { &self.missions }

  pub fn groups(&self) -> &MissionGroups { &self.groups }

  pub fn stats(&self) -> LaunchStats { self.stats }

  pub fn selection(&self) -> &SelectionState { self.coordinator.selection() }

  pub fn selected_id(&self) -> Option<&str> { self.coordinator.selected_id() }

  pub fn phase(&self) -> Phase { self.coordinator.phase() }

  pub fn metadata(&self) -> &SecondaryMetadata { self.coordinator.metadata() }

  /// Detail projection of the selected launch.
  pub fn selected_details(&self) -> Option<MissionDetails> {
    let id = self.coordinator.selected_id()?;
    find_launch(&self.launches, id).map(MissionDetails::from)
  }

  pub fn retry_gate(&self) -> &RetryGate { &self.retry_gate }
}
