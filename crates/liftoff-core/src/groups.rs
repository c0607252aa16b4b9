//! Mission list builder. Partitions missions into browse groups.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::mission::NormalizedMission;

/// Missions grouped the way the browser shows them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionGroups {
  /// Always empty: the upstream API has no notion of an in-progress launch.
  pub active:   Vec<NormalizedMission>,
  /// Soonest first.
  pub upcoming: Vec<NormalizedMission>,
  /// Most recent first.
  pub past:     Vec<NormalizedMission>,
}

impl MissionGroups {
  pub fn len(&self) -> usize { self.active.len() + self.upcoming.len() + self.past.len() }

  pub fn is_empty(&self) -> bool { self.len() == 0 }
}

/// Partition by the `upcoming` flag and sort each side.
///
/// Sorting is stable, so missions sharing a date keep their input order.
/// Missions whose date cannot be parsed go last in both groups.
pub fn build_groups(missions: &[NormalizedMission]) -> MissionGroups {
  let (mut upcoming, mut past): (Vec<_>, Vec<_>) =
    missions.iter().cloned().partition(|m| m.upcoming);

  upcoming.sort_by(|a, b| by_date(a, b, false));
  past.sort_by(|a, b| by_date(a, b, true));

  MissionGroups {
    active: Vec::new(),
    upcoming,
    past,
  }
}

fn by_date(a: &NormalizedMission, b: &NormalizedMission, descending: bool) -> Ordering {
  compare_dates(a.launched_at(), b.launched_at(), descending)
}

fn compare_dates(
  a: Option<DateTime<Utc>>,
  b: Option<DateTime<Utc>>,
  descending: bool,
) -> Ordering {
  match (a, b) {
    (Some(a), Some(b)) if descending => b.cmp(&a),
    (Some(a), Some(b)) => a.cmp(&b),
    (Some(_), None) => Ordering::Less,
    (None, Some(_)) => Ordering::Greater,
    (None, None) => Ordering::Equal,
  }
}
