//! Summary counts shown above the mission lists.

use serde::{Deserialize, Serialize};

use crate::launch::LaunchRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchStats {
  /// Launches with `success == true`. Failures and unknowns don't count.
  pub completed: usize,
  pub total:     usize,
  /// Launches whose primary core had flown before.
  pub reflights: usize,
}

impl LaunchStats {
  pub fn from_launches(launches: &[LaunchRecord]) -> Self {
    Self {
      completed: launches.iter().filter(|l| l.success == Some(true)).count(),
      total:     launches.len(),
      reflights: launches
        .iter()
        .filter(|l| l.primary_core().and_then(|c| c.reused) == Some(true))
        .count(),
    }
  }
}

/// `successes / attempts` as a percentage, rounded up.
///
/// `None` when either side is unknown or there were no attempts.
pub fn progress_value(successes: Option<u32>, attempts: Option<u32>) -> Option<u32> {
  let (successes, attempts) = (u64::from(successes?), u64::from(attempts?));
  if attempts == 0 {
    return None;
  }
  // Integer ceiling: avoids float artefacts such as 0.4 * 100 = 40.000…01.
  // Upstream occasionally reports more successes than attempts.
  Some(u32::try_from((successes * 100).div_ceil(attempts)).unwrap_or(u32::MAX))
}

/// Zero-pad a count to at least three digits, one char per digit box.
pub fn format_digits(count: Option<usize>) -> Vec<char> {
  format!("{:03}", count.unwrap_or(0)).chars().collect()
}
