//! Retry gate for the initial launch load.
//!
//! The number of user-initiated retries is capped per session. The count is
//! kept in [`SessionStorage`] under [`RETRY_COUNT_KEY`] as a decimal string,
//! only ever increases, and resets only when a new session starts.

use std::sync::Arc;

use tracing::{debug, info};

use crate::{Error, Result, session::SessionStorage};

pub const RETRY_COUNT_KEY: &str = "retry-count";
pub const DEFAULT_MAX_RETRIES: u32 = 3;

#[derive(Clone)]
pub struct RetryGate {
  storage: Arc<dyn SessionStorage>,
  ceiling: u32,
}

impl RetryGate {
  pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
    Self::with_ceiling(storage, DEFAULT_MAX_RETRIES)
  }

  pub fn with_ceiling(storage: Arc<dyn SessionStorage>, ceiling: u32) -> Self {
    Self { storage, ceiling }
  }

  pub fn ceiling(&self) -> u32 { self.ceiling }

  /// Retries used so far this session. Garbage in storage reads as zero.
  pub fn count(&self) -> u32 {
    self
      .storage
      .get(RETRY_COUNT_KEY)
      .and_then(|v| v.trim().parse().ok())
      .unwrap_or(0)
  }

  pub fn remaining_retries(&self) -> u32 { self.ceiling.saturating_sub(self.count()) }

  pub fn has_reached_limit(&self) -> bool { self.remaining_retries() == 0 }

  /// Spend one retry and run `retry`, or refuse without running it once the
  /// ceiling is reached.
  ///
  /// The counter is persisted before `retry` runs.
  pub fn attempt_retry<T>(&self, retry: impl FnOnce() -> T) -> Result<T> {
    let count = self.count();
    if count >= self.ceiling {
      info!(ceiling = self.ceiling, "retry limit reached");
      return Err(Error::RetryLimitReached {
        ceiling: self.ceiling,
      });
    }

    self.storage.set(RETRY_COUNT_KEY, &(count + 1).to_string())?;
    debug!(used = count + 1, ceiling = self.ceiling, "retrying initial load");
    Ok(retry())
  }
}
