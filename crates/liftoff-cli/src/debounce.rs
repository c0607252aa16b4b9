//! Timer-reset debouncing for search input.

use std::time::{Duration, Instant};

/// Holds the latest pushed value until `delay` passes with no further push.
#[derive(Debug)]
pub struct Debouncer<T> {
  delay:   Duration,
  pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
  pub fn new(delay: Duration) -> Self {
    Self {
      delay,
      pending: None,
    }
  }

  /// Replace the pending value and restart the delay.
  pub fn push(&mut self, value: T, now: Instant) { self.pending = Some((value, now + self.delay)); }

  /// Take the pending value if its delay has elapsed.
  pub fn poll(&mut self, now: Instant) -> Option<T> {
    let due = self.pending.as_ref().is_some_and(|(_, due)| now >= *due);
    if due { self.flush() } else { None }
  }

  /// Take the pending value without waiting.
  pub fn flush(&mut self) -> Option<T> { self.pending.take().map(|(value, _)| value) }

  pub fn cancel(&mut self) { self.pending = None; }

  pub fn is_pending(&self) -> bool { self.pending.is_some() }
}
