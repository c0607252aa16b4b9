//! Error type for `liftoff-client`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] liftoff_core::Error),

  /// The request never produced a response (DNS, connect, timeout, …).
  #[error("request failed: {0}")]
  Network(#[from] reqwest::Error),

  #[error("GET {url} returned {status}")]
  Upstream { url: String, status: u16 },

  #[error("could not decode response from {url}: {source}")]
  Decode {
    url:    String,
    #[source]
    source: serde_json::Error,
  },

  #[error("retry limit of {ceiling} reached")]
  RetryLimitReached { ceiling: u32 },

  #[error("session storage error: {0}")]
  Session(#[from] std::io::Error),
}

impl Error {
  /// Whether this is a failure to obtain data from upstream, as opposed to a
  /// local contract violation.
  pub fn is_network_failure(&self) -> bool {
    matches!(
      self,
      Error::Network(_) | Error::Upstream { .. } | Error::Decode { .. }
    )
  }

  /// The upstream HTTP status, when there was one.
  pub fn status(&self) -> Option<u16> {
    match self {
      Error::Upstream { status, .. } => Some(*status),
      Error::Network(e) => e.status().map(|s| s.as_u16()),
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
