//! Error types for `liftoff-core`.

use thiserror::Error;

use crate::metadata::ResourceKind;

#[derive(Debug, Error)]
pub enum Error {
  /// A metadata request was attempted without an id. Callers are expected
  /// to check before asking; this is a contract violation, not a user error.
  #[error("missing identifier for {kind} request")]
  MissingIdentifier { kind: ResourceKind },

  #[error("unknown mission: {0}")]
  UnknownMission(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
