//! Mission data orchestration for Liftoff.
//!
//! Fetches the launch list, memoises secondary metadata lookups, tracks the
//! selected mission and gates retries of the initial load. Rendering is the
//! caller's business: everything here is exposed as plain data through
//! [`Browser`].

pub mod browser;
pub mod cache;
pub mod error;
pub mod retry;
pub mod selection;
pub mod session;
pub mod source;

pub use browser::{Browser, LoadStatus, Notice, PendingLoad};
pub use cache::MetadataCache;
pub use error::{Error, Result};
pub use retry::RetryGate;
pub use selection::{PendingFetch, Phase, Resolution, SecondaryMetadata, SelectionCoordinator};
pub use session::{FileSession, MemorySession, SessionStorage};
pub use source::{HttpSource, LaunchSource, SourceConfig};

#[cfg(test)]
mod testutils;

#[cfg(test)]
mod tests;
