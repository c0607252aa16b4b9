//! Memoisation of secondary metadata lookups.
//!
//! Entries are keyed by `"{kind}:{id}"` and written at most once. Upstream
//! metadata is historical, so nothing is ever expired or invalidated. Each key
//! owns a [`OnceCell`], so concurrent misses for the same key share a single
//! in-flight request. A failed request leaves the cell empty and the next
//! caller tries again.

use std::{
  collections::HashMap,
  sync::{Arc, Mutex, PoisonError},
};

use liftoff_core::metadata::{Landpad, Launchpad, ResourceKind, Rocket, decode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::{Result, source::LaunchSource};

/// A parsed metadata body, shared between the cache and its readers.
pub type MetadataRecord = Arc<Value>;

pub struct MetadataCache<S> {
  source:  Arc<S>,
  entries: Mutex<HashMap<String, Arc<OnceCell<MetadataRecord>>>>,
}

impl<S: LaunchSource> MetadataCache<S> {
  pub fn new(source: Arc<S>) -> Self {
    Self {
      source,
      entries: Mutex::new(HashMap::new()),
    }
  }

  /// Return the metadata for `kind`/`id`, fetching it on first use.
  ///
  /// Fails with `MissingIdentifier` before touching the network when `id` is
  /// absent or blank.
  pub async fn fetch_metadata(
    &self,
    kind: ResourceKind,
    id: Option<&str>,
  ) -> Result<MetadataRecord> {
    let id = kind.require_id(id)?;
    let key = kind.cache_key(id);
    let cell = self.cell(&key);

    if let Some(hit) = cell.get() {
      debug!(%key, "metadata cache hit");
      return Ok(hit.clone());
    }

    let record = cell
      .get_or_try_init(|| async {
        debug!(%key, "metadata cache miss");
        self.source.fetch_resource(kind, id).await.map(Arc::new)
      })
      .await?;
    Ok(record.clone())
  }

  pub async fn rocket(&self, id: Option<&str>) -> Result<Rocket> {
    self.fetch_typed(ResourceKind::Rockets, id).await
  }

  pub async fn launchpad(&self, id: Option<&str>) -> Result<Launchpad> {
    self.fetch_typed(ResourceKind::Launchpads, id).await
  }

  pub async fn landpad(&self, id: Option<&str>) -> Result<Landpad> {
    self.fetch_typed(ResourceKind::Landpads, id).await
  }

  async fn fetch_typed<T: DeserializeOwned>(
    &self,
    kind: ResourceKind,
    id: Option<&str>,
  ) -> Result<T> {
    let record = self.fetch_metadata(kind, id).await?;
    Ok(decode(&record)?)
  }

  /// Whether a value is stored for `kind`/`id`.
  pub fn contains(&self, kind: ResourceKind, id: &str) -> bool {
    self
      .lock()
      .get(&kind.cache_key(id))
      .is_some_and(|cell| cell.initialized())
  }

  /// Number of populated entries.
  pub fn len(&self) -> usize {
    self
      .lock()
      .values()
      .filter(|cell| cell.initialized())
      .count()
  }

  pub fn is_empty(&self) -> bool { self.len() == 0 }

  fn cell(&self, key: &str) -> Arc<OnceCell<MetadataRecord>> {
    self
      .lock()
      .entry(key.to_string())
      .or_insert_with(|| Arc::new(OnceCell::new()))
      .clone()
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<OnceCell<MetadataRecord>>>> {
    // The map is only touched for lookups, so a poisoned guard is still
    // consistent.
    self.entries.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use serde_json::json;

  use super::*;
  use crate::{Error, testutils::FakeSource};

  fn cache(source: FakeSource) -> (Arc<FakeSource>, MetadataCache<FakeSource>) {
    let source = Arc::new(source);
    (source.clone(), MetadataCache::new(source))
  }

  #[tokio::test]
  async fn second_call_is_served_from_cache() {
    let (source, cache) = cache(
      FakeSource::new().with_resource(ResourceKind::Rockets, "f9", json!({"id": "f9"})),
    );

    let first = cache.fetch_metadata(ResourceKind::Rockets, Some("f9")).await.unwrap();
    let second = cache.fetch_metadata(ResourceKind::Rockets, Some("f9")).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(source.requests_for(ResourceKind::Rockets, "f9"), 1);
    assert!(cache.contains(ResourceKind::Rockets, "f9"));
    assert_eq!(cache.len(), 1);
  }

  #[tokio::test]
  async fn missing_id_fails_before_any_request() {
    let (source, cache) = cache(FakeSource::new());

    for id in [None, Some(""), Some("   ")] {
      let err = cache.fetch_metadata(ResourceKind::Landpads, id).await.unwrap_err();
      assert!(matches!(
        err,
        Error::Core(liftoff_core::Error::MissingIdentifier {
          kind: ResourceKind::Landpads
        })
      ));
    }
    assert_eq!(source.resource_requests(), 0);
    assert!(cache.is_empty());
  }

  #[tokio::test]
  async fn upstream_failure_is_not_cached() {
    let (source, cache) = cache(FakeSource::new().failing(ResourceKind::Rockets, "bad", 500));

    for _ in 0..2 {
      let err = cache.fetch_metadata(ResourceKind::Rockets, Some("bad")).await.unwrap_err();
      assert_eq!(err.status(), Some(500));
      assert!(err.is_network_failure());
    }
    assert_eq!(source.requests_for(ResourceKind::Rockets, "bad"), 2);
    assert!(!cache.contains(ResourceKind::Rockets, "bad"));
  }

  #[tokio::test(start_paused = true)]
  async fn concurrent_misses_share_one_request() {
    let (source, cache) = cache(
      FakeSource::new()
        .with_resource(ResourceKind::Launchpads, "lc39", json!({"id": "lc39"}))
        .delayed(ResourceKind::Launchpads, "lc39", Duration::from_millis(200)),
    );

    let (a, b, c) = tokio::join!(
      cache.fetch_metadata(ResourceKind::Launchpads, Some("lc39")),
      cache.fetch_metadata(ResourceKind::Launchpads, Some("lc39")),
      cache.fetch_metadata(ResourceKind::Launchpads, Some("lc39")),
    );

    assert!(a.is_ok() && b.is_ok() && c.is_ok());
    assert_eq!(source.requests_for(ResourceKind::Launchpads, "lc39"), 1);
  }

  #[tokio::test]
  async fn same_id_under_different_kinds_are_separate_entries() {
    let (source, cache) = cache(
      FakeSource::new()
        .with_resource(ResourceKind::Rockets, "x", json!({"id": "x", "name": "rocket"}))
        .with_resource(ResourceKind::Landpads, "x", json!({"id": "x", "name": "pad"})),
    );

    let rocket = cache.rocket(Some("x")).await.unwrap();
    let landpad = cache.landpad(Some("x")).await.unwrap();

    assert_eq!(rocket.name, "rocket");
    assert_eq!(landpad.name, "pad");
    assert_eq!(source.resource_requests(), 2);
  }

  #[tokio::test]
  async fn typed_lookup_reports_shape_mismatch() {
    let (_source, cache) = cache(
      FakeSource::new().with_resource(ResourceKind::Rockets, "odd", json!({"name": 7})),
    );
    let err = cache.rocket(Some("odd")).await.unwrap_err();
    assert!(matches!(
      err,
      Error::Core(liftoff_core::Error::Serialization(_))
    ));
    // The raw body is still cached; only the typed view failed.
    assert!(cache.contains(ResourceKind::Rockets, "odd"));
  }
}
