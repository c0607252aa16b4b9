//! End-to-end tests for `Browser`, against the in-memory fake and against a
//! local axum server standing in for the upstream API.

use std::{
  fs,
  sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
  },
  time::Duration,
};

use axum::{
  Json, Router,
  extract::{Path, State},
  http::StatusCode,
  routing::get,
};
use liftoff_core::metadata::ResourceKind;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use crate::{
  Browser, Error, FileSession, HttpSource, LaunchSource, LoadStatus, MemorySession,
  MetadataCache, Phase, RetryGate, SourceConfig,
  browser::{RETRY_LIMIT_MESSAGE, RETRY_UNAVAILABLE_MESSAGE},
  testutils::{FakeSource, launch, source_for, with_landpad},
};

fn browser(source: FakeSource) -> (Arc<FakeSource>, Browser<FakeSource>) {
  let source = Arc::new(source);
  let gate = RetryGate::new(Arc::new(MemorySession::new()));
  (source.clone(), Browser::new(source, gate))
}

// ─── Initial load ────────────────────────────────────────────────────────────

#[tokio::test]
async fn load_derives_groups_and_stats() {
  let mut done = launch("1", "2022-01-01", false);
  done.success = Some(true);
  done.cores[0].reused = Some(true);
  let launches = vec![done, launch("2", "2023-01-01", true)];
  let (source, mut browser) = browser(FakeSource::new().with_launches(launches));

  assert_eq!(browser.status(), LoadStatus::Loading);
  browser.load().await.unwrap();

  assert_eq!(browser.status(), LoadStatus::Success);
  let groups = browser.groups();
  assert!(groups.active.is_empty());
  assert_eq!(groups.past.len(), 1);
  assert_eq!(groups.past[0].id, "1");
  assert_eq!(groups.upcoming.len(), 1);
  assert_eq!(groups.upcoming[0].id, "2");
  assert_eq!(groups.past[0].launch_date, "Jan 01, 2022");

  let stats = browser.stats();
  assert_eq!((stats.completed, stats.total, stats.reflights), (1, 2, 1));
  assert_eq!(browser.missions().len(), 2);
  assert_eq!(source.launch_requests(), 1);
}

#[tokio::test]
async fn failed_load_sets_error_status() {
  let (_, mut browser) = browser(FakeSource::new());

  let err = browser.load().await.unwrap_err();
  assert!(err.is_network_failure());
  assert_eq!(browser.status(), LoadStatus::Error);
  assert!(browser.groups().is_empty());
}

#[tokio::test]
async fn refetch_that_drops_selected_launch_clears_selection() {
  let launches = vec![launch("a", "2020-01-01", false), launch("b", "2021-01-01", false)];
  let (source, mut browser) = browser(source_for(&["a", "b"], launches));
  browser.load().await.unwrap();

  let pending = browser.select_mission("a").unwrap();
  browser.settle(pending.resolve().await);
  assert_eq!(browser.selected_id(), Some("a"));

  source.set_launches(Some(vec![launch("b", "2021-01-01", false)]));
  browser.load().await.unwrap();
  assert_eq!(browser.selected_id(), None);
  assert_eq!(browser.phase(), Phase::Idle);
}

// ─── Retry gate ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn retry_recovers_after_upstream_comes_back() {
  let (source, mut browser) = browser(FakeSource::new());
  assert!(browser.load().await.is_err());

  source.set_launches(Some(vec![launch("a", "2020-01-01", false)]));
  browser.retry_initial_load().await.unwrap();

  assert_eq!(browser.status(), LoadStatus::Success);
  assert_eq!(browser.retry_gate().remaining_retries(), 2);
  assert_eq!(source.launch_requests(), 2);
}

#[tokio::test]
async fn exhausted_retries_skip_the_fetch_and_raise_a_notice() {
  let (source, mut browser) = browser(FakeSource::new());
  assert!(browser.load().await.is_err());

  for _ in 0..3 {
    assert!(browser.retry_initial_load().await.unwrap_err().is_network_failure());
  }
  assert_eq!(browser.retry_gate().remaining_retries(), 0);
  assert!(browser.notice().is_none());

  let err = browser.retry_initial_load().await.unwrap_err();
  assert!(matches!(err, Error::RetryLimitReached { ceiling: 3 }));
  assert_eq!(source.launch_requests(), 4);
  assert_eq!(browser.status(), LoadStatus::Error);

  let notice = browser.notice().cloned().unwrap();
  assert_eq!(notice.message, RETRY_LIMIT_MESSAGE);

  browser.expire_notice(notice.expires_at - Duration::from_millis(1));
  assert!(browser.notice().is_some());
  browser.expire_notice(notice.expires_at);
  assert!(browser.notice().is_none());
}

#[tokio::test]
async fn unwritable_session_is_not_reported_as_limit() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("session.json");
  let session = FileSession::open(&path).unwrap();
  fs::create_dir(&path).unwrap();

  let source = Arc::new(FakeSource::new());
  let mut browser = Browser::new(source.clone(), RetryGate::new(Arc::new(session)));
  assert!(browser.load().await.is_err());

  let err = browser.retry_initial_load().await.unwrap_err();
  assert!(matches!(err, Error::Session(_)));
  assert_eq!(browser.retry_gate().remaining_retries(), 3);
  assert_eq!(source.launch_requests(), 1);
  assert_eq!(browser.status(), LoadStatus::Error);
  assert_eq!(
    browser.notice().map(|n| n.message.as_str()),
    Some(RETRY_UNAVAILABLE_MESSAGE)
  );
}

#[tokio::test]
async fn begin_retry_shows_loading_until_finished() {
  let (source, mut browser) = browser(FakeSource::new());
  assert!(browser.load().await.is_err());
  source.set_launches(Some(vec![launch("a", "2020-01-01", false)]));

  let pending = browser.begin_retry().unwrap();
  assert_eq!(browser.status(), LoadStatus::Loading);
  assert_eq!(browser.retry_gate().remaining_retries(), 2);

  let result = pending.fetch().await;
  browser.finish_load(result).unwrap();
  assert_eq!(browser.status(), LoadStatus::Success);
  assert_eq!(browser.launches().len(), 1);
}

// ─── Selection scenarios ─────────────────────────────────────────────────────

#[tokio::test]
async fn selected_details_follow_the_selection() {
  let mut record = with_landpad(launch("a", "2022-10-06T00:00:00Z", false), "lz-a");
  record.links.webcast = Some("https://youtu.be/abc".into());
  let (_, mut browser) = browser(source_for(&["a"], vec![record]));
  browser.load().await.unwrap();

  assert!(browser.selected_details().is_none());
  let pending = browser.select_mission("a").unwrap();
  let details = browser.selected_details().unwrap();
  assert_eq!(details.launch_date, "Oct 06, 2022");
  assert_eq!(details.video.as_deref(), Some("https://youtu.be/abc"));
  assert!(browser.metadata().is_loading);

  assert!(browser.settle(pending.resolve().await));
  assert_eq!(browser.metadata().landpad.as_ref().unwrap().id, "lz-a");
  assert_eq!(browser.selection().selected_mission_id.as_deref(), Some("a"));

  browser.clear_selection();
  assert!(browser.selected_details().is_none());
  assert_eq!(browser.phase(), Phase::Idle);
}

#[tokio::test]
async fn rocket_500_still_yields_launchpad() {
  let launches = vec![launch("a", "2020-01-01", false)];
  let (_, mut browser) = browser(
    source_for(&["a"], launches).failing(ResourceKind::Rockets, "rocket-a", 500),
  );
  browser.load().await.unwrap();

  let pending = browser.select_mission("a").unwrap();
  browser.settle(pending.resolve().await);

  let meta = browser.metadata();
  assert!(meta.rocket.is_none());
  assert!(meta.launchpad.is_some());
  assert!(meta.landpad.is_none());
  assert!(!meta.is_loading);
}

#[tokio::test(start_paused = true)]
async fn spawned_cycles_settle_last_selection_wins() {
  let launches = vec![launch("a", "2020-01-01", false), launch("b", "2021-01-01", false)];
  let source = source_for(&["a", "b"], launches)
    .delayed(ResourceKind::Launchpads, "pad-a", Duration::from_secs(2));
  let (_, mut browser) = browser(source);
  browser.load().await.unwrap();

  let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
  for id in ["a", "b"] {
    let pending = browser.select_mission(id).unwrap();
    let tx = tx.clone();
    tokio::spawn(async move {
      let _ = tx.send(pending.resolve().await);
    });
  }
  drop(tx);

  let mut applied = Vec::new();
  while let Some(resolution) = rx.recv().await {
    let id = resolution.mission_id.clone();
    if browser.settle(resolution) {
      applied.push(id);
    }
  }

  assert_eq!(applied, ["b"]);
  assert_eq!(browser.metadata().launchpad.as_ref().unwrap().id, "pad-b");
}

// ─── HTTP source against a local server ──────────────────────────────────────

#[derive(Clone, Default)]
struct Hits {
  launches:  Arc<AtomicUsize>,
  resources: Arc<AtomicUsize>,
}

async fn launches_handler(State(hits): State<Hits>) -> Json<Value> {
  hits.launches.fetch_add(1, Ordering::SeqCst);
  Json(json!([
    {
      "id": "1",
      "name": "Old",
      "date_utc": "2022-01-01T00:00:00.000Z",
      "upcoming": false,
      "success": true,
      "cores": [{ "flight": 3, "reused": true, "landpad": "lz1" }],
      "links": { "webcast": "https://youtu.be/x", "article": null },
      "rocket": "falcon9",
      "launchpad": "slc40",
      "payloads": []
    },
    {
      "id": "2",
      "name": "New",
      "date_utc": "2023-01-01T00:00:00.000Z",
      "upcoming": true,
      "success": null,
      "cores": [{ "flight": null, "reused": null }],
      "links": {},
      "rocket": "broken",
      "launchpad": "slc40",
      "payloads": []
    }
  ]))
}

async fn resource_handler(
  State(hits): State<Hits>,
  Path((kind, id)): Path<(String, String)>,
) -> Result<Json<Value>, (StatusCode, String)> {
  hits.resources.fetch_add(1, Ordering::SeqCst);
  match (kind.as_str(), id.as_str()) {
    ("rockets", "falcon9") => Ok(Json(json!({ "id": "falcon9", "name": "Falcon 9" }))),
    ("launchpads", "slc40") => Ok(Json(json!({ "id": "slc40", "name": "CCSFS SLC 40" }))),
    ("landpads", "lz1") => Ok(Json(json!({ "id": "lz1", "name": "LZ-1" }))),
    ("rockets", "broken") => Err((StatusCode::INTERNAL_SERVER_ERROR, "boom".into())),
    _ => Err((StatusCode::NOT_FOUND, "not found".into())),
  }
}

async fn spawn_api() -> (Hits, SourceConfig) {
  let hits = Hits::default();
  let app = Router::new()
    .route("/v5/launches", get(launches_handler))
    .route("/v4/{kind}/{id}", get(resource_handler))
    .route("/garbled/launches", get(|| async { "this is not json" }))
    .with_state(hits.clone());

  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  tokio::spawn(async move {
    axum::serve(listener, app).await.unwrap();
  });

  let config = SourceConfig {
    launches_url: format!("http://{addr}/v5/launches"),
    metadata_url: format!("http://{addr}/v4/"),
  };
  (hits, config)
}

#[tokio::test]
async fn http_source_end_to_end() {
  let (hits, config) = spawn_api().await;
  let source = Arc::new(HttpSource::new(config).unwrap());
  let gate = RetryGate::new(Arc::new(MemorySession::new()));
  let mut browser = Browser::new(source, gate);

  browser.load().await.unwrap();
  assert_eq!(browser.groups().past[0].id, "1");
  assert_eq!(browser.groups().upcoming[0].id, "2");

  let pending = browser.select_mission("1").unwrap();
  browser.settle(pending.resolve().await);
  let meta = browser.metadata();
  assert_eq!(meta.rocket.as_ref().unwrap().name, "Falcon 9");
  assert_eq!(meta.launchpad.as_ref().unwrap().name, "CCSFS SLC 40");
  assert_eq!(meta.landpad.as_ref().unwrap().name, "LZ-1");
  assert_eq!(hits.resources.load(Ordering::SeqCst), 3);

  // Mission 2 shares the launchpad (cached), has a failing rocket and no
  // landpad.
  let pending = browser.select_mission("2").unwrap();
  browser.settle(pending.resolve().await);
  let meta = browser.metadata();
  assert!(meta.rocket.is_none());
  assert_eq!(meta.launchpad.as_ref().unwrap().id, "slc40");
  assert!(meta.landpad.is_none());
  assert_eq!(hits.resources.load(Ordering::SeqCst), 4);
  assert_eq!(hits.launches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn http_cache_issues_one_request_per_key() {
  let (hits, config) = spawn_api().await;
  let cache = MetadataCache::new(Arc::new(HttpSource::new(config).unwrap()));

  for _ in 0..3 {
    let rocket = cache.rocket(Some("falcon9")).await.unwrap();
    assert_eq!(rocket.name, "Falcon 9");
  }
  assert_eq!(hits.resources.load(Ordering::SeqCst), 1);

  let err = cache.fetch_metadata(ResourceKind::Rockets, Some("broken")).await.unwrap_err();
  assert!(matches!(err, Error::Upstream { status: 500, .. }));
  let err = cache.fetch_metadata(ResourceKind::Cores, Some("none")).await.unwrap_err();
  assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn http_source_reports_undecodable_bodies() {
  let (_, mut config) = spawn_api().await;
  config.launches_url = config.launches_url.replace("/v5/", "/garbled/");
  let source = HttpSource::new(config).unwrap();

  let err = source.fetch_launches().await.unwrap_err();
  assert!(matches!(err, Error::Decode { .. }));
  assert!(err.is_network_failure());
}

#[tokio::test]
async fn http_source_reports_unreachable_hosts() {
  // Bind then drop to get a port nobody listens on.
  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  drop(listener);

  let source = HttpSource::new(SourceConfig {
    launches_url: format!("http://{addr}/v5/launches"),
    metadata_url: format!("http://{addr}/v4/"),
  })
  .unwrap();

  let err = source.fetch_launches().await.unwrap_err();
  assert!(matches!(err, Error::Network(_)));
  assert_eq!(err.status(), None);
}
