use std::{
  collections::HashMap,
  future::Future,
  sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
  },
  time::Duration,
};

use liftoff_core::{
  launch::{Core, LaunchLinks, LaunchRecord},
  metadata::ResourceKind,
};
use serde_json::{Value, json};

use crate::{Error, Result, source::LaunchSource};

/// In-memory [`LaunchSource`] that counts requests and can be told to fail
/// or stall per key.
#[derive(Default)]
pub struct FakeSource {
  launches:        Mutex<Option<Vec<LaunchRecord>>>,
  resources:       HashMap<String, Value>,
  failures:        HashMap<String, u16>,
  delays:          HashMap<String, Duration>,
  requests:        Mutex<Vec<String>>,
  launch_requests: AtomicUsize,
}

impl FakeSource {
  pub fn new() -> Self { Self::default() }

  pub fn with_launches(self, launches: Vec<LaunchRecord>) -> Self {
    self.set_launches(Some(launches));
    self
  }

  /// `None` makes the launch list endpoint answer 503.
  pub fn set_launches(&self, launches: Option<Vec<LaunchRecord>>) {
    *self.launches.lock().unwrap() = launches;
  }

  pub fn with_resource(mut self, kind: ResourceKind, id: &str, body: Value) -> Self {
    self.resources.insert(kind.cache_key(id), body);
    self
  }

  pub fn failing(mut self, kind: ResourceKind, id: &str, status: u16) -> Self {
    self.failures.insert(kind.cache_key(id), status);
    self
  }

  pub fn delayed(mut self, kind: ResourceKind, id: &str, delay: Duration) -> Self {
    self.delays.insert(kind.cache_key(id), delay);
    self
  }

  pub fn requests_for(&self, kind: ResourceKind, id: &str) -> usize {
    let key = kind.cache_key(id);
    self.requests.lock().unwrap().iter().filter(|k| **k == key).count()
  }

  pub fn requests_of_kind(&self, kind: ResourceKind) -> usize {
    let prefix = format!("{kind}:");
    self
      .requests
      .lock()
      .unwrap()
      .iter()
      .filter(|k| k.starts_with(&prefix))
      .count()
  }

  pub fn resource_requests(&self) -> usize { self.requests.lock().unwrap().len() }

  pub fn launch_requests(&self) -> usize { self.launch_requests.load(Ordering::SeqCst) }
}

impl LaunchSource for FakeSource {
  fn fetch_launches(&self) -> impl Future<Output = Result<Vec<LaunchRecord>>> + Send + '_ {
    async move {
      self.launch_requests.fetch_add(1, Ordering::SeqCst);
      let launches = self.launches.lock().unwrap().clone();
      launches.ok_or_else(|| Error::Upstream {
        url:    "launches".into(),
        status: 503,
      })
    }
  }

  fn fetch_resource<'a>(
    &'a self,
    kind: ResourceKind,
    id: &'a str,
  ) -> impl Future<Output = Result<Value>> + Send + 'a {
    async move {
      let key = kind.cache_key(id);
      self.requests.lock().unwrap().push(key.clone());

      if let Some(delay) = self.delays.get(&key) {
        tokio::time::sleep(*delay).await;
      }
      if let Some(status) = self.failures.get(&key) {
        return Err(Error::Upstream {
          url:    key,
          status: *status,
        });
      }
      self.resources.get(&key).cloned().ok_or(Error::Upstream {
        url:    key,
        status: 404,
      })
    }
  }
}

// ─── Fixtures ────────────────────────────────────────────────────────────────

pub fn launch(id: &str, date: &str, upcoming: bool) -> LaunchRecord {
  LaunchRecord {
    id:        id.into(),
    name:      format!("Launch {id}"),
    date_utc:  date.into(),
    upcoming,
    success:   None,
    cores:     vec![Core::default()],
    links:     LaunchLinks::default(),
    rocket:    Some(format!("rocket-{id}")),
    launchpad: Some(format!("pad-{id}")),
    payloads:  vec![],
  }
}

pub fn with_landpad(mut record: LaunchRecord, landpad: &str) -> LaunchRecord {
  record.cores[0].landpad = Some(landpad.into());
  record
}

pub fn rocket_body(id: &str) -> Value {
  json!({
    "id": id,
    "name": format!("Rocket {id}"),
    "stages": 2,
    "first_flight": "2010-06-04",
    "description": "Two-stage orbital launch vehicle.",
    "success_rate_pct": 98
  })
}

pub fn pad_body(id: &str) -> Value {
  json!({
    "id": id,
    "name": format!("Pad {id}"),
    "full_name": format!("Launch Complex {id}"),
    "locality": "Cape Canaveral",
    "region": "Florida",
    "launch_attempts": 10,
    "launch_successes": 9
  })
}

/// A source knowing `rocket-{id}`, `pad-{id}` (as both launchpad and landpad)
/// for each of `ids`.
pub fn source_for(ids: &[&str], launches: Vec<LaunchRecord>) -> FakeSource {
  ids.iter().fold(FakeSource::new().with_launches(launches), |source, id| {
    source
      .with_resource(ResourceKind::Rockets, &format!("rocket-{id}"), rocket_body(&format!("rocket-{id}")))
      .with_resource(ResourceKind::Launchpads, &format!("pad-{id}"), pad_body(&format!("pad-{id}")))
      .with_resource(ResourceKind::Landpads, &format!("lz-{id}"), pad_body(&format!("lz-{id}")))
  })
}
