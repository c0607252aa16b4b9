//! Where launch data comes from.
//!
//! [`LaunchSource`] is the seam between orchestration and transport. The
//! production implementation is [`HttpSource`], a thin reqwest wrapper over
//! the public SpaceX API; tests substitute an in-memory fake.

use std::{future::Future, time::Duration};

use liftoff_core::{launch::LaunchRecord, metadata::ResourceKind};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::{Error, Result};

pub const DEFAULT_LAUNCHES_URL: &str = "https://api.spacexdata.com/v5/launches";
pub const DEFAULT_METADATA_URL: &str = "https://api.spacexdata.com/v4/";

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Read-only access to launches and their secondary metadata.
///
/// Futures are `Send` so fetches can be spawned onto a multi-threaded
/// runtime.
pub trait LaunchSource: Send + Sync + 'static {
  /// Fetch the full launch list in one request.
  fn fetch_launches(&self) -> impl Future<Output = Result<Vec<LaunchRecord>>> + Send + '_;

  /// Fetch one metadata object, e.g. `rockets/5e9d…`. No caching happens at
  /// this level.
  fn fetch_resource<'a>(
    &'a self,
    kind: ResourceKind,
    id: &'a str,
  ) -> impl Future<Output = Result<Value>> + Send + 'a;
}

// ─── HTTP implementation ─────────────────────────────────────────────────────

/// Endpoints for [`HttpSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
  pub launches_url: String,
  /// Base for `{kind}/{id}` lookups. A trailing slash is optional.
  pub metadata_url: String,
}

impl Default for SourceConfig {
  fn default() -> Self {
    Self {
      launches_url: DEFAULT_LAUNCHES_URL.to_string(),
      metadata_url: DEFAULT_METADATA_URL.to_string(),
    }
  }
}

/// Async HTTP client for the SpaceX REST API.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpSource {
  client: Client,
  config: SourceConfig,
}

impl HttpSource {
  pub fn new(config: SourceConfig) -> Result<Self> {
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self { client, config })
  }

  pub fn config(&self) -> &SourceConfig { &self.config }

  fn resource_url(&self, kind: ResourceKind, id: &str) -> String {
    format!(
      "{}/{}/{}",
      self.config.metadata_url.trim_end_matches('/'),
      kind,
      id
    )
  }

  async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
    debug!(%url, "GET");
    let resp = self.client.get(url).send().await?;

    let status = resp.status();
    if !status.is_success() {
      return Err(Error::Upstream {
        url:    url.to_string(),
        status: status.as_u16(),
      });
    }

    let body = resp.bytes().await?;
    serde_json::from_slice(&body).map_err(|source| Error::Decode {
      url: url.to_string(),
      source,
    })
  }
}

impl LaunchSource for HttpSource {
  fn fetch_launches(&self) -> impl Future<Output = Result<Vec<LaunchRecord>>> + Send + '_ {
    self.get_json(&self.config.launches_url)
  }

  fn fetch_resource<'a>(
    &'a self,
    kind: ResourceKind,
    id: &'a str,
  ) -> impl Future<Output = Result<Value>> + Send + 'a {
    async move {
      let url = self.resource_url(kind, id);
      self.get_json(&url).await
    }
  }
}
