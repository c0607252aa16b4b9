//! Runtime settings.
//!
//! Layered lowest to highest: built-in defaults, the optional TOML file,
//! `LIFTOFF_*` environment variables, then command-line flags.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::Context as _;
use config::{Config, Environment, File};
use liftoff_client::{
  SourceConfig,
  retry::DEFAULT_MAX_RETRIES,
  source::{DEFAULT_LAUNCHES_URL, DEFAULT_METADATA_URL},
};
use serde::Deserialize;

pub const ENV_PREFIX: &str = "LIFTOFF";
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u32 = 300;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
  pub launches_url:       String,
  pub metadata_url:       String,
  pub max_retries:        u32,
  pub search_debounce_ms: u32,
  /// Where the retry counter lives. Defaults to a file under
  /// `$XDG_RUNTIME_DIR`, or process memory when that is unset.
  #[serde(default)]
  pub session_file:       Option<PathBuf>,
  /// Log destination. Logs are dropped when unset, since the TUI owns the
  /// terminal.
  #[serde(default)]
  pub log_file:           Option<PathBuf>,
}

/// Values given on the command line. `None` defers to the lower layers.
#[derive(Debug, Default)]
pub struct Overrides {
  pub launches_url:       Option<String>,
  pub metadata_url:       Option<String>,
  pub max_retries:        Option<u32>,
  pub search_debounce_ms: Option<u32>,
  pub session_file:       Option<PathBuf>,
  pub log_file:           Option<PathBuf>,
}

impl Settings {
  pub fn load(file: Option<&Path>, overrides: Overrides) -> anyhow::Result<Self> {
    Self::load_from(file, Environment::with_prefix(ENV_PREFIX), overrides)
  }

  fn load_from(
    file: Option<&Path>,
    env: Environment,
    overrides: Overrides,
  ) -> anyhow::Result<Self> {
    let mut builder = Config::builder()
      .set_default("launches_url", DEFAULT_LAUNCHES_URL)?
      .set_default("metadata_url", DEFAULT_METADATA_URL)?
      .set_default("max_retries", i64::from(DEFAULT_MAX_RETRIES))?
      .set_default("search_debounce_ms", i64::from(DEFAULT_SEARCH_DEBOUNCE_MS))?;

    if let Some(path) = file {
      builder = builder.add_source(File::from(path).required(false));
    }

    let settings = builder
      .add_source(env)
      .set_override_option("launches_url", overrides.launches_url)?
      .set_override_option("metadata_url", overrides.metadata_url)?
      .set_override_option("max_retries", overrides.max_retries.map(i64::from))?
      .set_override_option(
        "search_debounce_ms",
        overrides.search_debounce_ms.map(i64::from),
      )?
      .set_override_option("session_file", overrides.session_file.map(path_value))?
      .set_override_option("log_file", overrides.log_file.map(path_value))?
      .build()
      .context("failed to read configuration")?;

    settings
      .try_deserialize()
      .context("failed to deserialise Settings")
  }

  pub fn source_config(&self) -> SourceConfig {
    SourceConfig {
      launches_url: self.launches_url.clone(),
      metadata_url: self.metadata_url.clone(),
    }
  }

  pub fn search_debounce(&self) -> Duration {
    Duration::from_millis(u64::from(self.search_debounce_ms))
  }
}

fn path_value(path: PathBuf) -> String { path.to_string_lossy().into_owned() }

#[cfg(test)]
mod tests {
  use super::*;

  fn env(vars: &[(&str, &str)]) -> Environment {
    let vars = vars
      .iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect::<config::Map<String, String>>();
    Environment::with_prefix(ENV_PREFIX).source(Some(vars))
  }

  #[test]
  fn defaults_apply_with_no_layers() {
    let settings = Settings::load_from(None, env(&[]), Overrides::default()).unwrap();
    assert_eq!(settings.launches_url, DEFAULT_LAUNCHES_URL);
    assert_eq!(settings.metadata_url, DEFAULT_METADATA_URL);
    assert_eq!(settings.max_retries, 3);
    assert_eq!(settings.search_debounce(), Duration::from_millis(300));
    assert_eq!(settings.session_file, None);
    assert_eq!(settings.log_file, None);
  }

  #[test]
  fn missing_config_file_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let settings = Settings::load_from(Some(&path), env(&[]), Overrides::default()).unwrap();
    assert_eq!(settings.max_retries, 3);
  }

  #[test]
  fn flags_beat_env_which_beats_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("liftoff.toml");
    std::fs::write(
      &path,
      r#"
        launches_url = "http://file/launches"
        metadata_url = "http://file/v4/"
        max_retries = 5
        search_debounce_ms = 50
        log_file = "/tmp/liftoff.log"
      "#,
    )
    .unwrap();

    let overrides = Overrides {
      launches_url: Some("http://flag/launches".into()),
      ..Overrides::default()
    };
    let settings = Settings::load_from(
      Some(&path),
      env(&[
        ("LIFTOFF_MAX_RETRIES", "7"),
        ("LIFTOFF_LAUNCHES_URL", "http://env/launches"),
      ]),
      overrides,
    )
    .unwrap();

    assert_eq!(settings.launches_url, "http://flag/launches");
    assert_eq!(settings.metadata_url, "http://file/v4/");
    assert_eq!(settings.max_retries, 7);
    assert_eq!(settings.search_debounce_ms, 50);
    assert_eq!(settings.log_file, Some(PathBuf::from("/tmp/liftoff.log")));

    let source = settings.source_config();
    assert_eq!(source.launches_url, "http://flag/launches");
  }
}
