//! Session-scoped key/value storage.
//!
//! A "session" is one user session, not one process: [`MemorySession`] lives
//! as long as the process, [`FileSession`] as long as its backing file. The
//! binary keeps that file under `$XDG_RUNTIME_DIR`, which is wiped at logout.

use std::{
  collections::HashMap,
  fs,
  io,
  path::{Path, PathBuf},
  sync::{Mutex, PoisonError},
};

use tracing::warn;

use crate::Result;

pub trait SessionStorage: Send + Sync {
  fn get(&self, key: &str) -> Option<String>;

  fn set(&self, key: &str, value: &str) -> Result<()>;
}

// ─── In-memory ───────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemorySession {
  values: Mutex<HashMap<String, String>>,
}

impl MemorySession {
  pub fn new() -> Self { Self::default() }
}

impl SessionStorage for MemorySession {
  fn get(&self, key: &str) -> Option<String> {
    self
      .values
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .get(key)
      .cloned()
  }

  fn set(&self, key: &str, value: &str) -> Result<()> {
    self
      .values
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .insert(key.to_string(), value.to_string());
    Ok(())
  }
}

// ─── File-backed ─────────────────────────────────────────────────────────────

/// A flat JSON object on disk, rewritten on every `set`.
#[derive(Debug)]
pub struct FileSession {
  path:   PathBuf,
  values: Mutex<HashMap<String, String>>,
}

impl FileSession {
  /// Open (or lazily create) the session file at `path`.
  ///
  /// A corrupt file is treated as an empty session rather than an error.
  pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
    let path = path.into();
    let values: HashMap<String, String> = match fs::read(&path) {
      Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "ignoring unreadable session file");
        HashMap::new()
      }),
      Err(e) if e.kind() == io::ErrorKind::NotFound => HashMap::new(),
      Err(e) => return Err(e.into()),
    };
    Ok(Self {
      path,
      values: Mutex::new(values),
    })
  }

  pub fn path(&self) -> &Path { &self.path }
}

impl SessionStorage for FileSession {
  fn get(&self, key: &str) -> Option<String> {
    self
      .values
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .get(key)
      .cloned()
  }

  fn set(&self, key: &str, value: &str) -> Result<()> {
    let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
    let mut next = values.clone();
    next.insert(key.to_string(), value.to_string());

    // Memory only changes once the file does, so a failed write leaves both
    // at the old value.
    let bytes = serde_json::to_vec_pretty(&next).map_err(liftoff_core::Error::from)?;
    if let Some(parent) = self.path.parent() {
      fs::create_dir_all(parent)?;
    }
    fs::write(&self.path, bytes)?;
    *values = next;
    Ok(())
  }
}
