// ticketing_app/src/session/store.rs

use crate::session::SessionError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Blob storage of sessions. Expiration is the store's concern.
#[async_trait]
pub trait SessionStore: Send + Sync {
  async fn load(&self, id: &str) -> Result<Option<String>, SessionError>;

  async fn save(&self, id: &str, blob: &str) -> Result<(), SessionError>;
}

/// Sessions kept in process memory, dropped after `expiration` without a save.
pub struct MemorySessionStore {
  entries: Mutex<HashMap<String, (String, Instant)>>,
  expiration: Duration,
}

impl MemorySessionStore {
  pub fn new(expiration: Duration) -> Self {
    Self {
      entries: Mutex::new(HashMap::new()),
      expiration,
    }
  }

  /// Drops expired entries; returns how many were removed.
  pub fn purge_expired(&self) -> usize {
    let now = Instant::now();
    let mut entries = self.entries.lock();
    let before = entries.len();
    entries.retain(|_, (_, saved_at)| now.duration_since(*saved_at) < self.expiration);
    before - entries.len()
  }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
  async fn load(&self, id: &str) -> Result<Option<String>, SessionError> {
    let mut entries = self.entries.lock();
    let expired = match entries.get(id) {
      Some((blob, saved_at)) if saved_at.elapsed() < self.expiration => return Ok(Some(blob.clone())),
      Some(_) => true,
      None => false,
    };
    if expired {
      entries.remove(id);
    }
    Ok(None)
  }

  async fn save(&self, id: &str, blob: &str) -> Result<(), SessionError> {
    self.entries.lock().insert(id.to_string(), (blob.to_string(), Instant::now()));
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn entries_expire_after_idle_time() {
    let store = MemorySessionStore::new(Duration::from_millis(20));
    store.save("a", "{}").await.unwrap();
    assert_eq!(store.load("a").await.unwrap().as_deref(), Some("{}"));

    tokio::time::sleep(Duration::from_millis(40)).await;
    assert_eq!(store.load("a").await.unwrap(), None);

    store.save("b", "{}").await.unwrap();
    tokio::time::sleep(Duration::from_millis(40)).await;
    assert_eq!(store.purge_expired(), 1);
  }
}
