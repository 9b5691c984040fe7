// ticketing_app/src/session/mod.rs

//! Per-visitor session: a flat map of JSON-encoded values persisted as one blob.

pub mod store;

pub use store::{MemorySessionStore, SessionStore};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::warn;

pub const SESS_KEY_CURRENT_USER_ID: &str = "USER.CURRENT_USER_ID";
pub const SESS_KEY_CURRENT_USER_WECHAT_ACCESS_TOKEN: &str = "USER.CURRENT_USER_WECHAT_ACCESS_TOKEN";

#[derive(Debug, Error)]
pub enum SessionError {
  #[error("Session value encoding error: {0}")]
  Codec(#[from] serde_json::Error),

  #[error("Session backend error: {0}")]
  Backend(String),
}

/// Web OAuth access token stored once the visitor authorized the app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WechatAccessToken {
  pub access_token: String,
  pub expires_in: i64,
  pub refresh_token: String,
  pub open_id: String,
  pub scope: String,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
  id: String,
  values: HashMap<String, String>,
  is_new: bool,
}

impl Session {
  /// A fresh session with a new random id.
  pub fn create() -> Self {
    Self {
      id: uuid::Uuid::new_v4().simple().to_string(),
      values: HashMap::new(),
      is_new: true,
    }
  }

  /// Loads `id` from `store`; an unknown or expired id yields a fresh session
  /// with a new id. An unreadable blob is discarded.
  pub async fn load(store: &dyn SessionStore, id: Option<&str>) -> Result<Self, SessionError> {
    let Some(id) = id.filter(|id| !id.is_empty()) else {
      return Ok(Self::create());
    };
    let Some(blob) = store.load(id).await? else {
      return Ok(Self::create());
    };
    match serde_json::from_str::<HashMap<String, String>>(&blob) {
      Ok(values) => Ok(Self {
        id: id.to_string(),
        values,
        is_new: false,
      }),
      Err(e) => {
        warn!(error = %e, "Discarding unreadable session blob.");
        Ok(Self::create())
      }
    }
  }

  /// Writes the whole map back.
  pub async fn save(&self, store: &dyn SessionStore) -> Result<(), SessionError> {
    let blob = serde_json::to_string(&self.values)?;
    store.save(&self.id, &blob).await
  }

  pub fn id(&self) -> &str {
    &self.id
  }

  /// Whether the id was minted for this request and still has to reach the client.
  pub fn is_new(&self) -> bool {
    self.is_new
  }

  pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, SessionError> {
    match self.values.get(key) {
      Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
      None => Ok(None),
    }
  }

  pub fn set<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), SessionError> {
    self.values.insert(key.to_string(), serde_json::to_string(value)?);
    Ok(())
  }

  pub fn remove(&mut self, key: &str) {
    self.values.remove(key);
  }

  pub fn contains(&self, key: &str) -> bool {
    self.values.contains_key(key)
  }
}
