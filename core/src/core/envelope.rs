// proc_chain/src/core/envelope.rs

//! The uniform response body of a dispatch. Both variants are sent with
//! HTTP 200; the discriminator lives in `status_code`.

use crate::error::Failure;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const STATUS_OK: &str = "OK";
pub const STATUS_FAIL: &str = "FAIL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status_code")]
pub enum Envelope {
  #[serde(rename = "OK")]
  Ok { result: Value },
  #[serde(rename = "FAIL")]
  Fail { fail_code: String, fail_detail: Value },
}

impl Envelope {
  pub fn ok(result: Value) -> Self {
    Envelope::Ok { result }
  }

  pub fn fail(failure: Failure) -> Self {
    Envelope::Fail {
      fail_code: failure.code,
      fail_detail: failure.detail.unwrap_or(Value::Null),
    }
  }

  pub fn status_code(&self) -> &'static str {
    match self {
      Envelope::Ok { .. } => STATUS_OK,
      Envelope::Fail { .. } => STATUS_FAIL,
    }
  }

  pub fn is_ok(&self) -> bool {
    matches!(self, Envelope::Ok { .. })
  }

  pub fn fail_code(&self) -> Option<&str> {
    match self {
      Envelope::Fail { fail_code, .. } => Some(fail_code),
      Envelope::Ok { .. } => None,
    }
  }
}
