// ticketing_app/src/payment/signing.rs

//! Request signature of the payment provider.
//!
//! Canonical string: every non-empty parameter except `sign`, sorted by key,
//! rendered as `k=v` and joined with `&`, then `&key=<partner key>`. The digest
//! is hex-encoded in upper case.

use hmac::{Hmac, Mac};
use md5::{Digest, Md5};
use sha2::Sha256;
use std::collections::BTreeMap;

pub const SIGN_FIELD: &str = "sign";
pub const SIGN_TYPE_FIELD: &str = "sign_type";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignType {
  #[default]
  Md5,
  HmacSha256,
}

impl SignType {
  pub fn as_str(&self) -> &'static str {
    match self {
      SignType::Md5 => "MD5",
      SignType::HmacSha256 => "HMAC-SHA256",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "MD5" => Some(SignType::Md5),
      "HMAC-SHA256" => Some(SignType::HmacSha256),
      _ => None,
    }
  }
}

/// The string the digest is computed over.
pub fn canonical_string(params: &BTreeMap<String, String>, key: &str) -> String {
  let mut plain = params
    .iter()
    .filter(|(k, v)| k.as_str() != SIGN_FIELD && !v.is_empty())
    .map(|(k, v)| format!("{}={}", k, v))
    .collect::<Vec<_>>()
    .join("&");
  if !plain.is_empty() {
    plain.push('&');
  }
  plain.push_str("key=");
  plain.push_str(key);
  plain
}

pub fn sign(params: &BTreeMap<String, String>, key: &str, sign_type: SignType) -> String {
  let plain = canonical_string(params, key);
  match sign_type {
    SignType::Md5 => {
      let mut hasher = Md5::new();
      hasher.update(plain.as_bytes());
      format!("{:X}", hasher.finalize())
    }
    SignType::HmacSha256 => {
      // Any key length is accepted by HMAC, so this never fails.
      let mut mac = match Hmac::<Sha256>::new_from_slice(key.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
      };
      mac.update(plain.as_bytes());
      format!("{:X}", mac.finalize().into_bytes())
    }
  }
}

/// Checks the `sign` field of an inbound parameter set.
///
/// The digest follows the `sign_type` field when present (MD5 otherwise). An
/// unknown `sign_type` or a missing `sign` fails verification.
pub fn verify(params: &BTreeMap<String, String>, key: &str) -> bool {
  let Some(given) = params.get(SIGN_FIELD) else {
    return false;
  };
  let sign_type = match params.get(SIGN_TYPE_FIELD) {
    Some(s) => match SignType::parse(s) {
      Some(t) => t,
      None => return false,
    },
    None => SignType::Md5,
  };
  let expected = sign(params, key, sign_type);
  !expected.is_empty() && expected.eq_ignore_ascii_case(given)
}
