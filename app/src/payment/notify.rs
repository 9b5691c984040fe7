// ticketing_app/src/payment/notify.rs

//! Inbound payment result notifications.
//!
//! The provider retries delivery until it reads `ACK_BODY`, so the HTTP layer
//! answers with it whatever `parse_notification` returns.

use crate::payment::client::CODE_SUCCESS;
use crate::payment::codec::{self, CodecError};
use crate::payment::signing;
use std::collections::BTreeMap;
use thiserror::Error;

pub const ACK_BODY: &str =
  "<xml><return_code><![CDATA[SUCCESS]]></return_code><return_msg><![CDATA[OK]]></return_msg></xml>";

#[derive(Debug, Error)]
pub enum NotifyError {
  #[error(transparent)]
  Codec(#[from] CodecError),

  #[error("Notification signature does not verify")]
  BadSignature,

  #[error("Notification reports no payment (return_code={return_code:?}, result_code={result_code:?})")]
  NotPaid {
    return_code: Option<String>,
    result_code: Option<String>,
  },

  #[error("Notification carries no attach field")]
  MissingAttach,
}

/// A verified "payment succeeded" notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaidNotice {
  /// Local order id, from `attach`.
  pub order_id: String,
  pub out_trade_no: Option<String>,
  pub transaction_id: Option<String>,
  pub fields: BTreeMap<String, String>,
}

pub fn parse_notification(body: &str, partner_key: &str) -> Result<PaidNotice, NotifyError> {
  let fields = codec::decode(body)?;

  let return_code = fields.get("return_code");
  let result_code = fields.get("result_code");
  if return_code.map(String::as_str) != Some(CODE_SUCCESS) || result_code.map(String::as_str) != Some(CODE_SUCCESS) {
    return Err(NotifyError::NotPaid {
      return_code: return_code.cloned(),
      result_code: result_code.cloned(),
    });
  }

  if !signing::verify(&fields, partner_key) {
    return Err(NotifyError::BadSignature);
  }

  let order_id = match fields.get("attach") {
    Some(a) if !a.is_empty() => a.clone(),
    _ => return Err(NotifyError::MissingAttach),
  };

  Ok(PaidNotice {
    order_id,
    out_trade_no: fields.get("out_trade_no").cloned(),
    transaction_id: fields.get("transaction_id").cloned(),
    fields,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::payment::SignType;

  const KEY: &str = "partner-secret";

  fn signed_body(pairs: &[(&str, &str)]) -> String {
    let mut p: BTreeMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    let sign = signing::sign(&p, KEY, SignType::Md5);
    p.insert("sign".to_string(), sign);
    codec::encode(&p).unwrap()
  }

  #[test]
  fn accepts_signed_success_notification() {
    let body = signed_body(&[
      ("return_code", "SUCCESS"),
      ("result_code", "SUCCESS"),
      ("attach", "0190a0b0-0000-7000-8000-000000000001"),
      ("out_trade_no", "t1"),
      ("transaction_id", "4200000001"),
      ("total_fee", "2200"),
    ]);
    let notice = parse_notification(&body, KEY).unwrap();
    assert_eq!(notice.order_id, "0190a0b0-0000-7000-8000-000000000001");
    assert_eq!(notice.out_trade_no.as_deref(), Some("t1"));
    assert_eq!(notice.transaction_id.as_deref(), Some("4200000001"));
  }

  #[test]
  fn rejects_wrong_key_and_failed_payments() {
    let body = signed_body(&[("return_code", "SUCCESS"), ("result_code", "SUCCESS"), ("attach", "o1")]);
    assert!(matches!(parse_notification(&body, "other-key"), Err(NotifyError::BadSignature)));

    let body = signed_body(&[("return_code", "SUCCESS"), ("result_code", "FAIL"), ("attach", "o1")]);
    assert!(matches!(parse_notification(&body, KEY), Err(NotifyError::NotPaid { .. })));
  }

  #[test]
  fn rejects_missing_attach_and_garbage() {
    let body = signed_body(&[("return_code", "SUCCESS"), ("result_code", "SUCCESS")]);
    assert!(matches!(parse_notification(&body, KEY), Err(NotifyError::MissingAttach)));
    assert!(matches!(parse_notification("not xml", KEY), Err(NotifyError::Codec(_))));
  }

  #[test]
  fn ack_is_flat_success_document() {
    let ack = codec::decode(ACK_BODY).unwrap();
    assert_eq!(ack["return_code"], "SUCCESS");
    assert_eq!(ack["return_msg"], "OK");
  }
}
