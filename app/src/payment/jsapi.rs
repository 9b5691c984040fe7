// ticketing_app/src/payment/jsapi.rs

//! Parameters the client page passes to the in-app payment JS bridge.

use crate::payment::signing;
use crate::payment::{nonce_str, MerchantCredentials};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JsapiPayConfig {
  pub timestamp: i64,
  pub nonce_string: String,
  pub signature: String,
}

pub fn jsapi_config(credentials: &MerchantCredentials, prepay_id: &str) -> JsapiPayConfig {
  jsapi_config_at(credentials, prepay_id, chrono::Utc::now().timestamp(), nonce_str())
}

pub fn jsapi_config_at(credentials: &MerchantCredentials, prepay_id: &str, timestamp: i64, nonce: String) -> JsapiPayConfig {
  let mut params = BTreeMap::new();
  params.insert("appId".to_string(), credentials.app_id.clone());
  params.insert("timeStamp".to_string(), timestamp.to_string());
  params.insert("nonceStr".to_string(), nonce.clone());
  params.insert("package".to_string(), format!("prepay_id={}", prepay_id));
  params.insert("signType".to_string(), credentials.sign_type.as_str().to_string());

  JsapiPayConfig {
    timestamp,
    nonce_string: nonce,
    signature: signing::sign(&params, &credentials.partner_key, credentials.sign_type),
  }
}
