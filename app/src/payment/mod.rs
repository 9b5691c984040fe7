// ticketing_app/src/payment/mod.rs

//! WeChat-Pay-style payment provider: signing, wire codec, outbound client,
//! JSAPI config and inbound notifications.

pub mod client;
pub mod codec;
pub mod jsapi;
pub mod notify;
pub mod signing;

pub use client::{CancelOutcome, GatewayError, GatewayReply, PaymentGateway, UnifiedOrderRequest, WechatPayClient};
pub use codec::CodecError;
pub use jsapi::JsapiPayConfig;
pub use signing::SignType;

/// Merchant identity shared by every signed exchange with the provider.
#[derive(Debug, Clone)]
pub struct MerchantCredentials {
  pub app_id: String,
  pub mch_id: String,
  pub partner_key: String,
  pub sign_type: SignType,
}

/// 32 lowercase hex chars.
pub fn nonce_str() -> String {
  uuid::Uuid::new_v4().simple().to_string()
}
