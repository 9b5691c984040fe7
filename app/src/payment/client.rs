// ticketing_app/src/payment/client.rs

use crate::payment::codec::{self, CodecError};
use crate::payment::signing::{self, SIGN_FIELD, SIGN_TYPE_FIELD};
use crate::payment::{nonce_str, MerchantCredentials, SignType};

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

pub const UNIFIED_ORDER_PATH: &str = "/pay/unifiedorder";
pub const CLOSE_ORDER_PATH: &str = "/pay/closeorder";

pub const CODE_SUCCESS: &str = "SUCCESS";
/// `err_code` of a close request for an order the provider already settled.
pub const ERR_CODE_ORDER_PAID: &str = "ORDERPAID";

#[derive(Debug, Error)]
pub enum GatewayError {
  #[error("HTTP transport to payment provider failed: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("Payment provider answered HTTP {status}")]
  HttpStatus { status: u16, body: String },

  #[error(transparent)]
  Codec(#[from] CodecError),
}

/// Parsed provider reply plus the raw bodies, kept for failure logging.
#[derive(Debug, Clone, Default)]
pub struct GatewayReply {
  pub fields: BTreeMap<String, String>,
  pub request_body: String,
  pub response_body: String,
}

impl GatewayReply {
  pub fn field(&self, key: &str) -> Option<&str> {
    self.fields.get(key).map(String::as_str)
  }

  /// `return_code` is SUCCESS: the call itself was accepted.
  pub fn is_returned(&self) -> bool {
    self.field("return_code") == Some(CODE_SUCCESS)
  }

  /// Both `return_code` and `result_code` are SUCCESS.
  pub fn is_success(&self) -> bool {
    self.is_returned() && self.field("result_code") == Some(CODE_SUCCESS)
  }

  /// Interprets the reply of a close request.
  pub fn cancel_outcome(&self) -> CancelOutcome {
    if !self.is_returned() {
      let code = self.field("return_msg").unwrap_or("RETURN_FAIL");
      return CancelOutcome::Failed { code: code.to_string() };
    }
    match self.field("err_code") {
      None => CancelOutcome::Closed,
      Some(ERR_CODE_ORDER_PAID) => CancelOutcome::AlreadyPaid,
      Some(code) => CancelOutcome::Failed { code: code.to_string() },
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelOutcome {
  Closed,
  /// The provider already settled the attempt being closed.
  AlreadyPaid,
  Failed { code: String },
}

#[derive(Debug, Clone)]
pub struct UnifiedOrderRequest {
  pub body: String,
  /// Local order id, echoed back in the payment notification.
  pub attach: String,
  pub out_trade_no: String,
  /// Minor currency units.
  pub total_fee: i64,
  pub spbill_create_ip: String,
  pub notify_url: String,
  pub open_id: String,
}

impl UnifiedOrderRequest {
  fn into_params(self) -> BTreeMap<String, String> {
    let mut p = BTreeMap::new();
    p.insert("body".to_string(), self.body);
    p.insert("attach".to_string(), self.attach);
    p.insert("out_trade_no".to_string(), self.out_trade_no);
    p.insert("total_fee".to_string(), self.total_fee.to_string());
    p.insert("spbill_create_ip".to_string(), self.spbill_create_ip);
    p.insert("notify_url".to_string(), self.notify_url);
    p.insert("trade_type".to_string(), "JSAPI".to_string());
    p.insert("openid".to_string(), self.open_id);
    p
  }
}

/// Outbound operations against the payment provider.
///
/// A reply whose codes are not SUCCESS is still `Ok`; only transport, HTTP
/// status and decoding problems are errors.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
  async fn create_order(&self, request: UnifiedOrderRequest) -> Result<GatewayReply, GatewayError>;

  async fn cancel_order(&self, out_trade_no: &str) -> Result<GatewayReply, GatewayError>;
}

pub struct WechatPayClient {
  http: reqwest::Client,
  base_url: String,
  credentials: Arc<MerchantCredentials>,
}

impl WechatPayClient {
  pub fn new(credentials: Arc<MerchantCredentials>, base_url: &str, timeout: Duration) -> Result<Self, GatewayError> {
    let http = reqwest::Client::builder()
      .user_agent("ticketing-server")
      .timeout(timeout)
      .build()?;
    Ok(Self {
      http,
      base_url: base_url.trim_end_matches('/').to_string(),
      credentials,
    })
  }

  /// Adds the common fields and the signature.
  fn signed(&self, mut params: BTreeMap<String, String>) -> BTreeMap<String, String> {
    let creds = &self.credentials;
    params.insert("appid".to_string(), creds.app_id.clone());
    params.insert("mch_id".to_string(), creds.mch_id.clone());
    params.insert("nonce_str".to_string(), nonce_str());
    if creds.sign_type != SignType::Md5 {
      params.insert(SIGN_TYPE_FIELD.to_string(), creds.sign_type.as_str().to_string());
    }
    let sign = signing::sign(&params, &creds.partner_key, creds.sign_type);
    params.insert(SIGN_FIELD.to_string(), sign);
    params
  }

  async fn post(&self, path: &str, params: BTreeMap<String, String>) -> Result<GatewayReply, GatewayError> {
    let request_body = codec::encode(&self.signed(params))?;
    let url = format!("{}{}", self.base_url, path);

    let response = self
      .http
      .post(&url)
      .header(reqwest::header::CONTENT_TYPE, "text/xml")
      .body(request_body.clone())
      .send()
      .await?;
    let status = response.status();
    let response_body = response.text().await?;
    debug!(%url, status = status.as_u16(), "Payment provider replied.");

    if status != reqwest::StatusCode::OK {
      return Err(GatewayError::HttpStatus {
        status: status.as_u16(),
        body: response_body,
      });
    }

    let fields = codec::decode(&response_body)?;
    Ok(GatewayReply {
      fields,
      request_body,
      response_body,
    })
  }
}

#[async_trait]
impl PaymentGateway for WechatPayClient {
  #[instrument(name = "WechatPayClient::create_order", skip_all, fields(out_trade_no = %request.out_trade_no), err(Display))]
  async fn create_order(&self, request: UnifiedOrderRequest) -> Result<GatewayReply, GatewayError> {
    self.post(UNIFIED_ORDER_PATH, request.into_params()).await
  }

  #[instrument(name = "WechatPayClient::cancel_order", skip(self), err(Display))]
  async fn cancel_order(&self, out_trade_no: &str) -> Result<GatewayReply, GatewayError> {
    let mut params = BTreeMap::new();
    params.insert("out_trade_no".to_string(), out_trade_no.to_string());
    self.post(CLOSE_ORDER_PATH, params).await
  }
}
