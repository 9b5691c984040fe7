// tests/common/mod.rs
#![allow(dead_code)] // Each test binary uses a different subset

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;
use uuid::Uuid;

use ticketing_app::config::{AppConfig, WechatConfig};
use ticketing_app::models::NewOrderItem;
use ticketing_app::orders::{settlement_fn, SettlementCallback, SettlementRegistry};
use ticketing_app::payment::{codec, signing, GatewayError, GatewayReply, PaymentGateway, SignType, UnifiedOrderRequest};
use ticketing_app::session::{MemorySessionStore, Session, WechatAccessToken, SESS_KEY_CURRENT_USER_ID, SESS_KEY_CURRENT_USER_WECHAT_ACCESS_TOKEN};
use ticketing_app::state::AppState;
use ticketing_app::store::MemoryOrderStore;

pub const PARTNER_KEY: &str = "test-partner-key";
pub const NOTIFY_URL: &str = "http://shop.test/order/wechat_pay_notify_callback";

// --- Scripted payment gateway ---

#[derive(Debug, Clone)]
pub enum GatewayCall {
  Create(UnifiedOrderRequest),
  Cancel(String),
}

/// Records calls and answers from queued replies. An empty queue answers with
/// a successful create (prepay id `prepay-<n>`) or a successful close.
#[derive(Default)]
pub struct ScriptedGateway {
  pub calls: Mutex<Vec<GatewayCall>>,
  create_replies: Mutex<VecDeque<GatewayReply>>,
  cancel_replies: Mutex<VecDeque<GatewayReply>>,
}

impl ScriptedGateway {
  pub fn new() -> Arc<Self> {
    Arc::new(Self::default())
  }

  pub fn push_create_reply(&self, reply: GatewayReply) {
    self.create_replies.lock().push_back(reply);
  }

  pub fn push_cancel_reply(&self, reply: GatewayReply) {
    self.cancel_replies.lock().push_back(reply);
  }

  pub fn calls(&self) -> Vec<GatewayCall> {
    self.calls.lock().clone()
  }

  pub fn create_calls(&self) -> usize {
    self.calls().iter().filter(|c| matches!(c, GatewayCall::Create(_))).count()
  }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
  async fn create_order(&self, request: UnifiedOrderRequest) -> Result<GatewayReply, GatewayError> {
    let n = {
      let mut calls = self.calls.lock();
      calls.push(GatewayCall::Create(request));
      calls.len()
    };
    let queued = self.create_replies.lock().pop_front();
    Ok(queued.unwrap_or_else(|| {
      reply(&[
        ("return_code", "SUCCESS"),
        ("result_code", "SUCCESS"),
        ("prepay_id", &format!("prepay-{}", n)),
      ])
    }))
  }

  async fn cancel_order(&self, out_trade_no: &str) -> Result<GatewayReply, GatewayError> {
    self.calls.lock().push(GatewayCall::Cancel(out_trade_no.to_string()));
    let queued = self.cancel_replies.lock().pop_front();
    Ok(queued.unwrap_or_else(|| reply(&[("return_code", "SUCCESS"), ("result_code", "SUCCESS")])))
  }
}

pub fn reply(pairs: &[(&str, &str)]) -> GatewayReply {
  let fields: BTreeMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
  GatewayReply {
    request_body: "<xml></xml>".to_string(),
    response_body: codec::encode(&fields).unwrap_or_default(),
    fields,
  }
}

// --- Settlement recording ---

pub type SettledItems = Arc<Mutex<Vec<(Uuid, Uuid)>>>;

pub fn recording_settlement() -> (Arc<dyn SettlementCallback>, SettledItems) {
  let seen: SettledItems = Arc::new(Mutex::new(Vec::new()));
  let sink = seen.clone();
  let callback = settlement_fn(move |order_id, item_id| {
    let sink = sink.clone();
    async move {
      sink.lock().push((order_id, item_id));
      Ok(())
    }
  });
  (callback, seen)
}

// --- Application wiring ---

pub fn test_config() -> AppConfig {
  AppConfig {
    server_host: "127.0.0.1".to_string(),
    server_port: 8080,
    database_url: None,
    wechat: WechatConfig {
      app_id: "wx-test-app".to_string(),
      mch_id: "1900000109".to_string(),
      partner_key: PARTNER_KEY.to_string(),
      sign_type: SignType::Md5,
      pay_base_url: "http://pay.invalid".to_string(),
      pay_notify_url: NOTIFY_URL.to_string(),
      pay_body_title: "Tickets".to_string(),
      auth_redirect_uri: "http://shop.test/user/wechat_auth".to_string(),
    },
    session_cookie_name: "ticketing.sid".to_string(),
    session_expiration: Duration::from_secs(600),
    gateway_timeout: Duration::from_secs(5),
  }
}

pub struct TestApp {
  pub state: AppState,
  pub store: Arc<MemoryOrderStore>,
  pub gateway: Arc<ScriptedGateway>,
  pub sessions: Arc<MemorySessionStore>,
  pub settled: SettledItems,
}

/// State with in-memory stores, a scripted gateway and a recording callback
/// for the `TICKET` and `MERCH` sellable types.
pub fn test_app() -> TestApp {
  let store = Arc::new(MemoryOrderStore::new());
  let gateway = ScriptedGateway::new();
  let sessions = Arc::new(MemorySessionStore::new(Duration::from_secs(600)));
  let settlements = Arc::new(SettlementRegistry::new());
  let (callback, settled) = recording_settlement();
  settlements.register("TICKET", callback.clone());
  settlements.register("MERCH", callback);

  let state = AppState::new(
    Arc::new(test_config()),
    store.clone(),
    gateway.clone(),
    sessions.clone(),
    settlements,
  );
  TestApp {
    state,
    store,
    gateway,
    sessions,
    settled,
  }
}

pub fn ticket(quantity: u32, unit_price_fee: i64) -> NewOrderItem {
  NewOrderItem {
    sellable_type: "TICKET".to_string(),
    sellable_value: r#"{"competition_id":"c1"}"#.to_string(),
    quantity,
    unit_price_fee,
  }
}

pub fn merch(quantity: u32, unit_price_fee: i64) -> NewOrderItem {
  NewOrderItem {
    sellable_type: "MERCH".to_string(),
    sellable_value: "cap".to_string(),
    quantity,
    unit_price_fee,
  }
}

/// Saves a session for `user_id`, optionally WeChat-authorized; returns its id.
pub async fn logged_in_session(sessions: &MemorySessionStore, user_id: &str, wechat_authorized: bool) -> String {
  let mut session = Session::create();
  session.set(SESS_KEY_CURRENT_USER_ID, &user_id).unwrap();
  if wechat_authorized {
    session
      .set(
        SESS_KEY_CURRENT_USER_WECHAT_ACCESS_TOKEN,
        &WechatAccessToken {
          access_token: "at".to_string(),
          expires_in: 7200,
          refresh_token: "rt".to_string(),
          open_id: format!("open-{}", user_id),
          scope: "snsapi_userinfo".to_string(),
        },
      )
      .unwrap();
  }
  session.save(sessions).await.unwrap();
  session.id().to_string()
}

/// Provider-style signed notification body.
pub fn notification_body(pairs: &[(&str, &str)], key: &str) -> String {
  let mut fields: BTreeMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
  let sign = signing::sign(&fields, key, SignType::Md5);
  fields.insert("sign".to_string(), sign);
  codec::encode(&fields).unwrap()
}

// --- Helper for Tracing Setup ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
