// ticketing_app/src/state.rs

use crate::config::AppConfig;
use crate::orders::{OrderManager, SettlementRegistry};
use crate::payment::{MerchantCredentials, PaymentGateway};
use crate::processes::{register_all_processes, ProcessDeps};
use crate::rpc::RpcRegistry;
use crate::session::SessionStore;
use crate::store::OrderStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub registry: Arc<RpcRegistry>,
  pub orders: Arc<OrderManager>,
  pub sessions: Arc<dyn SessionStore>,
  pub credentials: Arc<MerchantCredentials>,
  pub config: Arc<AppConfig>, // Share loaded config
}

impl AppState {
  /// Wires the order manager and registers every process. Settlement callbacks
  /// should already be in `settlements`.
  pub fn new(
    config: Arc<AppConfig>,
    store: Arc<dyn OrderStore>,
    gateway: Arc<dyn PaymentGateway>,
    sessions: Arc<dyn SessionStore>,
    settlements: Arc<SettlementRegistry>,
  ) -> Self {
    let credentials = Arc::new(config.wechat.credentials());
    let orders = Arc::new(OrderManager::new(
      store,
      gateway,
      settlements,
      config.wechat.pay_body_title.clone(),
    ));

    let registry = Arc::new(RpcRegistry::new());
    register_all_processes(
      &registry,
      &ProcessDeps {
        orders: orders.clone(),
        credentials: credentials.clone(),
        notify_url: config.wechat.pay_notify_url.clone(),
        wechat_auth_redirect_uri: config.wechat.auth_redirect_uri.clone(),
      },
    );

    Self {
      registry,
      orders,
      sessions,
      credentials,
      config,
    }
  }
}
