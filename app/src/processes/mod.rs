// ticketing_app/src/processes/mod.rs

//! Process registrations of the JSON-RPC endpoint.

pub mod order_processes;
pub mod wechat_pay_processes;

use crate::guards::EnsureWechatAuthorized;
use crate::orders::OrderManager;
use crate::payment::MerchantCredentials;
use crate::rpc::{RpcContext, RpcRegistry};
use proc_chain::SharedInterceptor;
use std::sync::Arc;
use tracing::info;

/// What the process handlers need beyond the request itself.
#[derive(Clone)]
pub struct ProcessDeps {
  pub orders: Arc<OrderManager>,
  pub credentials: Arc<MerchantCredentials>,
  /// Where the provider posts payment notifications.
  pub notify_url: String,
  /// Where WeChat sends the visitor back after authorization.
  pub wechat_auth_redirect_uri: String,
}

impl ProcessDeps {
  pub(crate) fn wechat_authorized(&self) -> SharedInterceptor<RpcContext> {
    Arc::new(EnsureWechatAuthorized::new(
      self.credentials.app_id.clone(),
      self.wechat_auth_redirect_uri.clone(),
    ))
  }
}

pub fn register_all_processes(registry: &RpcRegistry, deps: &ProcessDeps) {
  order_processes::register(registry, deps);
  wechat_pay_processes::register(registry, deps);
  info!(processes = ?registry.process_names(), "Processes registered.");
}
