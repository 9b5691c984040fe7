// ticketing_app/src/orders/manager.rs

use crate::models::{NewOrderItem, Order, OrderStatus, PayApproach};
use crate::orders::errors::OrderError;
use crate::orders::settlement::SettlementRegistry;
use crate::payment::{CancelOutcome, GatewayReply, PaymentGateway, UnifiedOrderRequest};
use crate::store::OrderStore;

use chrono::Utc;
use std::sync::Arc;
use tracing::{event, instrument, Level};
use uuid::Uuid;

/// Page size of order listings.
pub const DEFAULT_PAGE_SIZE: usize = 15;

/// Owns the order lifecycle. The only writer of orders.
pub struct OrderManager {
  store: Arc<dyn OrderStore>,
  gateway: Arc<dyn PaymentGateway>,
  settlements: Arc<SettlementRegistry>,
  /// Prefix of the payment description shown by the provider.
  body_title: String,
}

impl OrderManager {
  pub fn new(
    store: Arc<dyn OrderStore>,
    gateway: Arc<dyn PaymentGateway>,
    settlements: Arc<SettlementRegistry>,
    body_title: impl Into<String>,
  ) -> Self {
    Self {
      store,
      gateway,
      settlements,
      body_title: body_title.into(),
    }
  }

  pub fn settlements(&self) -> &Arc<SettlementRegistry> {
    &self.settlements
  }

  /// Creates an UNPAID order. Item ids are assigned here; the total is the sum
  /// of line totals and is never recomputed. Amounts that overflow `i64` are
  /// rejected with `AmountOverflow` and nothing is stored.
  #[instrument(name = "OrderManager::create", skip(self, items), fields(items = items.len()), err(Display))]
  pub async fn create(&self, user_id: &str, items: Vec<NewOrderItem>) -> Result<Uuid, OrderError> {
    let items = items
      .into_iter()
      .map(|item| item.into_item().ok_or(OrderError::AmountOverflow))
      .collect::<Result<Vec<_>, _>>()?;
    let total_price_fee = items
      .iter()
      .try_fold(0i64, |total, item| total.checked_add(item.total_price_fee))
      .ok_or(OrderError::AmountOverflow)?;

    let order = Order {
      id: Uuid::now_v7(),
      user_id: user_id.to_string(),
      created_time: Utc::now(),
      items,
      total_price_fee,
      status: OrderStatus::Unpaid,
      pay_approach: None,
      wechat_pay_out_trade_no: None,
    };
    self.store.insert(&order).await?;
    event!(Level::INFO, order_id = %order.id, total_price_fee, "Order created.");
    Ok(order.id)
  }

  pub async fn get(&self, id: Uuid) -> Result<Option<Order>, OrderError> {
    Ok(self.store.get(id).await?)
  }

  /// Newest first; `last_id` is the last id of the previous page.
  pub async fn list_by_user(&self, user_id: &str, last_id: Option<Uuid>, limit: usize) -> Result<Vec<Order>, OrderError> {
    Ok(self.store.list_by_user(user_id, last_id, limit).await?)
  }

  /// Starts a provider payment for an UNPAID order and returns the provider's
  /// prepay id.
  ///
  /// A previous attempt is closed first. If the provider reports that attempt
  /// as already paid, the order is settled here and the new attempt is still
  /// refused with `CreatePaymentFailed`.
  #[instrument(name = "OrderManager::initiate_payment", skip(self, notify_url, open_id), err(Display))]
  pub async fn initiate_payment(
    &self,
    order_id: Uuid,
    client_ip: &str,
    notify_url: &str,
    open_id: &str,
  ) -> Result<String, OrderError> {
    let order = self.store.get(order_id).await?.ok_or(OrderError::NoSuchOrder)?;
    if !order.is_unpaid() {
      return Err(OrderError::OrderNotUnpaid);
    }

    if let Some(previous) = order.wechat_pay_out_trade_no.as_deref() {
      let reply = self.gateway.cancel_order(previous).await?;
      match reply.cancel_outcome() {
        CancelOutcome::Closed => {
          event!(Level::DEBUG, out_trade_no = %previous, "Closed previous payment attempt.");
        }
        CancelOutcome::AlreadyPaid => {
          log_gateway_failure(&reply, "Previous payment attempt is already paid; settling.");
          self.settle(order_id).await?;
          return Err(OrderError::CreatePaymentFailed);
        }
        CancelOutcome::Failed { code } => {
          event!(Level::ERROR, %code, "Could not close previous payment attempt.");
          log_gateway_failure(&reply, "Close order failed.");
          return Err(OrderError::CreatePaymentFailed);
        }
      }
    }

    // Recorded before the provider call and kept even if that call fails.
    let out_trade_no = Uuid::new_v4().simple().to_string();
    self.store.set_trade_no(order_id, &out_trade_no).await?;

    let request = UnifiedOrderRequest {
      body: format!("{}-{}", self.body_title, order_id),
      attach: order_id.to_string(),
      out_trade_no,
      total_fee: order.total_price_fee,
      spbill_create_ip: client_ip.to_string(),
      notify_url: notify_url.to_string(),
      open_id: open_id.to_string(),
    };
    let reply = self.gateway.create_order(request).await?;
    if !reply.is_success() {
      log_gateway_failure(&reply, "Create payment failed.");
      return Err(OrderError::CreatePaymentFailed);
    }

    match reply.field("prepay_id") {
      Some(prepay_id) if !prepay_id.is_empty() => Ok(prepay_id.to_string()),
      _ => {
        log_gateway_failure(&reply, "Create payment reply has no prepay_id.");
        Err(OrderError::CreatePaymentFailed)
      }
    }
  }

  /// Marks the order PAID and runs the settlement callback of each item.
  ///
  /// Only the call that moves the order out of UNPAID runs the callbacks and
  /// returns `true`. Unknown orders and repeat calls return `Ok(false)`.
  /// Callback errors are logged, not returned.
  #[instrument(name = "OrderManager::settle", skip(self), err(Display))]
  pub async fn settle(&self, order_id: Uuid) -> Result<bool, OrderError> {
    let Some(order) = self.store.get(order_id).await? else {
      event!(Level::WARN, "Settlement for unknown order dropped.");
      return Ok(false);
    };

    if !self.store.mark_paid(order_id, PayApproach::Wechat).await? {
      event!(Level::INFO, status = %order.status, "Order already settled.");
      return Ok(false);
    }

    for item in &order.items {
      let Some(callback) = self.settlements.get(&item.sellable_type) else {
        event!(Level::DEBUG, item_id = %item.id, sellable_type = %item.sellable_type, "No settlement callback for type.");
        continue;
      };
      if let Err(e) = callback.on_paid(order_id, item.id).await {
        event!(Level::ERROR, item_id = %item.id, sellable_type = %item.sellable_type, error = %e, "Settlement callback failed.");
      }
    }

    event!(Level::INFO, "Order settled.");
    Ok(true)
  }
}

fn log_gateway_failure(reply: &GatewayReply, message: &str) {
  event!(
    Level::ERROR,
    request_body = %reply.request_body,
    response_body = %reply.response_body,
    "{}",
    message
  );
}
