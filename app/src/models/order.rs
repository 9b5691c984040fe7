// ticketing_app/src/models/order.rs

use crate::models::order_item::OrderItem;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
  Unpaid,
  Paid,
}

impl OrderStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      OrderStatus::Unpaid => "UNPAID",
      OrderStatus::Paid => "PAID",
    }
  }
}

impl fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for OrderStatus {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "UNPAID" => Ok(OrderStatus::Unpaid),
      "PAID" => Ok(OrderStatus::Paid),
      other => Err(format!("unknown order status '{}'", other)),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PayApproach {
  Wechat,
}

impl PayApproach {
  pub fn as_str(&self) -> &'static str {
    match self {
      PayApproach::Wechat => "WECHAT",
    }
  }
}

impl FromStr for PayApproach {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "WECHAT" => Ok(PayApproach::Wechat),
      other => Err(format!("unknown pay approach '{}'", other)),
    }
  }
}

/// An order. Items and total are fixed at creation; only `status`,
/// `pay_approach` and `wechat_pay_out_trade_no` change afterwards.
///
/// Ids are UUIDv7, so ordering by id is ordering by creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
  pub id: Uuid,
  pub user_id: String,
  pub created_time: DateTime<Utc>,
  pub items: Vec<OrderItem>,
  /// Minor currency units.
  pub total_price_fee: i64,
  pub status: OrderStatus,
  pub pay_approach: Option<PayApproach>,
  /// Correlation token of the latest payment attempt.
  pub wechat_pay_out_trade_no: Option<String>,
}

impl Order {
  pub fn is_unpaid(&self) -> bool {
    self.status == OrderStatus::Unpaid
  }
}
