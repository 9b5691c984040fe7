// ticketing_app/src/models/order_item.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
  pub id: Uuid,
  /// Selects the settlement callback run when the order is paid.
  pub sellable_type: String,
  /// Opaque to orders; interpreted by the settlement callback of `sellable_type`.
  pub sellable_value: String,
  pub quantity: u32,
  pub unit_price_fee: i64,
  pub total_price_fee: i64,
}

/// A line item as submitted by the module selling it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewOrderItem {
  pub sellable_type: String,
  pub sellable_value: String,
  pub quantity: u32,
  pub unit_price_fee: i64,
}

impl NewOrderItem {
  /// `None` when the product does not fit in an `i64`.
  pub fn line_total(&self) -> Option<i64> {
    self.unit_price_fee.checked_mul(i64::from(self.quantity))
  }

  /// `None` when the line total overflows.
  pub(crate) fn into_item(self) -> Option<OrderItem> {
    let total_price_fee = self.line_total()?;
    Some(OrderItem {
      id: Uuid::now_v7(),
      sellable_type: self.sellable_type,
      sellable_value: self.sellable_value,
      quantity: self.quantity,
      unit_price_fee: self.unit_price_fee,
      total_price_fee,
    })
  }
}
