// ticketing_app/src/store/memory.rs

use crate::models::{Order, OrderStatus, PayApproach};
use crate::store::{OrderStore, StoreError};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

/// Process-local store. Used when no database is configured, and by tests.
#[derive(Default)]
pub struct MemoryOrderStore {
  orders: RwLock<HashMap<Uuid, Order>>,
}

impl MemoryOrderStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.orders.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.orders.read().is_empty()
  }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
  async fn insert(&self, order: &Order) -> Result<(), StoreError> {
    let mut orders = self.orders.write();
    if orders.contains_key(&order.id) {
      return Err(StoreError::Duplicate(order.id));
    }
    orders.insert(order.id, order.clone());
    Ok(())
  }

  async fn get(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
    Ok(self.orders.read().get(&id).cloned())
  }

  async fn list_by_user(&self, user_id: &str, before: Option<Uuid>, limit: usize) -> Result<Vec<Order>, StoreError> {
    let mut found: Vec<Order> = self
      .orders
      .read()
      .values()
      .filter(|o| o.user_id == user_id && before.map_or(true, |b| o.id < b))
      .cloned()
      .collect();
    found.sort_by(|a, b| b.id.cmp(&a.id));
    found.truncate(limit);
    Ok(found)
  }

  async fn set_trade_no(&self, id: Uuid, trade_no: &str) -> Result<(), StoreError> {
    if let Some(order) = self.orders.write().get_mut(&id) {
      order.wechat_pay_out_trade_no = Some(trade_no.to_string());
    }
    Ok(())
  }

  async fn mark_paid(&self, id: Uuid, approach: PayApproach) -> Result<bool, StoreError> {
    let mut orders = self.orders.write();
    match orders.get_mut(&id) {
      Some(order) if order.status == OrderStatus::Unpaid => {
        order.status = OrderStatus::Paid;
        order.pay_approach = Some(approach);
        Ok(true)
      }
      _ => Ok(false),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Utc;

  fn order(user: &str) -> Order {
    Order {
      id: Uuid::now_v7(),
      user_id: user.to_string(),
      created_time: Utc::now(),
      items: vec![],
      total_price_fee: 0,
      status: OrderStatus::Unpaid,
      pay_approach: None,
      wechat_pay_out_trade_no: None,
    }
  }

  #[tokio::test]
  async fn mark_paid_transitions_once() {
    let store = MemoryOrderStore::new();
    let o = order("u1");
    store.insert(&o).await.unwrap();

    assert!(store.mark_paid(o.id, PayApproach::Wechat).await.unwrap());
    assert!(!store.mark_paid(o.id, PayApproach::Wechat).await.unwrap());
    assert!(!store.mark_paid(Uuid::now_v7(), PayApproach::Wechat).await.unwrap());

    let stored = store.get(o.id).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Paid);
    assert_eq!(stored.pay_approach, Some(PayApproach::Wechat));
  }

  #[tokio::test]
  async fn list_is_newest_first_and_paged_by_id() {
    let store = MemoryOrderStore::new();
    let mut ids = Vec::new();
    for _ in 0..4 {
      let o = order("u1");
      ids.push(o.id);
      store.insert(&o).await.unwrap();
    }
    store.insert(&order("u2")).await.unwrap();
    ids.sort();

    let first = store.list_by_user("u1", None, 3).await.unwrap();
    assert_eq!(first.iter().map(|o| o.id).collect::<Vec<_>>(), vec![ids[3], ids[2], ids[1]]);

    let rest = store.list_by_user("u1", Some(ids[1]), 3).await.unwrap();
    assert_eq!(rest.iter().map(|o| o.id).collect::<Vec<_>>(), vec![ids[0]]);
  }

  #[tokio::test]
  async fn insert_rejects_duplicate_id() {
    let store = MemoryOrderStore::new();
    let o = order("u1");
    store.insert(&o).await.unwrap();
    assert!(matches!(store.insert(&o).await, Err(StoreError::Duplicate(id)) if id == o.id));
  }
}
