// ticketing_app/src/orders/settlement.rs

//! Per-sellable-type reactions to an order becoming PAID.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tracing::{event, Level};
use uuid::Uuid;

/// Runs once per item when its order is settled. Registered before the server
/// accepts traffic.
///
/// Implementations should still tolerate a repeated call for the same item
/// (e.g. treat a duplicate insert as success).
#[async_trait]
pub trait SettlementCallback: Send + Sync {
  async fn on_paid(&self, order_id: Uuid, item_id: Uuid) -> anyhow::Result<()>;
}

struct FnSettlement<F> {
  f: F,
}

#[async_trait]
impl<F, Fut> SettlementCallback for FnSettlement<F>
where
  F: Fn(Uuid, Uuid) -> Fut + Send + Sync + 'static,
  Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
  async fn on_paid(&self, order_id: Uuid, item_id: Uuid) -> anyhow::Result<()> {
    (self.f)(order_id, item_id).await
  }
}

/// Wraps an async closure as a settlement callback.
pub fn settlement_fn<F, Fut>(f: F) -> Arc<dyn SettlementCallback>
where
  F: Fn(Uuid, Uuid) -> Fut + Send + Sync + 'static,
  Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
  Arc::new(FnSettlement { f })
}

#[derive(Default)]
pub struct SettlementRegistry {
  callbacks: RwLock<HashMap<String, Arc<dyn SettlementCallback>>>,
}

impl SettlementRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn register(&self, sellable_type: &str, callback: Arc<dyn SettlementCallback>) {
    if self.callbacks.write().insert(sellable_type.to_string(), callback).is_some() {
      event!(Level::WARN, %sellable_type, "Replaced settlement callback.");
    }
  }

  pub fn get(&self, sellable_type: &str) -> Option<Arc<dyn SettlementCallback>> {
    self.callbacks.read().get(sellable_type).cloned()
  }

  pub fn contains(&self, sellable_type: &str) -> bool {
    self.callbacks.read().contains_key(sellable_type)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicUsize, Ordering};

  #[tokio::test]
  async fn closure_callbacks_are_looked_up_by_type() {
    let registry = SettlementRegistry::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    registry.register(
      "TICKET",
      settlement_fn(move |_order, _item| {
        let counter = counter.clone();
        async move {
          counter.fetch_add(1, Ordering::SeqCst);
          Ok(())
        }
      }),
    );

    assert!(registry.contains("TICKET"));
    assert!(registry.get("MERCH").is_none());

    let cb = registry.get("TICKET").unwrap();
    cb.on_paid(Uuid::now_v7(), Uuid::now_v7()).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }
}
