// ticketing_app/src/store/mod.rs

//! Persistence of orders.

pub mod memory;
pub mod postgres;

pub use memory::MemoryOrderStore;
pub use postgres::PgOrderStore;

use crate::models::{Order, PayApproach};
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Order {0} already exists")]
  Duplicate(Uuid),

  #[error("Stored order {id} is unreadable: {reason}")]
  Corrupt { id: Uuid, reason: String },
}

#[async_trait]
pub trait OrderStore: Send + Sync {
  async fn insert(&self, order: &Order) -> Result<(), StoreError>;

  async fn get(&self, id: Uuid) -> Result<Option<Order>, StoreError>;

  /// Orders of `user_id`, newest first, with ids strictly below `before`.
  async fn list_by_user(&self, user_id: &str, before: Option<Uuid>, limit: usize) -> Result<Vec<Order>, StoreError>;

  /// Records the correlation token of a new payment attempt.
  async fn set_trade_no(&self, id: Uuid, trade_no: &str) -> Result<(), StoreError>;

  /// Moves the order from UNPAID to PAID. Returns `true` only for the call
  /// that performed the transition.
  async fn mark_paid(&self, id: Uuid, approach: PayApproach) -> Result<bool, StoreError>;
}
