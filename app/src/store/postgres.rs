// ticketing_app/src/store/postgres.rs

use crate::models::{Order, OrderItem, OrderStatus, PayApproach};
use crate::store::{OrderStore, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::{debug, instrument};
use uuid::Uuid;

const CREATE_ORDERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS orders (
  id UUID PRIMARY KEY,
  user_id TEXT NOT NULL,
  created_time TIMESTAMPTZ NOT NULL,
  items JSONB NOT NULL,
  total_price_fee BIGINT NOT NULL,
  status TEXT NOT NULL,
  pay_approach TEXT,
  wechat_pay_out_trade_no TEXT
)"#;

const CREATE_USER_INDEX: &str = "CREATE INDEX IF NOT EXISTS orders_user_id_id_idx ON orders (user_id, id DESC)";

const SELECT_COLUMNS: &str =
  "SELECT id, user_id, created_time, items, total_price_fee, status, pay_approach, wechat_pay_out_trade_no FROM orders";

#[derive(FromRow)]
struct OrderRow {
  id: Uuid,
  user_id: String,
  created_time: DateTime<Utc>,
  items: Json<Vec<OrderItem>>,
  total_price_fee: i64,
  status: String,
  pay_approach: Option<String>,
  wechat_pay_out_trade_no: Option<String>,
}

impl TryFrom<OrderRow> for Order {
  type Error = StoreError;

  fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
    let id = row.id;
    let corrupt = move |reason: String| StoreError::Corrupt { id, reason };
    let status: OrderStatus = row.status.parse().map_err(corrupt)?;
    let pay_approach = match &row.pay_approach {
      Some(a) => Some(a.parse::<PayApproach>().map_err(corrupt)?),
      None => None,
    };
    Ok(Order {
      id: row.id,
      user_id: row.user_id,
      created_time: row.created_time,
      items: row.items.0,
      total_price_fee: row.total_price_fee,
      status,
      pay_approach,
      wechat_pay_out_trade_no: row.wechat_pay_out_trade_no,
    })
  }
}

pub struct PgOrderStore {
  pool: PgPool,
}

impl PgOrderStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  /// Creates the `orders` table and its listing index when missing.
  pub async fn ensure_schema(&self) -> Result<(), StoreError> {
    sqlx::query(CREATE_ORDERS_TABLE).execute(&self.pool).await?;
    sqlx::query(CREATE_USER_INDEX).execute(&self.pool).await?;
    debug!("Order schema ready.");
    Ok(())
  }
}

#[async_trait]
impl OrderStore for PgOrderStore {
  #[instrument(name = "PgOrderStore::insert", skip_all, fields(order_id = %order.id), err(Display))]
  async fn insert(&self, order: &Order) -> Result<(), StoreError> {
    let result = sqlx::query(
      "INSERT INTO orders (id, user_id, created_time, items, total_price_fee, status, pay_approach, wechat_pay_out_trade_no) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(order.id)
    .bind(&order.user_id)
    .bind(order.created_time)
    .bind(Json(&order.items))
    .bind(order.total_price_fee)
    .bind(order.status.as_str())
    .bind(order.pay_approach.map(|a| a.as_str()))
    .bind(order.wechat_pay_out_trade_no.as_deref())
    .execute(&self.pool)
    .await;

    match result {
      Ok(_) => Ok(()),
      Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(StoreError::Duplicate(order.id)),
      Err(e) => Err(e.into()),
    }
  }

  async fn get(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
    let row: Option<OrderRow> = sqlx::query_as(&format!("{} WHERE id = $1", SELECT_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    row.map(Order::try_from).transpose()
  }

  async fn list_by_user(&self, user_id: &str, before: Option<Uuid>, limit: usize) -> Result<Vec<Order>, StoreError> {
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let rows: Vec<OrderRow> = match before {
      Some(before) => {
        sqlx::query_as(&format!(
          "{} WHERE user_id = $1 AND id < $2 ORDER BY id DESC LIMIT $3",
          SELECT_COLUMNS
        ))
        .bind(user_id)
        .bind(before)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?
      }
      None => {
        sqlx::query_as(&format!("{} WHERE user_id = $1 ORDER BY id DESC LIMIT $2", SELECT_COLUMNS))
          .bind(user_id)
          .bind(limit)
          .fetch_all(&self.pool)
          .await?
      }
    };
    rows.into_iter().map(Order::try_from).collect()
  }

  async fn set_trade_no(&self, id: Uuid, trade_no: &str) -> Result<(), StoreError> {
    sqlx::query("UPDATE orders SET wechat_pay_out_trade_no = $2 WHERE id = $1")
      .bind(id)
      .bind(trade_no)
      .execute(&self.pool)
      .await?;
    Ok(())
  }

  async fn mark_paid(&self, id: Uuid, approach: PayApproach) -> Result<bool, StoreError> {
    let result = sqlx::query("UPDATE orders SET status = $2, pay_approach = $3 WHERE id = $1 AND status = $4")
      .bind(id)
      .bind(OrderStatus::Paid.as_str())
      .bind(approach.as_str())
      .bind(OrderStatus::Unpaid.as_str())
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected() == 1)
  }
}
