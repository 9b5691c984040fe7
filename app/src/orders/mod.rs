// ticketing_app/src/orders/mod.rs

//! Order lifecycle: creation, payment initiation and settlement.

pub mod errors;
pub mod manager;
pub mod settlement;

pub use errors::{
  OrderError, FAIL_CD_CREATE_WECHAT_PAY_ORDER_FAIL, FAIL_CD_NO_SUCH_ORDER, FAIL_CD_ORDER_STATUS_NOT_BE_UNPAID,
};
pub use manager::{OrderManager, DEFAULT_PAGE_SIZE};
pub use settlement::{settlement_fn, SettlementCallback, SettlementRegistry};
