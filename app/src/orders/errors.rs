// ticketing_app/src/orders/errors.rs

use crate::payment::GatewayError;
use crate::store::StoreError;
use proc_chain::ChainError;
use thiserror::Error;

pub const FAIL_CD_NO_SUCH_ORDER: &str = "ORDER.NO_SUCH_ORDER";
pub const FAIL_CD_ORDER_STATUS_NOT_BE_UNPAID: &str = "ORDER.ORDER_STATUS_NOT_BE_UNPAID";
pub const FAIL_CD_CREATE_WECHAT_PAY_ORDER_FAIL: &str = "ORDER.CREATE_WECHAT_PAY_ORDER_FAIL";

#[derive(Debug, Error)]
pub enum OrderError {
  #[error("No such order")]
  NoSuchOrder,

  #[error("Order is not UNPAID")]
  OrderNotUnpaid,

  #[error("Payment provider did not create the payment")]
  CreatePaymentFailed,

  #[error("Order amount overflows")]
  AmountOverflow,

  #[error("Order store error: {0}")]
  Store(#[from] StoreError),

  #[error("Payment gateway error: {0}")]
  Gateway(#[from] GatewayError),
}

impl OrderError {
  /// Failure code for the typed variants; `None` for faults.
  pub fn fail_code(&self) -> Option<&'static str> {
    match self {
      OrderError::NoSuchOrder => Some(FAIL_CD_NO_SUCH_ORDER),
      OrderError::OrderNotUnpaid => Some(FAIL_CD_ORDER_STATUS_NOT_BE_UNPAID),
      OrderError::CreatePaymentFailed => Some(FAIL_CD_CREATE_WECHAT_PAY_ORDER_FAIL),
      OrderError::AmountOverflow | OrderError::Store(_) | OrderError::Gateway(_) => None,
    }
  }
}

impl From<OrderError> for ChainError {
  fn from(err: OrderError) -> Self {
    match err.fail_code() {
      Some(code) => ChainError::failure(code),
      None => ChainError::Handler { source: err.into() },
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn typed_variants_become_failures_and_faults_stay_faults() {
    let typed: ChainError = OrderError::OrderNotUnpaid.into();
    assert_eq!(typed.failure_code(), Some(FAIL_CD_ORDER_STATUS_NOT_BE_UNPAID));

    let fault: ChainError = OrderError::Store(StoreError::Duplicate(uuid::Uuid::nil())).into();
    assert!(matches!(fault, ChainError::Handler { .. }));
  }
}
