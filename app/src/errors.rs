// ticketing_app/src/errors.rs

use actix_web::{HttpResponse, ResponseError};
use proc_chain::ChainError;
use serde_json::json;
use thiserror::Error;

use crate::session::SessionError;

/// Errors that end a request (or startup) outside the RPC envelope.
#[derive(Debug, Error)]
pub enum AppError {
  #[error("Configuration Error: {0}")]
  Config(String),

  /// The request body could not be bound to the process parameters.
  #[error("Bad Request: {0}")]
  BadRequest(String),

  #[error("Process fault: {0}")]
  Process(ChainError),

  #[error("Session Error: {0}")]
  Session(#[from] SessionError),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl From<ChainError> for AppError {
  fn from(err: ChainError) -> Self {
    match err {
      ChainError::Binding { .. } => AppError::BadRequest(err.to_string()),
      other => AppError::Process(other),
    }
  }
}

impl ResponseError for AppError {
  fn error_response(&self) -> HttpResponse {
    // Log the full error when it's turned into a response
    tracing::error!(application_error = %self, "Responding with error");
    // Bodies stay generic; details are in the log only.
    match self {
      AppError::BadRequest(_) => HttpResponse::BadRequest().json(json!({"error": "Invalid request body"})),
      _ => HttpResponse::InternalServerError().json(json!({"error": "An internal error occurred"})),
    }
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::http::StatusCode;

  #[test]
  fn binding_errors_are_client_errors() {
    let source = serde_json::from_str::<u32>("\"x\"").unwrap_err();
    let err: AppError = ChainError::Binding {
      process: "order.get".to_string(),
      source,
    }
    .into();
    assert_eq!(err.error_response().status(), StatusCode::BAD_REQUEST);
  }

  #[test]
  fn faults_are_server_errors() {
    let err: AppError = ChainError::from(anyhow::anyhow!("boom")).into();
    assert!(matches!(err, AppError::Process(_)));
    assert_eq!(err.error_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
  }
}
