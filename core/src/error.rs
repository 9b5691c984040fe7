// proc_chain/src/error.rs
use anyhow::Error as AnyhowError;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// An expected, client-renderable failure: a stable code plus optional detail.
///
/// Interceptors return this (wrapped in `ChainError::Failed`) to abort the whole
/// chain. The dispatcher renders it as a `FAIL` envelope instead of treating it
/// as a fault.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
  pub code: String,
  pub detail: Option<Value>,
}

impl Failure {
  pub fn new(code: impl Into<String>) -> Self {
    Self {
      code: code.into(),
      detail: None,
    }
  }

  pub fn with_detail(code: impl Into<String>, detail: Value) -> Self {
    Self {
      code: code.into(),
      detail: Some(detail),
    }
  }
}

impl fmt::Display for Failure {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.code)
  }
}

#[derive(Debug, Error)]
pub enum ChainError {
  /// Typed failure. The only variant the dispatcher turns into an envelope.
  #[error("Process failed with code {0}")]
  Failed(Failure),

  #[error("Could not bind request body for process '{process}'. Source: {source}")]
  Binding {
    process: String,
    #[source]
    source: serde_json::Error,
  },

  #[error("Parameter type mismatch in process '{process}' (expected {expected_type})")]
  ParamTypeMismatch { process: String, expected_type: String },

  #[error("Fault in interceptor or downstream operation. Source: {source}")]
  Handler {
    #[source]
    source: AnyhowError,
  },
}

impl ChainError {
  pub fn failure(code: impl Into<String>) -> Self {
    ChainError::Failed(Failure::new(code))
  }

  pub fn failure_with_detail(code: impl Into<String>, detail: Value) -> Self {
    ChainError::Failed(Failure::with_detail(code, detail))
  }

  /// True for the typed tier, false for faults.
  pub fn is_failure(&self) -> bool {
    matches!(self, ChainError::Failed(_))
  }

  pub fn failure_code(&self) -> Option<&str> {
    match self {
      ChainError::Failed(f) => Some(f.code.as_str()),
      _ => None,
    }
  }
}

impl From<Failure> for ChainError {
  fn from(f: Failure) -> Self {
    ChainError::Failed(f)
  }
}

impl From<AnyhowError> for ChainError {
  fn from(err: AnyhowError) -> Self {
    // A Failure that travelled through anyhow stays a Failure.
    match err.downcast::<Failure>() {
      Ok(f) => ChainError::Failed(f),
      Err(source) => ChainError::Handler { source },
    }
  }
}

impl From<serde_json::Error> for ChainError {
  fn from(err: serde_json::Error) -> Self {
    ChainError::Handler { source: err.into() }
  }
}

impl std::error::Error for Failure {}

/// What every interceptor returns: the JSON result of the chain or an error.
pub type ChainResult<T = Value, E = ChainError> = std::result::Result<T, E>;
