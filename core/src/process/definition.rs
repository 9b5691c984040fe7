// proc_chain/src/process/definition.rs

//! Contains the `Process<Ctx>` struct: an ordered interceptor chain plus the
//! binder that turns a raw request body into the process's parameter type.

use crate::core::call::BoundParam;
use crate::core::interceptor::SharedInterceptor;
use crate::error::ChainError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// Builds a fresh, type-erased parameter object from the raw request body.
pub type ParamBinder = Box<dyn Fn(Value) -> Result<BoundParam, serde_json::Error> + Send + Sync>;

pub struct Process<Ctx: Send + Sync + 'static> {
  pub(crate) name: Arc<str>,
  pub(crate) interceptors: Vec<SharedInterceptor<Ctx>>,
  pub(crate) binder: ParamBinder,
  pub(crate) param_type: &'static str,
}

impl<Ctx: Send + Sync + 'static> Process<Ctx> {
  /// Creates a process whose body binds into `P`.
  ///
  /// Panics if `interceptors` is empty: a process with nothing to run is a
  /// wiring mistake, caught at startup rather than on the first request.
  pub fn new<P>(name: impl Into<Arc<str>>, interceptors: Vec<SharedInterceptor<Ctx>>) -> Self
  where
    P: DeserializeOwned + Send + Sync + 'static,
  {
    let name = name.into();
    if interceptors.is_empty() {
      panic!("proc_chain setup error: process '{}' registered without interceptors.", name);
    }
    Self {
      name,
      interceptors,
      binder: Box::new(|raw: Value| {
        // An absent body binds like an empty object so that parameter types
        // made only of optional/defaulted fields still work.
        let raw = if raw.is_null() { Value::Object(Default::default()) } else { raw };
        let param: P = serde_json::from_value(raw)?;
        Ok(Arc::new(param) as BoundParam)
      }),
      param_type: std::any::type_name::<P>(),
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn len(&self) -> usize {
    self.interceptors.len()
  }

  pub fn is_empty(&self) -> bool {
    self.interceptors.is_empty()
  }

  pub fn param_type(&self) -> &'static str {
    self.param_type
  }

  /// Instantiates this process's parameter object from `raw`.
  pub fn bind(&self, raw: Value) -> Result<BoundParam, ChainError> {
    (self.binder)(raw).map_err(|source| self.binding_error(source))
  }

  /// Like `bind`, from an unparsed body. A blank body binds as `null`.
  pub fn bind_bytes(&self, body: &[u8]) -> Result<BoundParam, ChainError> {
    let raw = if body.iter().all(u8::is_ascii_whitespace) {
      Value::Null
    } else {
      serde_json::from_slice(body).map_err(|source| self.binding_error(source))?
    };
    self.bind(raw)
  }

  fn binding_error(&self, source: serde_json::Error) -> ChainError {
    ChainError::Binding {
      process: self.name.to_string(),
      source,
    }
  }
}

impl<Ctx: Send + Sync + 'static> std::fmt::Debug for Process<Ctx> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Process")
      .field("name", &self.name)
      .field("interceptors", &self.interceptors.len())
      .field("param_type", &self.param_type)
      .finish()
  }
}
