// proc_chain/src/core/call.rs

//! Defines `Call<Ctx>`, the per-request value every interceptor receives.

use crate::core::context_data::ContextData;
use crate::error::ChainError;
use std::any::Any;
use std::sync::Arc;

/// Type-erased bound parameter of a process.
pub type BoundParam = Arc<dyn Any + Send + Sync>;

/// One invocation of a registered process.
///
/// Holds the process name, the parameter object bound from the request body
/// and the shared request context. Cloning shares all three.
pub struct Call<Ctx: Send + Sync + 'static> {
  process: Arc<str>,
  param: BoundParam,
  ctx: ContextData<Ctx>,
}

impl<Ctx: Send + Sync + 'static> Call<Ctx> {
  pub fn new(process: impl Into<Arc<str>>, param: BoundParam, ctx: ContextData<Ctx>) -> Self {
    Self {
      process: process.into(),
      param,
      ctx,
    }
  }

  pub fn process(&self) -> &str {
    &self.process
  }

  /// Downcasts the bound parameter to the type the process was registered with.
  ///
  /// A mismatch means an interceptor was wired into the wrong process, so it is
  /// reported as a fault rather than a typed failure.
  pub fn param<P: Send + Sync + 'static>(&self) -> Result<&P, ChainError> {
    self.param.downcast_ref::<P>().ok_or_else(|| {
      tracing::error!(process = %self.process, expected = %std::any::type_name::<P>(), "Bound parameter type mismatch.");
      ChainError::ParamTypeMismatch {
        process: self.process.to_string(),
        expected_type: std::any::type_name::<P>().to_string(),
      }
    })
  }

  pub fn ctx(&self) -> &ContextData<Ctx> {
    &self.ctx
  }
}

impl<Ctx: Send + Sync + 'static> Clone for Call<Ctx> {
  fn clone(&self) -> Self {
    Self {
      process: Arc::clone(&self.process),
      param: Arc::clone(&self.param),
      ctx: self.ctx.clone(),
    }
  }
}

impl<Ctx: Send + Sync + 'static> std::fmt::Debug for Call<Ctx> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Call").field("process", &self.process).finish_non_exhaustive()
  }
}
