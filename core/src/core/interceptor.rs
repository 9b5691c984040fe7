// proc_chain/src/core/interceptor.rs

//! Defines the `Interceptor<Ctx>` contract and the `Next` continuation.
//!
//! A process is an ordered list of interceptors. Each one receives the `Call`
//! and a `Next` that points at the rest of the list:
//!  - calling `next.run(call).await` hands control to the following interceptor
//!    and yields its result;
//!  - returning without calling it short-circuits the chain (nothing after this
//!    interceptor runs);
//!  - returning `Err(ChainError::Failed(..))` aborts the whole request with a
//!    typed failure.

use crate::core::call::Call;
use crate::error::ChainResult;
use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tracing::{event, Level};

#[async_trait]
pub trait Interceptor<Ctx>: Send + Sync
where
  Ctx: Send + Sync + 'static,
{
  async fn handle(&self, call: Call<Ctx>, next: Next<'_, Ctx>) -> ChainResult;
}

pub type SharedInterceptor<Ctx> = Arc<dyn Interceptor<Ctx>>;

/// Continuation over the interceptors that have not run yet.
///
/// It only ever moves forward: `run` consumes it and hands the tail to the
/// next interceptor, so an interceptor cannot re-enter or skip backwards.
pub struct Next<'a, Ctx: Send + Sync + 'static> {
  remaining: &'a [SharedInterceptor<Ctx>],
}

impl<'a, Ctx: Send + Sync + 'static> Next<'a, Ctx> {
  pub(crate) fn new(remaining: &'a [SharedInterceptor<Ctx>]) -> Self {
    Self { remaining }
  }

  /// Number of interceptors still ahead of the caller.
  pub fn remaining(&self) -> usize {
    self.remaining.len()
  }

  /// Invokes the next interceptor. Past the end of the chain this is a no-op
  /// returning `Value::Null`.
  pub async fn run(self, call: Call<Ctx>) -> ChainResult {
    match self.remaining.split_first() {
      Some((head, rest)) => head.handle(call, Next::new(rest)).await,
      None => {
        event!(Level::TRACE, process = call.process(), "Next called past the end of the chain.");
        Ok(Value::Null)
      }
    }
  }
}

/// Adapter for a last-in-chain business handler written as an async closure.
pub struct Terminal<F> {
  f: F,
}

#[async_trait]
impl<Ctx, F, Fut> Interceptor<Ctx> for Terminal<F>
where
  Ctx: Send + Sync + 'static,
  F: Fn(Call<Ctx>) -> Fut + Send + Sync + 'static,
  Fut: Future<Output = ChainResult> + Send + 'static,
{
  async fn handle(&self, call: Call<Ctx>, _next: Next<'_, Ctx>) -> ChainResult {
    (self.f)(call).await
  }
}

/// Wraps an async closure as a terminal interceptor.
///
/// ```ignore
/// let get = terminal(|call: Call<MyCtx>| async move {
///   let p = call.param::<GetParam>()?;
///   Ok(serde_json::json!({ "id": p.id }))
/// });
/// ```
pub fn terminal<Ctx, F, Fut>(f: F) -> SharedInterceptor<Ctx>
where
  Ctx: Send + Sync + 'static,
  F: Fn(Call<Ctx>) -> Fut + Send + Sync + 'static,
  Fut: Future<Output = ChainResult> + Send + 'static,
{
  Arc::new(Terminal { f })
}
