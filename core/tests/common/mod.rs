// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use proc_chain::{async_trait, terminal, Call, ChainError, ChainResult, Interceptor, Next, SharedInterceptor};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};
use tracing::Level;

// --- Common Context / Param Structs ---
#[derive(Clone, Debug, Default)]
pub struct TestContext {
  pub counter: i32,
  pub steps_executed: Vec<String>,
  pub user_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EchoParam {
  pub message: String,
  pub owner_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StrictParam {
  pub amount: u32,
}

// --- What a recording interceptor does once it has logged itself ---
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Then {
  Continue,
  ShortCircuit,
  Fail,
  Fault,
}

/// Records its name in the context, then acts according to `then`.
pub struct Recording {
  pub name: &'static str,
  pub then: Then,
  pub hits: Arc<AtomicUsize>,
}

#[async_trait]
impl Interceptor<TestContext> for Recording {
  async fn handle(&self, call: Call<TestContext>, next: Next<'_, TestContext>) -> ChainResult {
    self.hits.fetch_add(1, Ordering::SeqCst);
    call.ctx().with_mut(|c| {
      c.counter += 1;
      c.steps_executed.push(self.name.to_string());
    });
    tracing::debug!(target: "test_interceptors", step = %self.name, then = ?self.then, "executed");
    match self.then {
      Then::Continue => next.run(call).await,
      Then::ShortCircuit => Ok(json!({ "stopped_at": self.name })),
      Then::Fail => Err(ChainError::failure_with_detail(
        "TEST.REJECTED",
        json!({ "by": self.name }),
      )),
      Then::Fault => Err(anyhow::anyhow!("{} blew up", self.name).into()),
    }
  }
}

pub fn recording(name: &'static str, then: Then) -> (SharedInterceptor<TestContext>, Arc<AtomicUsize>) {
  let hits = Arc::new(AtomicUsize::new(0));
  (
    Arc::new(Recording {
      name,
      then,
      hits: hits.clone(),
    }),
    hits,
  )
}

/// Terminal handler echoing the bound `EchoParam`.
pub fn echo_handler() -> SharedInterceptor<TestContext> {
  terminal(|call: Call<TestContext>| async move {
    let param = call.param::<EchoParam>()?;
    call.ctx().write().steps_executed.push("echo".to_string());
    Ok(json!({ "echo": param.message }))
  })
}

/// Requires `user_id` in the context; fails `TEST.NOT_LOGGED_IN` otherwise.
pub struct RequireUser;

#[async_trait]
impl Interceptor<TestContext> for RequireUser {
  async fn handle(&self, call: Call<TestContext>, next: Next<'_, TestContext>) -> ChainResult {
    let logged_in = call.ctx().read().user_id.is_some();
    if !logged_in {
      return Err(ChainError::failure("TEST.NOT_LOGGED_IN"));
    }
    next.run(call).await
  }
}

/// Continues, then wraps the downstream result. Used to check that `Next`
/// returns the next interceptor's value.
pub struct Wrapping;

#[async_trait]
impl Interceptor<TestContext> for Wrapping {
  async fn handle(&self, call: Call<TestContext>, next: Next<'_, TestContext>) -> ChainResult {
    let inner: Value = next.run(call).await?;
    Ok(json!({ "wrapped": inner }))
  }
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
