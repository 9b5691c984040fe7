// proc_chain/demos/guarded_process.rs

use proc_chain::{async_trait, terminal, Call, ChainError, ChainResult, ContextData, Interceptor, Next, ProcessRegistry};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

// 1. Per-request context. In a web app this would hold the session.
#[derive(Debug, Default)]
struct DemoContext {
  user_id: Option<String>,
}

// 2. Parameter type the request body binds into.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GreetParam {
  name: String,
}

// 3. A guard that short-circuits with a typed failure.
struct EnsureLoggedIn;

#[async_trait]
impl Interceptor<DemoContext> for EnsureLoggedIn {
  async fn handle(&self, call: Call<DemoContext>, next: Next<'_, DemoContext>) -> ChainResult {
    if call.ctx().read().user_id.is_none() {
      return Err(ChainError::failure("DEMO.NOT_LOGGED_IN"));
    }
    next.run(call).await
  }
}

#[tokio::main]
async fn main() -> Result<(), ChainError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  let registry = ProcessRegistry::<DemoContext>::new();
  registry.register::<GreetParam>(
    "demo.greet",
    vec![
      Arc::new(EnsureLoggedIn),
      terminal(|call: Call<DemoContext>| async move {
        let param = call.param::<GreetParam>()?;
        let user = call.ctx().read().user_id.clone().unwrap_or_default();
        Ok(json!({ "greeting": format!("hello {}, from {}", param.name, user) }))
      }),
    ],
  );

  let anonymous = ContextData::new(DemoContext::default());
  let envelope = registry.dispatch(Some("demo.greet"), json!({"name": "world"}), anonymous).await?;
  info!("anonymous: {}", serde_json::to_string(&envelope).unwrap_or_default());

  let logged_in = ContextData::new(DemoContext {
    user_id: Some("u-1".to_string()),
  });
  let envelope = registry.dispatch(Some("demo.greet"), json!({"name": "world"}), logged_in).await?;
  info!("logged in: {}", serde_json::to_string(&envelope).unwrap_or_default());

  let envelope = registry.dispatch(None, json!({}), ContextData::new(DemoContext::default())).await?;
  info!("unnamed: {}", serde_json::to_string(&envelope).unwrap_or_default());

  Ok(())
}
