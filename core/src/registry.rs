// proc_chain/src/registry.rs

//! Defines `ProcessRegistry<Ctx>`, the name-keyed registry that resolves and
//! dispatches processes.
//!
//! The registry is an ordinary value owned by the application state and shared
//! through an `Arc`; there is no process-wide global. Writers (registration at
//! startup) and readers (lookups per request) are serialized by a
//! `parking_lot::RwLock`, and a lookup clones the `Arc<Process>` so the lock is
//! never held while a chain runs.

use crate::core::call::BoundParam;
use crate::core::context_data::ContextData;
use crate::core::envelope::Envelope;
use crate::core::interceptor::SharedInterceptor;
use crate::error::{ChainError, Failure};
use crate::process::definition::Process;

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{event, instrument, Level};

/// No process with the requested name is registered.
pub const FAIL_CD_NO_SUCH_PROCESS: &str = "REST_JSON_RPC.NO_SUCH_PROCESS";

/// The request did not name a process.
pub const FAIL_CD_NOT_SPECIFIED_PROCESS: &str = "REST_JSON_RPC.NOT_SPECIFIED_PROCESS";

pub struct ProcessRegistry<Ctx: Send + Sync + 'static> {
  processes: RwLock<HashMap<String, Arc<Process<Ctx>>>>,
}

impl<Ctx: Send + Sync + 'static> ProcessRegistry<Ctx> {
  pub fn new() -> Self {
    Self {
      processes: RwLock::new(HashMap::new()),
    }
  }

  /// Registers `interceptors` under `name`, binding request bodies into `P`.
  /// Replaces any existing registration for `name`.
  ///
  /// Naming convention: `<module>.<process>`, e.g. `order.pay_by_wechat_h5`.
  pub fn register<P>(&self, name: &str, interceptors: Vec<SharedInterceptor<Ctx>>)
  where
    P: DeserializeOwned + Send + Sync + 'static,
  {
    let process = Process::new::<P>(name, interceptors);
    event!(Level::DEBUG, process = %name, param_type = %process.param_type(), interceptors = process.len(), "Registering process.");
    if self.processes.write().insert(name.to_string(), Arc::new(process)).is_some() {
      event!(Level::WARN, process = %name, "Replaced an existing process registration.");
    }
  }

  pub fn unregister(&self, name: &str) -> bool {
    self.processes.write().remove(name).is_some()
  }

  pub fn get(&self, name: &str) -> Option<Arc<Process<Ctx>>> {
    self.processes.read().get(name).cloned()
  }

  pub fn contains(&self, name: &str) -> bool {
    self.processes.read().contains_key(name)
  }

  /// Registered process names, sorted.
  pub fn process_names(&self) -> Vec<String> {
    let mut names: Vec<String> = self.processes.read().keys().cloned().collect();
    names.sort();
    names
  }

  /// Resolves `name`, binds `raw` and runs the chain.
  ///
  /// - missing/empty name: `FAIL` envelope with `REST_JSON_RPC.NOT_SPECIFIED_PROCESS`
  ///   (checked before any lookup);
  /// - unknown name: `FAIL` envelope with `REST_JSON_RPC.NO_SUCH_PROCESS`;
  /// - typed failure from any interceptor: `FAIL` envelope with its code/detail;
  /// - success: `OK` envelope with the first interceptor's return value.
  ///
  /// Binding errors and faults are not rendered; they come back as `Err` for
  /// the transport layer to turn into a generic error response.
  #[instrument(name = "ProcessRegistry::dispatch", skip(self, raw, ctx), fields(process = name.unwrap_or("")))]
  pub async fn dispatch(&self, name: Option<&str>, raw: Value, ctx: ContextData<Ctx>) -> Result<Envelope, ChainError> {
    let process = match self.resolve(name) {
      Ok(p) => p,
      Err(envelope) => return Ok(envelope),
    };
    let param = process.bind(raw)?;
    Self::run(&process, param, ctx).await
  }

  /// `dispatch` for an unparsed request body. The body is only parsed once
  /// the process is resolved, so a bad body never hides a bad name.
  #[instrument(name = "ProcessRegistry::dispatch_bytes", skip(self, body, ctx), fields(process = name.unwrap_or("")))]
  pub async fn dispatch_bytes(&self, name: Option<&str>, body: &[u8], ctx: ContextData<Ctx>) -> Result<Envelope, ChainError> {
    let process = match self.resolve(name) {
      Ok(p) => p,
      Err(envelope) => return Ok(envelope),
    };
    let param = process.bind_bytes(body)?;
    Self::run(&process, param, ctx).await
  }

  /// The process registered under `name`, or the `FAIL` envelope to answer with.
  fn resolve(&self, name: Option<&str>) -> Result<Arc<Process<Ctx>>, Envelope> {
    let name = match name {
      Some(n) if !n.is_empty() => n,
      _ => {
        event!(Level::INFO, "Request did not specify a process.");
        return Err(Envelope::fail(Failure::new(FAIL_CD_NOT_SPECIFIED_PROCESS)));
      }
    };
    self.get(name).ok_or_else(|| {
      event!(Level::INFO, "No such process.");
      Envelope::fail(Failure::new(FAIL_CD_NO_SUCH_PROCESS))
    })
  }

  async fn run(process: &Process<Ctx>, param: BoundParam, ctx: ContextData<Ctx>) -> Result<Envelope, ChainError> {
    match process.execute(param, ctx).await {
      Ok(result) => Ok(Envelope::ok(result)),
      Err(ChainError::Failed(failure)) => {
        event!(Level::INFO, fail_code = %failure.code, "Process ended with a typed failure.");
        Ok(Envelope::fail(failure))
      }
      Err(fault) => {
        event!(Level::ERROR, error = %fault, "Process faulted.");
        Err(fault)
      }
    }
  }
}

impl<Ctx: Send + Sync + 'static> Default for ProcessRegistry<Ctx> {
  fn default() -> Self {
    Self::new()
  }
}
