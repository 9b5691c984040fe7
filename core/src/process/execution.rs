// proc_chain/src/process/execution.rs

//! Contains `Process::execute()`, which walks the interceptor chain.

use crate::core::call::{BoundParam, Call};
use crate::core::context_data::ContextData;
use crate::core::interceptor::Next;
use crate::error::ChainResult;
use crate::process::definition::Process;
use tracing::{event, instrument, Level};

impl<Ctx: Send + Sync + 'static> Process<Ctx> {
  /// Runs the chain from the first interceptor with an already-bound parameter.
  ///
  /// Within one call the interceptors run strictly in registration order; each
  /// one decides whether the rest of the chain runs at all.
  #[instrument(
        name = "Process::execute",
        skip_all,
        fields(
            process = %self.name,
            num_interceptors = self.interceptors.len(),
        ),
        err(Display)
    )]
  pub async fn execute(&self, param: BoundParam, ctx: ContextData<Ctx>) -> ChainResult {
    event!(Level::DEBUG, "Process execution starting.");
    let call = Call::new(self.name.clone(), param, ctx);
    let result = Next::new(&self.interceptors).run(call).await;
    event!(Level::DEBUG, ok = result.is_ok(), "Process execution finished.");
    result
  }
}
