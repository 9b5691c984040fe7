// src/lib.rs

//! proc_chain: a named-process RPC dispatcher built from ordered interceptor chains.
//!
//! A process is:
//!  - an ordered list of interceptors (authorization checks, ownership checks,
//!    then the business handler), each free to continue via `Next` or to stop;
//!  - a parameter type the request body is bound into before the chain runs.
//!
//! Every dispatch ends in one of three ways: an `OK` envelope, a `FAIL`
//! envelope carrying a typed failure code, or an `Err` (binding error or fault)
//! that the transport layer reports as a generic error.

pub mod core;
pub mod error;
pub mod process;
pub mod registry;

// --- Re-exports for the Public API ---

pub use crate::core::call::{BoundParam, Call};
pub use crate::core::context_data::ContextData;
pub use crate::core::envelope::{Envelope, STATUS_FAIL, STATUS_OK};
pub use crate::core::interceptor::{terminal, Interceptor, Next, SharedInterceptor};

pub use crate::process::Process;

pub use crate::error::{ChainError, ChainResult, Failure};

pub use crate::registry::{ProcessRegistry, FAIL_CD_NOT_SPECIFIED_PROCESS, FAIL_CD_NO_SUCH_PROCESS};

// Interceptors are implemented with #[async_trait]; re-exported so dependants
// need not pin their own version.
pub use async_trait::async_trait;

/*
    Typical wiring:
    1. Define the per-request context `Ctx` (session, client address, ...).
    2. Implement `Interceptor<Ctx>` for cross-cutting checks; call `next.run(call)`
       to continue or return early to short-circuit.
    3. Write the business handler with `terminal(|call| async move { ... })`.
    4. `registry.register::<Param>("module.process", vec![check, handler])` at startup.
    5. Per request: `registry.dispatch(Some(name), body, ContextData::new(ctx)).await`.
*/
