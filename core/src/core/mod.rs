pub mod call;
pub mod context_data;
pub mod envelope;
pub mod interceptor;

// Re-export key types for easier access from other modules (and lib.rs)
pub use call::{BoundParam, Call};
pub use context_data::ContextData;
pub use envelope::Envelope;
pub use interceptor::{terminal, Interceptor, Next, SharedInterceptor, Terminal};
