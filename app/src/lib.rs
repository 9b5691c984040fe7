// ticketing_app/src/lib.rs

//! Ticket sales backend: orders, WeChat-style payments and the JSON-RPC surface
//! built on `proc_chain`.

pub mod config;
pub mod errors;
pub mod guards;
pub mod models;
pub mod orders;
pub mod payment;
pub mod processes;
pub mod rpc;
pub mod session;
pub mod state;
pub mod store;
pub mod web;

pub use config::AppConfig;
pub use errors::AppError;
pub use state::AppState;
