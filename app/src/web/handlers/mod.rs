// ticketing_app/src/web/handlers/mod.rs

pub mod notify_handlers;
pub mod rpc_handlers;
