// proc_chain/src/process/mod.rs

//! Defines the `Process<Ctx>` struct, its construction and execution logic.

pub mod definition;
pub mod execution;

pub use definition::{ParamBinder, Process};
