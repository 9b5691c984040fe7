// ticketing_app/src/rpc.rs

//! Request context shared by every process of the JSON-RPC endpoint.

use crate::session::{Session, SESS_KEY_CURRENT_USER_ID};
use proc_chain::{Call, ChainError, ProcessRegistry};

/// Per-request state seen by interceptors.
#[derive(Debug)]
pub struct RpcContext {
  pub session: Session,
  /// Address of the client, as reported by the proxy when there is one.
  pub client_ip: String,
  pub referer: Option<String>,
}

impl RpcContext {
  pub fn new(session: Session, client_ip: impl Into<String>) -> Self {
    Self {
      session,
      client_ip: client_ip.into(),
      referer: None,
    }
  }
}

pub type RpcCall = Call<RpcContext>;
pub type RpcRegistry = ProcessRegistry<RpcContext>;

/// Id of the logged-in user, if any. An undecodable session value is a fault.
pub fn current_user_id(call: &RpcCall) -> Result<Option<String>, ChainError> {
  call
    .ctx()
    .read()
    .session
    .get::<String>(SESS_KEY_CURRENT_USER_ID)
    .map_err(|e| ChainError::from(anyhow::Error::new(e)))
}
