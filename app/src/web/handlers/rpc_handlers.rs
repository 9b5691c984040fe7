// ticketing_app/src/web/handlers/rpc_handlers.rs

use actix_web::cookie::Cookie;
use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use proc_chain::ContextData;
use serde::Deserialize;
use std::net::SocketAddr;
use tracing::{debug, instrument};

use crate::errors::AppError;
use crate::rpc::RpcContext;
use crate::session::Session;
use crate::state::AppState;

#[derive(Deserialize, Debug)]
pub struct RpcQuery {
  pub process: Option<String>,
}

/// `POST /rest_json_rpc?process=<name>`.
///
/// Answers 200 with the envelope for both outcomes of a process. A body that
/// is not JSON or does not fit the process parameters is a 400, a fault is a
/// 500. The process name is checked before the body is parsed. The session is
/// written back in every case, and a new session's cookie goes out with every
/// response.
#[instrument(
    name = "handler::rest_json_rpc",
    skip(app_state, req, query, body),
    fields(process = query.process.as_deref().unwrap_or(""))
)]
pub async fn rest_json_rpc_handler(
  app_state: web::Data<AppState>,
  req: HttpRequest,
  query: web::Query<RpcQuery>,
  body: web::Bytes,
) -> Result<HttpResponse, AppError> {
  let cookie_name = &app_state.config.session_cookie_name;
  let session_id = req.cookie(cookie_name).map(|c| c.value().to_string());
  let session = Session::load(app_state.sessions.as_ref(), session_id.as_deref()).await?;

  let ctx = ContextData::new(RpcContext {
    session,
    client_ip: client_ip(&req),
    referer: req
      .headers()
      .get(header::REFERER)
      .and_then(|v| v.to_str().ok())
      .map(str::to_string),
  });

  let outcome = app_state
    .registry
    .dispatch_bytes(query.process.as_deref(), &body, ctx.clone())
    .await;

  let session = ctx.read().session.clone();
  session.save(app_state.sessions.as_ref()).await?;

  let mut response = match outcome {
    Ok(envelope) => {
      debug!(status_code = envelope.status_code(), "Process dispatched.");
      HttpResponse::Ok().json(envelope)
    }
    Err(e) => AppError::from(e).error_response(),
  };
  if session.is_new() {
    let cookie = Cookie::build(cookie_name.clone(), session.id().to_string())
      .path("/")
      .http_only(true)
      .finish();
    response
      .add_cookie(&cookie)
      .map_err(|e| AppError::Internal(format!("Could not set session cookie: {}", e)))?;
  }
  Ok(response)
}

/// Client address without port; honours `Forwarded`/`X-Forwarded-For`.
fn client_ip(req: &HttpRequest) -> String {
  let info = req.connection_info();
  let raw = info.realip_remote_addr().unwrap_or_default();
  raw
    .parse::<SocketAddr>()
    .map(|addr| addr.ip().to_string())
    .unwrap_or_else(|_| raw.to_string())
}
