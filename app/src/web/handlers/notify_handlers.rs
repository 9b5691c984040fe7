// ticketing_app/src/web/handlers/notify_handlers.rs

use actix_web::{web, HttpResponse};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::payment::notify::{parse_notification, ACK_BODY};
use crate::state::AppState;

/// `POST /order/wechat_pay_notify_callback`.
///
/// Always acknowledged: the provider would otherwise keep redelivering, and
/// nothing it could resend fixes an internal problem.
#[instrument(name = "handler::wechat_pay_notify", skip_all, fields(bytes = body.len()))]
pub async fn wechat_pay_notify_handler(app_state: web::Data<AppState>, body: web::Bytes) -> HttpResponse {
  match std::str::from_utf8(&body) {
    Ok(text) => settle_from_notification(&app_state, text).await,
    Err(e) => warn!(error = %e, "Payment notification is not UTF-8."),
  }
  HttpResponse::Ok().content_type("text/xml").body(ACK_BODY)
}

async fn settle_from_notification(app_state: &AppState, body: &str) {
  let notice = match parse_notification(body, &app_state.credentials.partner_key) {
    Ok(notice) => notice,
    Err(e) => {
      warn!(error = %e, "Ignoring payment notification.");
      return;
    }
  };

  let Ok(order_id) = Uuid::parse_str(&notice.order_id) else {
    warn!(attach = %notice.order_id, "Payment notification names no order.");
    return;
  };

  match app_state.orders.settle(order_id).await {
    Ok(true) => info!(%order_id, transaction_id = ?notice.transaction_id, "Order paid."),
    Ok(false) => info!(%order_id, "Notification caused no change."),
    Err(e) => error!(%order_id, error = %e, "Settlement from notification failed."),
  }
}
