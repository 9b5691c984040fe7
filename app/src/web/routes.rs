// ticketing_app/src/web/routes.rs

use actix_web::web;

use crate::web::handlers::{notify_handlers, rpc_handlers};

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .route("/health", web::get().to(health_check_handler))
    .route("/rest_json_rpc", web::post().to(rpc_handlers::rest_json_rpc_handler))
    .route(
      "/order/wechat_pay_notify_callback",
      web::post().to(notify_handlers::wechat_pay_notify_handler),
    );
}
