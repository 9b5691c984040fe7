// ticketing_app/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

use ticketing_app::config::AppConfig;
use ticketing_app::orders::{settlement_fn, SettlementRegistry};
use ticketing_app::payment::{PaymentGateway, WechatPayClient};
use ticketing_app::session::{MemorySessionStore, SessionStore};
use ticketing_app::state::AppState;
use ticketing_app::store::{MemoryOrderStore, OrderStore, PgOrderStore};
use ticketing_app::web::configure_app_routes;

/// Sellable type of competition tickets.
const SELLABLE_TYPE_TICKET: &str = "TICKET";

fn startup_error(context: &str, e: impl std::fmt::Display) -> std::io::Error {
  tracing::error!(error = %e, "{}", context);
  std::io::Error::other(format!("{}: {}", context, e))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()) // Allow RUST_LOG override
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting ticketing server...");

  let app_config = Arc::new(AppConfig::from_env().map_err(|e| startup_error("Failed to load application configuration", e))?);

  let order_store: Arc<dyn OrderStore> = match &app_config.database_url {
    Some(url) => {
      let pool = PgPool::connect(url)
        .await
        .map_err(|e| startup_error("Failed to connect to the database", e))?;
      tracing::info!("Successfully connected to the database.");
      let store = PgOrderStore::new(pool);
      store
        .ensure_schema()
        .await
        .map_err(|e| startup_error("Failed to prepare the order schema", e))?;
      Arc::new(store)
    }
    None => {
      tracing::warn!("DATABASE_URL not set; orders are kept in memory.");
      Arc::new(MemoryOrderStore::new())
    }
  };

  let credentials = Arc::new(app_config.wechat.credentials());
  let gateway: Arc<dyn PaymentGateway> = Arc::new(
    WechatPayClient::new(credentials, &app_config.wechat.pay_base_url, app_config.gateway_timeout)
      .map_err(|e| startup_error("Failed to build the payment client", e))?,
  );

  let sessions = Arc::new(MemorySessionStore::new(app_config.session_expiration));
  let purge_target = sessions.clone();
  let purge_every = app_config.session_expiration.max(std::time::Duration::from_secs(1));
  tokio::spawn(async move {
    let mut interval = tokio::time::interval(purge_every);
    loop {
      interval.tick().await;
      let purged = purge_target.purge_expired();
      if purged > 0 {
        tracing::debug!(purged, "Expired sessions purged.");
      }
    }
  });

  // Ticket issuance lives with competitions; orders only report the payment.
  let settlements = Arc::new(SettlementRegistry::new());
  settlements.register(
    SELLABLE_TYPE_TICKET,
    settlement_fn(|order_id, item_id| async move {
      tracing::info!(%order_id, %item_id, "Ticket paid.");
      Ok(())
    }),
  );

  let session_store: Arc<dyn SessionStore> = sessions;
  let app_state = AppState::new(app_config.clone(), order_store, gateway, session_store, settlements);

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
