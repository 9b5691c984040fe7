// ticketing_app/src/config.rs

use crate::errors::{AppError, Result};
use crate::payment::{MerchantCredentials, SignType};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct WechatConfig {
  pub app_id: String,
  pub mch_id: String,
  pub partner_key: String,
  pub sign_type: SignType,
  /// Base URL of the payment API, without trailing slash.
  pub pay_base_url: String,
  /// Absolute URL of our notification endpoint, handed to the provider.
  pub pay_notify_url: String,
  /// Prefix of the payment description.
  pub pay_body_title: String,
  /// Where WeChat sends the visitor after web authorization.
  pub auth_redirect_uri: String,
}

impl WechatConfig {
  pub fn credentials(&self) -> MerchantCredentials {
    MerchantCredentials {
      app_id: self.app_id.clone(),
      mch_id: self.mch_id.clone(),
      partner_key: self.partner_key.clone(),
      sign_type: self.sign_type,
    }
  }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  /// Orders are kept in memory when unset.
  pub database_url: Option<String>,
  pub wechat: WechatConfig,
  pub session_cookie_name: String,
  pub session_expiration: Duration,
  pub gateway_timeout: Duration,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the configuration from any variable source.
  pub fn from_lookup<F>(lookup: F) -> Result<Self>
  where
    F: Fn(&str) -> Option<String>,
  {
    let get = |name: &str| lookup(name).filter(|v| !v.is_empty());
    let require = |name: &str| get(name).ok_or_else(|| AppError::Config(format!("Missing environment variable '{}'", name)));
    let parse_u64 = |name: &str, default: u64| -> Result<u64> {
      match get(name) {
        Some(v) => v
          .parse::<u64>()
          .map_err(|e| AppError::Config(format!("Invalid {}: {}", name, e))),
        None => Ok(default),
      }
    };

    let server_host = get("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
    let server_port = get("SERVER_PORT")
      .unwrap_or_else(|| "8080".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;

    let sign_type = match get("WECHAT_PAY_SIGN_TYPE") {
      Some(s) => SignType::parse(&s).ok_or_else(|| AppError::Config(format!("Invalid WECHAT_PAY_SIGN_TYPE: {}", s)))?,
      None => SignType::Md5,
    };

    let wechat = WechatConfig {
      app_id: require("WECHAT_APP_ID")?,
      mch_id: require("WECHAT_MCH_ID")?,
      partner_key: require("WECHAT_PARTNER_KEY")?,
      sign_type,
      pay_base_url: get("WECHAT_PAY_BASE_URL").unwrap_or_else(|| "https://api.mch.weixin.qq.com".to_string()),
      pay_notify_url: get("WECHAT_PAY_NOTIFY_URL")
        .unwrap_or_else(|| format!("http://{}:{}/order/wechat_pay_notify_callback", server_host, server_port)),
      pay_body_title: get("WECHAT_PAY_BODY_TITLE").unwrap_or_else(|| "Ticketing".to_string()),
      auth_redirect_uri: get("WECHAT_AUTH_REDIRECT_URI")
        .unwrap_or_else(|| format!("http://{}:{}/user/wechat_auth", server_host, server_port)),
    };

    let config = Self {
      database_url: get("DATABASE_URL"),
      session_cookie_name: get("SESSION_COOKIE_NAME").unwrap_or_else(|| "ticketing.sid".to_string()),
      session_expiration: Duration::from_secs(parse_u64("SESSION_EXPIRATION_SECS", 7 * 24 * 3600)?),
      gateway_timeout: Duration::from_secs(parse_u64("GATEWAY_TIMEOUT_SECS", 10)?),
      server_host,
      server_port,
      wechat,
    };

    // Secrets stay out of the log.
    tracing::info!(
      host = %config.server_host,
      port = config.server_port,
      database = config.database_url.is_some(),
      "Application configuration loaded successfully."
    );
    Ok(config)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |name: &str| map.get(name).cloned()
  }

  const REQUIRED: [(&str, &str); 3] = [
    ("WECHAT_APP_ID", "wx-app"),
    ("WECHAT_MCH_ID", "1900000109"),
    ("WECHAT_PARTNER_KEY", "secret"),
  ];

  #[test]
  fn defaults_apply_when_only_required_vars_are_set() {
    let config = AppConfig::from_lookup(lookup(&REQUIRED)).unwrap();
    assert_eq!(config.server_port, 8080);
    assert_eq!(config.database_url, None);
    assert_eq!(config.session_cookie_name, "ticketing.sid");
    assert_eq!(config.gateway_timeout, Duration::from_secs(10));
    assert_eq!(config.wechat.sign_type, SignType::Md5);
    assert_eq!(
      config.wechat.pay_notify_url,
      "http://127.0.0.1:8080/order/wechat_pay_notify_callback"
    );
  }

  #[test]
  fn missing_partner_key_is_a_config_error() {
    let err = AppConfig::from_lookup(lookup(&REQUIRED[..2])).unwrap_err();
    assert!(matches!(err, AppError::Config(m) if m.contains("WECHAT_PARTNER_KEY")));
  }

  #[test]
  fn invalid_numbers_are_rejected() {
    let mut pairs = REQUIRED.to_vec();
    pairs.push(("SERVER_PORT", "eighty"));
    assert!(AppConfig::from_lookup(lookup(&pairs)).is_err());

    let mut pairs = REQUIRED.to_vec();
    pairs.push(("SESSION_EXPIRATION_SECS", "-1"));
    assert!(AppConfig::from_lookup(lookup(&pairs)).is_err());
  }
}
