// tests/config_env_tests.rs
// Process environment is global, so these run one at a time.

use serial_test::serial;
use std::env;
use std::time::Duration;
use ticketing_app::config::AppConfig;
use ticketing_app::payment::SignType;

const VARS: [&str; 6] = [
  "WECHAT_APP_ID",
  "WECHAT_MCH_ID",
  "WECHAT_PARTNER_KEY",
  "WECHAT_PAY_SIGN_TYPE",
  "SESSION_EXPIRATION_SECS",
  "SERVER_PORT",
];

fn clear() {
  for var in VARS {
    env::remove_var(var);
  }
}

#[test]
#[serial]
fn from_env_reads_the_process_environment() {
  clear();
  env::set_var("WECHAT_APP_ID", "wx-env");
  env::set_var("WECHAT_MCH_ID", "1900000109");
  env::set_var("WECHAT_PARTNER_KEY", "env-secret");
  env::set_var("WECHAT_PAY_SIGN_TYPE", "HMAC-SHA256");
  env::set_var("SESSION_EXPIRATION_SECS", "60");
  env::set_var("SERVER_PORT", "9090");

  let config = AppConfig::from_env().unwrap();
  assert_eq!(config.wechat.app_id, "wx-env");
  assert_eq!(config.wechat.sign_type, SignType::HmacSha256);
  assert_eq!(config.session_expiration, Duration::from_secs(60));
  assert_eq!(config.server_port, 9090);
  clear();
}

#[test]
#[serial]
fn from_env_requires_merchant_credentials() {
  clear();
  env::set_var("WECHAT_APP_ID", "wx-env");
  let err = AppConfig::from_env().unwrap_err();
  assert!(err.to_string().contains("WECHAT_MCH_ID"), "got {}", err);
  clear();
}
