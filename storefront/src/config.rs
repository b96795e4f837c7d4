// storefront/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
  Postgres,
  Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayKind {
  Paypal,
  Mock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaypalMode {
  Sandbox,
  Live,
}

impl PaypalMode {
  pub fn api_base(&self) -> &'static str {
    match self {
      PaypalMode::Sandbox => "https://api-m.sandbox.paypal.com",
      PaypalMode::Live => "https://api-m.paypal.com",
    }
  }
}

/// Output format of the log subscriber, from `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
  #[default]
  Text,
  Json,
}

impl LogFormat {
  /// Read before the subscriber exists, so problems cannot be logged; unknown values fall back to text.
  pub fn from_env() -> Self {
    dotenv().ok();
    env::var("LOG_FORMAT").map(|v| Self::parse(&v)).unwrap_or_default()
  }

  pub fn parse(value: &str) -> Self {
    match value.trim().to_lowercase().as_str() {
      "json" => LogFormat::Json,
      _ => LogFormat::Text,
    }
  }
}

#[derive(Debug, Clone)]
pub struct PaypalCredentials {
  pub mode: PaypalMode,
  pub client_id: String,
  pub client_secret: String,
}

#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
  pub api_base: String,
  pub cloud_name: String,
  pub upload_preset: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,

  pub store_backend: StoreBackend,
  pub database_url: Option<String>,
  pub run_migrations: bool,

  pub payment_gateway: GatewayKind,
  // Only present when payment_gateway is Paypal.
  pub paypal: Option<PaypalCredentials>,
  pub payment_return_url: String,
  pub payment_cancel_url: String,
  pub payment_currency: String,

  // Image uploads are refused with a configuration error when this is None.
  pub cloudinary: Option<CloudinaryConfig>,
  pub max_upload_bytes: usize,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the config from any variable source. `from_env` passes the process environment.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let get_env = |var_name: &str| {
      lookup(var_name)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::Config(format!("Missing environment variable '{}'", var_name)))
    };
    let get_or = |var_name: &str, default: &str| get_env(var_name).unwrap_or_else(|_| default.to_string());

    let server_host = get_or("SERVER_HOST", "127.0.0.1");
    let server_port = get_or("SERVER_PORT", "8080")
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;

    let store_backend = match get_or("STORE_BACKEND", "postgres").to_lowercase().as_str() {
      "postgres" => StoreBackend::Postgres,
      "memory" => StoreBackend::Memory,
      other => return Err(AppError::Config(format!("Invalid STORE_BACKEND: '{}'", other))),
    };
    let database_url = match store_backend {
      StoreBackend::Postgres => Some(get_env("DATABASE_URL")?),
      StoreBackend::Memory => get_env("DATABASE_URL").ok(),
    };
    let run_migrations = get_or("RUN_MIGRATIONS", "false")
      .parse::<bool>()
      .map_err(|e| AppError::Config(format!("Invalid RUN_MIGRATIONS value: {}", e)))?;

    let payment_gateway = match get_or("PAYMENT_GATEWAY", "mock").to_lowercase().as_str() {
      "paypal" => GatewayKind::Paypal,
      "mock" => GatewayKind::Mock,
      other => return Err(AppError::Config(format!("Invalid PAYMENT_GATEWAY: '{}'", other))),
    };
    let paypal = match payment_gateway {
      GatewayKind::Mock => None,
      GatewayKind::Paypal => {
        let mode = match get_or("PAYPAL_MODE", "sandbox").to_lowercase().as_str() {
          "sandbox" => PaypalMode::Sandbox,
          "live" => PaypalMode::Live,
          other => return Err(AppError::Config(format!("Invalid PAYPAL_MODE: '{}'", other))),
        };
        Some(PaypalCredentials {
          mode,
          client_id: get_env("PAYPAL_CLIENT_ID")?,
          client_secret: get_env("PAYPAL_CLIENT_SECRET")?,
        })
      }
    };
    let payment_return_url = get_or("PAYMENT_RETURN_URL", "http://localhost:5173/shop/paypal-return");
    let payment_cancel_url = get_or("PAYMENT_CANCEL_URL", "http://localhost:5173/shop/paypal-cancel");
    let payment_currency = get_or("PAYMENT_CURRENCY", "USD").to_uppercase();

    let cloudinary = match (get_env("CLOUDINARY_CLOUD_NAME"), get_env("CLOUDINARY_UPLOAD_PRESET")) {
      (Ok(cloud_name), Ok(upload_preset)) => Some(CloudinaryConfig {
        api_base: get_or("CLOUDINARY_API_BASE", "https://api.cloudinary.com/v1_1"),
        cloud_name,
        upload_preset,
      }),
      (Err(_), Err(_)) => None,
      _ => {
        return Err(AppError::Config(
          "CLOUDINARY_CLOUD_NAME and CLOUDINARY_UPLOAD_PRESET must be set together".to_string(),
        ))
      }
    };
    let max_upload_bytes = get_or("MAX_UPLOAD_BYTES", "10485760")
      .parse::<usize>()
      .map_err(|e| AppError::Config(format!("Invalid MAX_UPLOAD_BYTES: {}", e)))?;

    tracing::info!("Application configuration loaded successfully.");
    // Secrets (database url, PayPal secret) are never logged.
    tracing::debug!(
      ?store_backend,
      ?payment_gateway,
      uploads_enabled = cloudinary.is_some(),
      "Loaded config summary"
    );

    Ok(Self {
      server_host,
      server_port,
      store_backend,
      database_url,
      run_migrations,
      payment_gateway,
      paypal,
      payment_return_url,
      payment_cancel_url,
      payment_currency,
      cloudinary,
      max_upload_bytes,
    })
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  #[test]
  fn log_format_parsing() {
    assert_eq!(LogFormat::parse("json"), LogFormat::Json);
    assert_eq!(LogFormat::parse(" JSON "), LogFormat::Json);
    assert_eq!(LogFormat::parse("text"), LogFormat::Text);
    assert_eq!(LogFormat::parse("pretty"), LogFormat::Text);
  }

  fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig> {
    let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    AppConfig::from_lookup(|name| vars.get(name).cloned())
  }

  #[test]
  fn memory_backend_needs_no_database_url() {
    let cfg = config_from(&[("STORE_BACKEND", "memory")]).unwrap();
    assert_eq!(cfg.store_backend, StoreBackend::Memory);
    assert_eq!(cfg.payment_gateway, GatewayKind::Mock);
    assert_eq!(cfg.bind_address(), "127.0.0.1:8080");
    assert_eq!(cfg.payment_currency, "USD");
    assert!(cfg.cloudinary.is_none());
  }

  #[test]
  fn postgres_backend_requires_database_url() {
    let err = config_from(&[]).unwrap_err();
    assert!(matches!(err, AppError::Config(m) if m.contains("DATABASE_URL")));
  }

  #[test]
  fn paypal_gateway_requires_credentials() {
    let err = config_from(&[("STORE_BACKEND", "memory"), ("PAYMENT_GATEWAY", "paypal")]).unwrap_err();
    assert!(matches!(err, AppError::Config(m) if m.contains("PAYPAL_CLIENT_ID")));

    let cfg = config_from(&[
      ("STORE_BACKEND", "memory"),
      ("PAYMENT_GATEWAY", "PayPal"),
      ("PAYPAL_MODE", "live"),
      ("PAYPAL_CLIENT_ID", "id"),
      ("PAYPAL_CLIENT_SECRET", "secret"),
    ])
    .unwrap();
    let paypal = cfg.paypal.unwrap();
    assert_eq!(paypal.mode, PaypalMode::Live);
    assert_eq!(paypal.mode.api_base(), "https://api-m.paypal.com");
  }

  #[test]
  fn cloudinary_settings_come_as_a_pair() {
    let err = config_from(&[("STORE_BACKEND", "memory"), ("CLOUDINARY_CLOUD_NAME", "demo")]).unwrap_err();
    assert!(matches!(err, AppError::Config(_)));

    let cfg = config_from(&[
      ("STORE_BACKEND", "memory"),
      ("CLOUDINARY_CLOUD_NAME", "demo"),
      ("CLOUDINARY_UPLOAD_PRESET", "products"),
    ])
    .unwrap();
    let cloudinary = cfg.cloudinary.unwrap();
    assert_eq!(cloudinary.api_base, "https://api.cloudinary.com/v1_1");
    assert_eq!(cloudinary.upload_preset, "products");
  }

  #[test]
  fn rejects_bad_numbers_and_flags() {
    assert!(config_from(&[("STORE_BACKEND", "memory"), ("SERVER_PORT", "eighty")]).is_err());
    assert!(config_from(&[("STORE_BACKEND", "memory"), ("RUN_MIGRATIONS", "yes")]).is_err());
    assert!(config_from(&[("STORE_BACKEND", "sqlite")]).is_err());
  }
}
