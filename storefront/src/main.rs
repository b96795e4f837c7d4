// storefront/src/main.rs

use storefront::config::{AppConfig, GatewayKind, LogFormat, StoreBackend};
use storefront::errors::{AppError, Result as AppResult};
use storefront::services::{CloudinaryUploader, MockPaymentGateway, PaymentGateway, PaypalGateway};
use storefront::state::AppState;
use storefront::store::{MemoryOrderStore, OrderStore, PgOrderStore};
use storefront::web::configure_app_routes;

use actix_web::{web as actix_data, App, HttpServer};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

async fn build_store(config: &AppConfig) -> AppResult<Arc<dyn OrderStore>> {
  match config.store_backend {
    StoreBackend::Memory => {
      tracing::warn!("Using the in-memory order store; data is lost on restart.");
      Ok(Arc::new(MemoryOrderStore::new()))
    }
    StoreBackend::Postgres => {
      let database_url = config
        .database_url
        .as_deref()
        .ok_or_else(|| AppError::Config("DATABASE_URL must be set for the postgres store".to_string()))?;
      let pool = PgPool::connect(database_url).await?;
      tracing::info!("Successfully connected to the database.");
      let store = PgOrderStore::new(pool);
      if config.run_migrations {
        store.migrate().await?;
      }
      Ok(Arc::new(store))
    }
  }
}

fn build_gateway(config: &AppConfig) -> AppResult<Arc<dyn PaymentGateway>> {
  match config.payment_gateway {
    GatewayKind::Mock => {
      tracing::warn!("Using the mock payment gateway.");
      Ok(Arc::new(MockPaymentGateway::new()))
    }
    GatewayKind::Paypal => {
      let credentials = config
        .paypal
        .as_ref()
        .ok_or_else(|| AppError::Config("PayPal credentials are missing".to_string()))?;
      tracing::info!(mode = ?credentials.mode, "Using the PayPal payment gateway.");
      Ok(Arc::new(PaypalGateway::new(credentials)))
    }
  }
}

async fn build_state(config: Arc<AppConfig>) -> AppResult<AppState> {
  let store = build_store(&config).await?;
  let gateway = build_gateway(&config)?;
  let uploader = config.cloudinary.as_ref().map(|c| Arc::new(CloudinaryUploader::new(c)));
  if uploader.is_none() {
    tracing::warn!("Image host not configured; uploads will be refused.");
  }
  Ok(AppState::new(store, gateway, uploader, config))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  let subscriber = tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_span_events(FmtSpan::CLOSE);
  match LogFormat::from_env() {
    LogFormat::Json => subscriber.json().init(),
    LogFormat::Text => subscriber.init(),
  }

  tracing::info!("Starting storefront server...");

  let app_config = match AppConfig::from_env() {
    Ok(cfg) => Arc::new(cfg),
    Err(e) => {
      tracing::error!(error = %e, "Failed to load application configuration.");
      return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
    }
  };

  let app_state = match build_state(app_config.clone()).await {
    Ok(state) => state,
    Err(e) => {
      tracing::error!(error = %e, "Failed to initialise application state.");
      return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
    }
  };

  let server_address = app_config.bind_address();
  let max_upload_bytes = app_config.max_upload_bytes;
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(|cfg| configure_app_routes(cfg, max_upload_bytes))
  })
  .bind(&server_address)?
  .run()
  .await
}
