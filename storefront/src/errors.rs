// storefront/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use flowline::FlowError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Conflict: {0}")]
  Conflict(String),

  #[error("Payment Gateway Error: {0}")]
  PaymentGateway(String),

  #[error("Image Host Error: {0}")]
  ImageHost(String),

  #[error("Database Error: {0}")]
  Persistence(#[from] sqlx::Error),

  #[error("Migration Error: {0}")]
  Migration(#[from] sqlx::migrate::MigrateError),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from]
    source: FlowError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl AppError {
  /// The message sent to the caller. Server-side failures never echo their detail.
  pub fn public_message(&self) -> String {
    match self {
      AppError::Validation(m) | AppError::NotFound(m) | AppError::Conflict(m) => m.clone(),
      AppError::PaymentGateway(_) => "Payment provider error".to_string(),
      AppError::ImageHost(_) => "Image hosting error".to_string(),
      AppError::Persistence(_) | AppError::Migration(_) => "A database error occurred".to_string(),
      AppError::Config(_) => "Service is misconfigured".to_string(),
      AppError::Workflow { .. } | AppError::Internal(_) => "Some error occurred!".to_string(),
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Conflict(_) => StatusCode::CONFLICT,
      AppError::PaymentGateway(_) | AppError::ImageHost(_) => StatusCode::BAD_GATEWAY,
      AppError::Persistence(_)
      | AppError::Migration(_)
      | AppError::Config(_)
      | AppError::Workflow { .. }
      | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    // Log the full error when it's turned into a response
    if status.is_server_error() {
      tracing::error!(application_error = %self, status = status.as_u16(), "Responding with error");
    } else {
      tracing::warn!(application_error = %self, status = status.as_u16(), "Responding with error");
    }
    HttpResponse::build(status).json(json!({
      "success": false,
      "message": self.public_message(),
    }))
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
