// storefront/src/pipelines/mod.rs

//! Order workflows, expressed as flowline pipelines.

use crate::errors::AppError;
use flowline::Registry;
use std::sync::Arc;

pub mod contexts;

pub mod capture_payment_pipeline;
pub mod create_order_pipeline;

/// Registers every order pipeline. Called once while building `AppState`.
pub fn register_all_pipelines(registry: &Arc<Registry<AppError>>) {
  tracing::info!("Registering order pipelines...");

  create_order_pipeline::register_create_order_pipeline(registry);
  capture_payment_pipeline::register_capture_payment_pipeline(registry);

  tracing::info!("Order pipelines registered.");
}
