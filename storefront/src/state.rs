// storefront/src/state.rs

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::pipelines;
use crate::services::{CloudinaryUploader, PaymentGateway};
use crate::store::OrderStore;
use std::sync::Arc;

/// Shared by every request and handed to pipeline contexts.
#[derive(Clone)]
pub struct AppState {
  pub store: Arc<dyn OrderStore>,
  pub gateway: Arc<dyn PaymentGateway>,
  /// `None` when no image host is configured.
  pub uploader: Option<Arc<CloudinaryUploader>>,
  pub flows: Arc<flowline::Registry<AppError>>,
  pub config: Arc<AppConfig>,
}

impl AppState {
  /// Wires the collaborators together and registers the order pipelines.
  pub fn new(
    store: Arc<dyn OrderStore>,
    gateway: Arc<dyn PaymentGateway>,
    uploader: Option<Arc<CloudinaryUploader>>,
    config: Arc<AppConfig>,
  ) -> Self {
    let flows = Arc::new(flowline::Registry::<AppError>::new());
    pipelines::register_all_pipelines(&flows);
    AppState {
      store,
      gateway,
      uploader,
      flows,
      config,
    }
  }
}
