// storefront/src/services/image_upload.rs

use crate::config::CloudinaryConfig;
use crate::errors::{AppError, Result as AppResult};
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

pub const DEFAULT_FILE_NAME: &str = "upload";

/// What the image host reports for a stored asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedImage {
  pub public_id: String,
  pub secure_url: String,
  #[serde(default)]
  pub url: Option<String>,
  #[serde(default)]
  pub resource_type: Option<String>,
  #[serde(default)]
  pub format: Option<String>,
  #[serde(default)]
  pub bytes: Option<u64>,
}

/// Unsigned uploads against a preset; the host detects the resource type.
#[derive(Clone)]
pub struct CloudinaryUploader {
  http: reqwest::Client,
  upload_url: String,
  upload_preset: String,
}

impl CloudinaryUploader {
  pub fn new(config: &CloudinaryConfig) -> Self {
    Self {
      http: reqwest::Client::new(),
      upload_url: format!("{}/{}/auto/upload", config.api_base.trim_end_matches('/'), config.cloud_name),
      upload_preset: config.upload_preset.clone(),
    }
  }

  pub fn upload_url(&self) -> &str {
    &self.upload_url
  }

  #[instrument(name = "image_host::upload", skip(self, data), fields(size = data.len()))]
  pub async fn upload(&self, data: Vec<u8>, file_name: &str) -> AppResult<UploadedImage> {
    if data.is_empty() {
      return Err(AppError::Validation("No file provided".to_string()));
    }

    let form = Form::new()
      .part("file", Part::bytes(data).file_name(file_name.to_string()))
      .text("upload_preset", self.upload_preset.clone());

    let response = self
      .http
      .post(&self.upload_url)
      .multipart(form)
      .send()
      .await
      .map_err(|e| AppError::ImageHost(format!("upload request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      error!(%status, "Image host rejected the upload.");
      return Err(AppError::ImageHost(format!("upload returned {}: {}", status, body)));
    }

    let uploaded: UploadedImage = response
      .json()
      .await
      .map_err(|e| AppError::ImageHost(format!("unreadable upload response: {}", e)))?;
    info!(public_id = %uploaded.public_id, "Image uploaded.");
    Ok(uploaded)
  }
}
