// storefront/src/web/handlers/upload_handlers.rs

use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::services::image_upload::DEFAULT_FILE_NAME;
use crate::state::AppState;

pub const FILE_NAME_HEADER: &str = "x-file-name";

/// Forwards the raw request body to the image host.
#[instrument(name = "handler::upload_image", skip(app_state, req, body), fields(size = body.len()))]
pub async fn upload_image_handler(
  app_state: web::Data<AppState>,
  req: HttpRequest,
  body: web::Bytes,
) -> Result<HttpResponse, AppError> {
  let uploader = app_state.uploader.as_ref().ok_or_else(|| {
    AppError::Config("CLOUDINARY_CLOUD_NAME and CLOUDINARY_UPLOAD_PRESET are not set".to_string())
  })?;

  if body.is_empty() {
    return Err(AppError::Validation("No file provided".to_string()));
  }

  let file_name = req
    .headers()
    .get(FILE_NAME_HEADER)
    .and_then(|value| value.to_str().ok())
    .filter(|name| !name.trim().is_empty())
    .unwrap_or(DEFAULT_FILE_NAME)
    .to_string();
  info!(%file_name, "Uploading image.");

  let result = uploader.upload(body.to_vec(), &file_name).await?;
  Ok(HttpResponse::Ok().json(json!({ "success": true, "result": result })))
}
