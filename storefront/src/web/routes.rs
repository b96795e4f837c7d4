// storefront/src/web/routes.rs

use actix_web::{error, web, HttpRequest, HttpResponse};

use crate::errors::AppError;
use crate::web::handlers::{order_handlers, upload_handlers};

async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

fn json_error_handler(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
  AppError::Validation(format!("Invalid request body: {}", err)).into()
}

fn path_error_handler(err: error::PathError, _req: &HttpRequest) -> actix_web::Error {
  AppError::Validation(format!("Invalid path parameter: {}", err)).into()
}

/// Mounts every route. `max_upload_bytes` caps the raw image upload body.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig, max_upload_bytes: usize) {
  cfg
    .app_data(web::JsonConfig::default().error_handler(json_error_handler))
    .app_data(web::PathConfig::default().error_handler(path_error_handler))
    .service(
      web::scope("/api")
        .route("/health", web::get().to(health_check_handler))
        .service(
          web::scope("/shop/order")
            .route("/create", web::post().to(order_handlers::create_order_handler))
            .route("/capture", web::post().to(order_handlers::capture_payment_handler))
            .route("/list/{user_id}", web::get().to(order_handlers::list_orders_handler))
            .route("/details/{id}", web::get().to(order_handlers::order_details_handler)),
        )
        .service(
          web::scope("/admin/products")
            .app_data(web::PayloadConfig::new(max_upload_bytes))
            .route("/upload-image", web::post().to(upload_handlers::upload_image_handler)),
        ),
    );
}
