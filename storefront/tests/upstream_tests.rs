// storefront/tests/upstream_tests.rs
//! Drives the real HTTP clients against stand-in upstream servers on loopback.
#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::{test, web, App, HttpRequest, HttpResponse, HttpServer};
use common::*;
use serde_json::{json, Value};
use serial_test::serial;
use std::sync::Arc;
use storefront::config::{PaypalCredentials, PaypalMode};
use storefront::services::{PaymentGateway, PaymentRequest, PaypalGateway};

const FAKE_TOKEN: &str = "tok-123";

async fn fake_token(req: HttpRequest, body: web::Bytes) -> HttpResponse {
  let basic = req
    .headers()
    .get("authorization")
    .and_then(|v| v.to_str().ok())
    .map(|v| v.starts_with("Basic "))
    .unwrap_or(false);
  if !basic || !String::from_utf8_lossy(&body).contains("grant_type=client_credentials") {
    return HttpResponse::BadRequest().finish();
  }
  HttpResponse::Ok().json(json!({"access_token": FAKE_TOKEN, "token_type": "Bearer", "expires_in": 32400}))
}

async fn refuse_token() -> HttpResponse {
  HttpResponse::Unauthorized().json(json!({"error": "invalid_client"}))
}

async fn fake_payment(req: HttpRequest, body: web::Json<Value>) -> HttpResponse {
  let expected = format!("Bearer {}", FAKE_TOKEN);
  if req.headers().get("authorization").and_then(|v| v.to_str().ok()) != Some(expected.as_str()) {
    return HttpResponse::Unauthorized().finish();
  }
  let total = body["transactions"][0]["amount"]["total"].as_str().unwrap_or_default().to_string();
  HttpResponse::Created().json(json!({
    "id": "PAYID-FAKE-1",
    "intent": body["intent"],
    "state": "created",
    "links": [
      {"href": "http://fake/v1/payments/payment/PAYID-FAKE-1", "rel": "self", "method": "GET"},
      {"href": format!("http://fake/approve?total={}", total), "rel": "approval_url", "method": "REDIRECT"}
    ]
  }))
}

async fn fake_upload(path: web::Path<String>, body: web::Bytes) -> HttpResponse {
  let raw = String::from_utf8_lossy(&body);
  if !raw.contains("name=\"upload_preset\"") || !raw.contains("unsigned_products") || !raw.contains("PNGDATA") {
    return HttpResponse::BadRequest().json(json!({"error": {"message": "Upload preset must be specified"}}));
  }
  HttpResponse::Ok().json(json!({
    "public_id": "products/abc123",
    "secure_url": format!("https://res.example.com/{}/image/upload/products/abc123.png", path.into_inner()),
    "resource_type": "image",
    "format": "png",
    "bytes": 7
  }))
}

fn spawn_fake_paypal(accept_credentials: bool) -> String {
  let (listener, addr) = local_listener();
  let server = HttpServer::new(move || {
    let app = App::new().route("/v1/payments/payment", web::post().to(fake_payment));
    if accept_credentials {
      app.route("/v1/oauth2/token", web::post().to(fake_token))
    } else {
      app.route("/v1/oauth2/token", web::post().to(refuse_token))
    }
  })
  .workers(1)
  .listen(listener)
  .unwrap()
  .run();
  actix_web::rt::spawn(server);
  addr
}

fn spawn_fake_image_host() -> String {
  let (listener, addr) = local_listener();
  let server = HttpServer::new(|| App::new().route("/{cloud}/auto/upload", web::post().to(fake_upload)))
    .workers(1)
    .listen(listener)
    .unwrap()
    .run();
  actix_web::rt::spawn(server);
  addr
}

fn credentials() -> PaypalCredentials {
  PaypalCredentials {
    mode: PaypalMode::Sandbox,
    client_id: "client".to_string(),
    client_secret: "secret".to_string(),
  }
}

#[actix_web::test]
#[serial]
async fn test_paypal_gateway_fetches_token_then_creates_payment() {
  setup_tracing();
  let base = spawn_fake_paypal(true);
  let gateway = PaypalGateway::with_api_base(&credentials(), &base);
  let shop = TestShop::new();
  let order = shop.order_body("paypal");
  let items: Vec<storefront::models::OrderLineItem> = serde_json::from_value(order["cartItems"].clone()).unwrap();
  let request = PaymentRequest::for_order(&items, 24.5, "USD", "http://r", "http://c");

  let created = gateway.create_payment(&request).await.unwrap();

  assert_eq!(created.id, "PAYID-FAKE-1");
  assert_eq!(created.approval_url(), Some("http://fake/approve?total=24.50"));
}

#[actix_web::test]
#[serial]
async fn test_order_flow_through_paypal_gateway() {
  let base = spawn_fake_paypal(true);
  let shop = TestShop::build(
    Arc::new(PaypalGateway::with_api_base(&credentials(), &base)),
    test_config(&[]),
  );
  let app = init_shop_app!(shop);

  let req = test::TestRequest::post()
    .uri("/api/shop/order/create")
    .set_json(shop.order_body("paypal"))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let body: Value = test::read_body_json(resp).await;

  assert_eq!(body["approvalURL"], "http://fake/approve?total=24.50");
  assert_eq!(body["paymentStatus"], "pending");
}

#[actix_web::test]
#[serial]
async fn test_rejected_credentials_surface_as_bad_gateway() {
  let base = spawn_fake_paypal(false);
  let shop = TestShop::build(
    Arc::new(PaypalGateway::with_api_base(&credentials(), &base)),
    test_config(&[]),
  );
  let app = init_shop_app!(shop);

  let req = test::TestRequest::post()
    .uri("/api/shop/order/create")
    .set_json(shop.order_body("paypal"))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["message"], "Payment provider error");
  assert_eq!(shop.store.order_count(), 0);
}

#[actix_web::test]
#[serial]
async fn test_image_upload_passes_file_to_host() {
  let base = spawn_fake_image_host();
  let shop = TestShop::build(
    Arc::new(FailingGateway),
    test_config(&[
      ("CLOUDINARY_CLOUD_NAME", "demo"),
      ("CLOUDINARY_UPLOAD_PRESET", "unsigned_products"),
      ("CLOUDINARY_API_BASE", base.as_str()),
    ]),
  );
  let app = init_shop_app!(shop);

  let req = test::TestRequest::post()
    .uri("/api/admin/products/upload-image")
    .insert_header(("X-File-Name", "mug.png"))
    .set_payload("PNGDATA")
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: Value = test::read_body_json(resp).await;

  assert_eq!(body["success"], true);
  assert_eq!(body["result"]["public_id"], "products/abc123");
  assert_eq!(
    body["result"]["secure_url"],
    "https://res.example.com/demo/image/upload/products/abc123.png"
  );
}

#[actix_web::test]
#[serial]
async fn test_image_upload_rejects_empty_and_oversized_bodies() {
  let shop = TestShop::build(
    Arc::new(FailingGateway),
    test_config(&[
      ("CLOUDINARY_CLOUD_NAME", "demo"),
      ("CLOUDINARY_UPLOAD_PRESET", "unsigned_products"),
      ("CLOUDINARY_API_BASE", "http://127.0.0.1:9"),
      ("MAX_UPLOAD_BYTES", "16"),
    ]),
  );
  let app = init_shop_app!(shop);

  let req = test::TestRequest::post().uri("/api/admin/products/upload-image").to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["message"], "No file provided");

  let req = test::TestRequest::post()
    .uri("/api/admin/products/upload-image")
    .set_payload(vec![0u8; 64])
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[actix_web::test]
#[serial]
async fn test_image_upload_without_host_is_misconfigured() {
  let shop = TestShop::new();
  let app = init_shop_app!(shop);

  let req = test::TestRequest::post()
    .uri("/api/admin/products/upload-image")
    .set_payload("PNGDATA")
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body, json!({"success": false, "message": "Service is misconfigured"}));
}
