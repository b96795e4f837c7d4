// storefront/tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::TcpListener;
use std::sync::Arc;
use storefront::config::AppConfig;
use storefront::errors::{AppError, Result as AppResult};
use storefront::models::{Cart, Product};
use storefront::services::{CloudinaryUploader, CreatedPayment, MockPaymentGateway, PaymentGateway, PaymentRequest};
use storefront::state::AppState;
use storefront::store::MemoryOrderStore;
use tracing::Level;
use uuid::Uuid;

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

/// Always refuses, like a provider rejecting bad credentials.
pub struct FailingGateway;

#[async_trait]
impl PaymentGateway for FailingGateway {
  async fn create_payment(&self, _request: &PaymentRequest) -> AppResult<CreatedPayment> {
    Err(AppError::PaymentGateway("401 invalid_client".to_string()))
  }
}

/// Succeeds but leaves out the approval link.
pub struct NoApprovalLinkGateway;

#[async_trait]
impl PaymentGateway for NoApprovalLinkGateway {
  async fn create_payment(&self, _request: &PaymentRequest) -> AppResult<CreatedPayment> {
    Ok(CreatedPayment {
      id: "PAYID-NOLINK".to_string(),
      links: vec![],
    })
  }
}

pub fn test_config(extra: &[(&str, &str)]) -> AppConfig {
  let mut vars: HashMap<String, String> = HashMap::new();
  vars.insert("STORE_BACKEND".to_string(), "memory".to_string());
  vars.insert("PAYMENT_RETURN_URL".to_string(), "http://shop.test/return".to_string());
  vars.insert("PAYMENT_CANCEL_URL".to_string(), "http://shop.test/cancel".to_string());
  for (k, v) in extra {
    vars.insert(k.to_string(), v.to_string());
  }
  AppConfig::from_lookup(|name| vars.get(name).cloned()).unwrap()
}

/// Seeded store plus the state the handlers run against.
pub struct TestShop {
  pub store: Arc<MemoryOrderStore>,
  pub state: AppState,
  pub user_id: Uuid,
  pub cart_id: Uuid,
  pub mug: Uuid,
  pub poster: Uuid,
}

impl TestShop {
  pub fn new() -> Self {
    Self::with_gateway(Arc::new(MockPaymentGateway::new()))
  }

  pub fn with_gateway(gateway: Arc<dyn PaymentGateway>) -> Self {
    Self::build(gateway, test_config(&[]))
  }

  pub fn build(gateway: Arc<dyn PaymentGateway>, config: AppConfig) -> Self {
    setup_tracing();
    let store = Arc::new(MemoryOrderStore::new());
    let user_id = Uuid::new_v4();
    let cart_id = Uuid::new_v4();
    let mug = Uuid::new_v4();
    let poster = Uuid::new_v4();
    store.put_product(product(mug, "Mug", 10.0, 5));
    store.put_product(product(poster, "Poster", 4.5, 3));
    store.put_cart(Cart {
      id: cart_id,
      user_id,
      created_at: Utc::now(),
      updated_at: Utc::now(),
    });

    let uploader = config.cloudinary.as_ref().map(|c| Arc::new(CloudinaryUploader::new(c)));
    let state = AppState::new(store.clone(), gateway, uploader, Arc::new(config));
    TestShop {
      store,
      state,
      user_id,
      cart_id,
      mug,
      poster,
    }
  }

  pub fn stock(&self, product_id: Uuid) -> i32 {
    self.store.product(product_id).map(|p| p.total_stock).unwrap_or(i32::MIN)
  }

  /// Order body with two mugs and one poster.
  pub fn order_body(&self, payment_method: &str) -> Value {
    json!({
      "userId": self.user_id,
      "cartId": self.cart_id,
      "cartItems": [
        {"productId": self.mug, "title": "Mug", "price": 10.0, "quantity": 2},
        {"productId": self.poster, "title": "Poster", "price": 4.5, "quantity": 1}
      ],
      "addressInfo": {
        "addressId": "addr-1",
        "address": "1 Main St",
        "city": "Springfield",
        "pincode": "12345",
        "phone": "555-0100",
        "notes": "Leave at the door"
      },
      "paymentMethod": payment_method,
      "totalAmount": 24.5
    })
  }
}

pub fn product(id: Uuid, title: &str, price: f64, stock: i32) -> Product {
  Product {
    id,
    title: title.to_string(),
    price,
    total_stock: stock,
    created_at: Utc::now(),
    updated_at: Utc::now(),
  }
}

/// A loopback listener for stand-in upstream servers.
pub fn local_listener() -> (TcpListener, String) {
  let listener = TcpListener::bind("127.0.0.1:0").unwrap();
  let addr = format!("http://{}", listener.local_addr().unwrap());
  (listener, addr)
}

/// Builds the storefront service for `actix_web::test` calls.
macro_rules! init_shop_app {
  ($shop:expr) => {
    actix_web::test::init_service(
      actix_web::App::new()
        .app_data(actix_web::web::Data::new($shop.state.clone()))
        .configure(|cfg| {
          storefront::web::configure_app_routes(cfg, $shop.state.config.max_upload_bytes)
        }),
    )
    .await
  };
}
