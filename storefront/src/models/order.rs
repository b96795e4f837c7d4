// storefront/src/models/order.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Type as SqlxType;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "order_status_enum", rename_all = "lowercase")]
pub enum OrderStatus {
  Processing,
  Confirmed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "payment_status_enum", rename_all = "lowercase")]
pub enum PaymentStatus {
  Pending,
  Approved,
  Paid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "payment_method_enum")]
pub enum PaymentMethod {
  #[serde(rename = "COD")]
  #[sqlx(rename = "COD")]
  CashOnDelivery,
  #[serde(rename = "paypal")]
  #[sqlx(rename = "paypal")]
  Paypal,
}

impl PaymentMethod {
  /// Cash on delivery needs no gateway round-trip and is approved on placement.
  pub fn settles_on_delivery(&self) -> bool {
    matches!(self, PaymentMethod::CashOnDelivery)
  }
}

/// A cart line copied into the order when it is placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItem {
  pub product_id: Uuid,
  pub title: String,
  pub price: f64,
  pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressInfo {
  #[serde(default)]
  pub address_id: Option<String>,
  pub address: String,
  pub city: String,
  pub pincode: String,
  pub phone: String,
  #[serde(default)]
  pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  pub id: Uuid,
  pub user_id: Uuid,
  pub cart_id: Uuid,
  pub cart_items: Vec<OrderLineItem>,
  pub address_info: AddressInfo,
  pub order_status: OrderStatus,
  pub payment_method: PaymentMethod,
  pub payment_status: PaymentStatus,
  pub total_amount: f64,
  pub order_date: DateTime<Utc>,
  pub order_update_date: DateTime<Utc>,
  pub payment_id: Option<String>,
  pub payer_id: Option<String>,
}

impl Order {
  pub fn is_paid(&self) -> bool {
    self.payment_status == PaymentStatus::Paid
  }
}

/// Everything needed to persist a freshly placed order. Ids and timestamps are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewOrder {
  pub user_id: Uuid,
  pub cart_id: Uuid,
  pub cart_items: Vec<OrderLineItem>,
  pub address_info: AddressInfo,
  pub order_status: OrderStatus,
  pub payment_method: PaymentMethod,
  pub payment_status: PaymentStatus,
  pub total_amount: f64,
  pub payment_id: Option<String>,
  pub payer_id: Option<String>,
}

/// Payment confirmation as reported by the caller after the payer approved it.
#[derive(Debug, Clone)]
pub struct CaptureCommand {
  pub order_id: Uuid,
  pub payment_id: String,
  pub payer_id: String,
}

/// What a successful capture changed.
#[derive(Debug, Clone)]
pub struct CaptureOutcome {
  pub order: Order,
  /// Line items whose product no longer exists; their stock was left alone.
  pub missing_products: Vec<Uuid>,
  /// False when the cart had already been removed.
  pub cart_removed: bool,
}
