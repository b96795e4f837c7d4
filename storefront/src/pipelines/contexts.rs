// storefront/src/pipelines/contexts.rs

//! Data the order pipelines operate on. Handlers receive these wrapped in
//! `flowline::ContextData`.

use crate::models::{AddressInfo, CaptureOutcome, Order, OrderLineItem, OrderStatus, PaymentMethod, PaymentStatus};
use crate::state::AppState;
use uuid::Uuid;

#[derive(Clone)]
pub struct CreateOrderCtxData {
  pub app_state: AppState,
  pub user_id: Uuid,
  pub cart_id: Uuid,
  pub cart_items: Vec<OrderLineItem>,
  pub address_info: AddressInfo,
  pub payment_method: PaymentMethod,
  pub total_amount: f64,
  // Filled in by the pipeline.
  pub payment_status: PaymentStatus,
  pub order_status: OrderStatus,
  pub payment_id: Option<String>,
  pub approval_url: Option<String>,
  pub created_order: Option<Order>,
}

impl CreateOrderCtxData {
  #[allow(clippy::too_many_arguments)]
  pub fn new(
    app_state: AppState,
    user_id: Uuid,
    cart_id: Uuid,
    cart_items: Vec<OrderLineItem>,
    address_info: AddressInfo,
    payment_method: PaymentMethod,
    total_amount: f64,
  ) -> Self {
    Self {
      app_state,
      user_id,
      cart_id,
      cart_items,
      address_info,
      payment_method,
      total_amount,
      payment_status: PaymentStatus::Pending,
      order_status: OrderStatus::Processing,
      payment_id: None,
      approval_url: None,
      created_order: None,
    }
  }
}

#[derive(Clone)]
pub struct CapturePaymentCtxData {
  pub app_state: AppState,
  pub order_id: Uuid,
  pub payment_id: String,
  pub payer_id: String,
  pub loaded_order: Option<Order>,
  pub outcome: Option<CaptureOutcome>,
}

impl CapturePaymentCtxData {
  pub fn new(app_state: AppState, order_id: Uuid, payment_id: String, payer_id: String) -> Self {
    Self {
      app_state,
      order_id,
      payment_id,
      payer_id,
      loaded_order: None,
      outcome: None,
    }
  }
}
