// storefront/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{AddressInfo, OrderLineItem, PaymentMethod};
use crate::pipelines::contexts::{CapturePaymentCtxData, CreateOrderCtxData};
use crate::state::AppState;
use flowline::{ContextData, PipelineResult};

// --- Request Payload DTOs ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderPayload {
  pub user_id: Uuid,
  pub cart_id: Uuid,
  pub cart_items: Vec<OrderLineItem>,
  pub address_info: AddressInfo,
  pub payment_method: PaymentMethod,
  pub total_amount: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturePayload {
  pub payment_id: String,
  pub payer_id: String,
  pub order_id: Uuid,
}

// --- Handler Implementations ---

#[instrument(
  name = "handler::create_order",
  skip(app_state, req_payload),
  fields(user_id = %req_payload.user_id, payment_method = ?req_payload.payment_method)
)]
pub async fn create_order_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<PlaceOrderPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  info!("Order placement requested with {} line(s).", payload.cart_items.len());

  let ctx_data = ContextData::new(CreateOrderCtxData::new(
    app_state.get_ref().clone(),
    payload.user_id,
    payload.cart_id,
    payload.cart_items,
    payload.address_info,
    payload.payment_method,
    payload.total_amount,
  ));

  match app_state.flows.run(ctx_data.clone()).await {
    Ok(PipelineResult::Completed) => {
      let guard = ctx_data.read();
      let order = guard.created_order.as_ref().ok_or_else(|| {
        AppError::Internal("Create order pipeline completed without an order.".to_string())
      })?;
      Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Order created successfully",
        "approvalURL": guard.approval_url,
        "orderId": order.id,
        "orderStatus": order.order_status,
        "paymentStatus": order.payment_status,
      })))
    }
    Ok(PipelineResult::Stopped) => {
      warn!("Create order pipeline was stopped before the order was stored.");
      Err(AppError::Internal("Order creation was halted.".to_string()))
    }
    Err(app_err) => {
      warn!("Create order pipeline failed: {:?}", app_err);
      Err(app_err)
    }
  }
}

#[instrument(
  name = "handler::capture_payment",
  skip(app_state, req_payload),
  fields(order_id = %req_payload.order_id)
)]
pub async fn capture_payment_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<CapturePayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();

  let ctx_data = ContextData::new(CapturePaymentCtxData::new(
    app_state.get_ref().clone(),
    payload.order_id,
    payload.payment_id,
    payload.payer_id,
  ));

  match app_state.flows.run(ctx_data.clone()).await {
    Ok(PipelineResult::Completed) => {
      let guard = ctx_data.read();
      let outcome = guard.outcome.as_ref().ok_or_else(|| {
        AppError::Internal("Capture pipeline completed without an outcome.".to_string())
      })?;
      Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Order confirmed",
        "data": outcome.order,
      })))
    }
    Ok(PipelineResult::Stopped) => {
      warn!("Capture pipeline was stopped before committing.");
      Err(AppError::Internal("Payment capture was halted.".to_string()))
    }
    Err(app_err) => {
      warn!("Capture pipeline failed: {:?}", app_err);
      Err(app_err)
    }
  }
}

#[instrument(name = "handler::list_orders", skip(app_state))]
pub async fn list_orders_handler(
  app_state: web::Data<AppState>,
  user_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let orders = app_state.store.orders_for_user(user_id.into_inner()).await?;
  if orders.is_empty() {
    return Err(AppError::NotFound("No orders found!".to_string()));
  }
  Ok(HttpResponse::Ok().json(json!({ "success": true, "data": orders })))
}

#[instrument(name = "handler::order_details", skip(app_state))]
pub async fn order_details_handler(
  app_state: web::Data<AppState>,
  order_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let order = app_state
    .store
    .find_order(order_id.into_inner())
    .await?
    .ok_or_else(|| AppError::NotFound("Order not found!".to_string()))?;
  Ok(HttpResponse::Ok().json(json!({ "success": true, "data": order })))
}
