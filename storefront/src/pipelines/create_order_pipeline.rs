// storefront/src/pipelines/create_order_pipeline.rs

use crate::errors::AppError;
use crate::models::{NewOrder, OrderLineItem, OrderStatus, PaymentMethod, PaymentStatus};
use crate::pipelines::contexts::CreateOrderCtxData;
use crate::services::PaymentRequest;
use flowline::{ContextData, Pipeline, PipelineControl, Registry, SkipCondition};
use std::sync::Arc;
use tracing::{error, info};

pub fn register_create_order_pipeline(registry: &Arc<Registry<AppError>>) {
  let skip_unless_cod: SkipCondition<CreateOrderCtxData> =
    Arc::new(|ctx: ContextData<CreateOrderCtxData>| !ctx.snapshot(|c| c.payment_method.settles_on_delivery()));
  let skip_if_cod: SkipCondition<CreateOrderCtxData> =
    Arc::new(|ctx: ContextData<CreateOrderCtxData>| ctx.snapshot(|c| c.payment_method.settles_on_delivery()));

  let mut p = Pipeline::<CreateOrderCtxData, AppError>::new(&[
    ("validate_order_request", false, None),
    ("settle_cash_on_delivery", false, Some(skip_unless_cod)),
    ("initiate_gateway_payment", false, Some(skip_if_cod)),
    ("persist_order", false, None),
  ]);

  p.on_root("validate_order_request", |ctx_data: ContextData<CreateOrderCtxData>| {
    Box::pin(async move {
      let guard = ctx_data.read();
      validate_order(&guard.cart_items, guard.total_amount, guard.payment_method)?;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("settle_cash_on_delivery", |ctx_data: ContextData<CreateOrderCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      guard.payment_status = PaymentStatus::Approved;
      guard.order_status = OrderStatus::Confirmed;
      info!(user_id = %guard.user_id, "Cash on delivery order approved without gateway call.");
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("initiate_gateway_payment", |ctx_data: ContextData<CreateOrderCtxData>| {
    Box::pin(async move {
      let (gateway, request) = ctx_data.snapshot(|c| {
        let cfg = &c.app_state.config;
        let request = PaymentRequest::for_order(
          &c.cart_items,
          c.total_amount,
          &cfg.payment_currency,
          &cfg.payment_return_url,
          &cfg.payment_cancel_url,
        );
        (c.app_state.gateway.clone(), request)
      });

      let created = gateway.create_payment(&request).await?;
      let approval_url = created
        .approval_url()
        .map(str::to_string)
        .ok_or_else(|| {
          error!(payment_id = %created.id, "Gateway response carried no approval link.");
          AppError::PaymentGateway(format!("payment {} has no approval_url link", created.id))
        })?;

      let mut guard = ctx_data.write();
      guard.payment_status = PaymentStatus::Pending;
      guard.order_status = OrderStatus::Processing;
      guard.payment_id = Some(created.id);
      guard.approval_url = Some(approval_url);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("persist_order", |ctx_data: ContextData<CreateOrderCtxData>| {
    Box::pin(async move {
      let (store, new_order) = ctx_data.snapshot(|c| {
        let new_order = NewOrder {
          user_id: c.user_id,
          cart_id: c.cart_id,
          cart_items: c.cart_items.clone(),
          address_info: c.address_info.clone(),
          order_status: c.order_status,
          payment_method: c.payment_method,
          payment_status: c.payment_status,
          total_amount: c.total_amount,
          payment_id: c.payment_id.clone(),
          payer_id: None,
        };
        (c.app_state.store.clone(), new_order)
      });

      let order = store.insert_order(new_order).await?;
      info!(order_id = %order.id, payment_status = ?order.payment_status, "Order persisted.");
      ctx_data.write().created_order = Some(order);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  registry.register_pipeline(p);
}

/// Checks an order request before anything is sent or stored.
pub fn validate_order(items: &[OrderLineItem], total_amount: f64, method: PaymentMethod) -> Result<(), AppError> {
  if items.is_empty() {
    return Err(AppError::Validation("Cart items cannot be empty".to_string()));
  }
  for item in items {
    if item.quantity <= 0 {
      return Err(AppError::Validation(format!(
        "Quantity for product {} must be greater than zero",
        item.product_id
      )));
    }
    if !item.price.is_finite() || item.price < 0.0 {
      return Err(AppError::Validation(format!(
        "Price for product {} must be a non-negative number",
        item.product_id
      )));
    }
  }
  if !total_amount.is_finite() || total_amount < 0.0 {
    return Err(AppError::Validation("Total amount must be a non-negative number".to_string()));
  }
  if !method.settles_on_delivery() && total_amount <= 0.0 {
    return Err(AppError::Validation(
      "Total amount must be greater than zero for online payment".to_string(),
    ));
  }
  Ok(())
}
