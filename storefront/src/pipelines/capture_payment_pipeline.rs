// storefront/src/pipelines/capture_payment_pipeline.rs

use crate::errors::AppError;
use crate::models::CaptureCommand;
use crate::pipelines::contexts::CapturePaymentCtxData;
use crate::store::{ORDER_ALREADY_PAID, ORDER_NOT_FOUND};
use flowline::{ContextData, Pipeline, PipelineControl, Registry};
use std::sync::Arc;
use tracing::{info, warn};

pub fn register_capture_payment_pipeline(registry: &Arc<Registry<AppError>>) {
  let mut p = Pipeline::<CapturePaymentCtxData, AppError>::new(&[
    ("load_order_for_capture", false, None),
    ("reject_repeat_capture", false, None),
    ("commit_capture", false, None),
  ]);

  p.on_root("load_order_for_capture", |ctx_data: ContextData<CapturePaymentCtxData>| {
    Box::pin(async move {
      let (store, order_id) = ctx_data.snapshot(|c| (c.app_state.store.clone(), c.order_id));
      let order = store
        .find_order(order_id)
        .await?
        .ok_or_else(|| AppError::NotFound(ORDER_NOT_FOUND.to_string()))?;
      ctx_data.write().loaded_order = Some(order);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  // Early answer for the common repeat; the store re-checks under its lock.
  p.on_root("reject_repeat_capture", |ctx_data: ContextData<CapturePaymentCtxData>| {
    Box::pin(async move {
      let guard = ctx_data.read();
      let order = guard
        .loaded_order
        .as_ref()
        .ok_or_else(|| AppError::Internal("order was not loaded before capture".to_string()))?;
      if order.is_paid() {
        warn!(order_id = %order.id, payment_id = ?order.payment_id, "Repeat capture rejected.");
        return Err(AppError::Conflict(ORDER_ALREADY_PAID.to_string()));
      }
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("commit_capture", |ctx_data: ContextData<CapturePaymentCtxData>| {
    Box::pin(async move {
      let (store, command) = ctx_data.snapshot(|c| {
        let command = CaptureCommand {
          order_id: c.order_id,
          payment_id: c.payment_id.clone(),
          payer_id: c.payer_id.clone(),
        };
        (c.app_state.store.clone(), command)
      });

      let outcome = store.capture_order(&command).await?;
      if !outcome.missing_products.is_empty() {
        warn!(
          order_id = %command.order_id,
          missing_products = ?outcome.missing_products,
          "Captured order references products that no longer exist."
        );
      }
      if !outcome.cart_removed {
        warn!(order_id = %command.order_id, cart_id = %outcome.order.cart_id, "Cart was already gone at capture.");
      }
      info!(order_id = %command.order_id, "Payment captured and order confirmed.");
      ctx_data.write().outcome = Some(outcome);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  registry.register_pipeline(p);
}
