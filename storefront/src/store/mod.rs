// storefront/src/store/mod.rs

//! Persistence behind the order handlers.

pub mod memory;
pub mod postgres;

use crate::errors::{AppError, Result as AppResult};
use crate::models::{CaptureCommand, CaptureOutcome, NewOrder, Order};
use async_trait::async_trait;
use uuid::Uuid;

pub use memory::MemoryOrderStore;
pub use postgres::PgOrderStore;

pub const ORDER_NOT_FOUND: &str = "Order not found";
pub const ORDER_ALREADY_PAID: &str = "Order has already been paid";
pub const STOCK_OUT_OF_RANGE: &str = "Stock adjustment out of range";

/// A decrement that would leave the stock counter outside its integer range.
pub(crate) fn stock_out_of_range(product_id: Uuid) -> AppError {
  AppError::Conflict(format!("{} for product {}", STOCK_OUT_OF_RANGE, product_id))
}

#[async_trait]
pub trait OrderStore: Send + Sync {
  async fn insert_order(&self, order: NewOrder) -> AppResult<Order>;

  async fn find_order(&self, order_id: Uuid) -> AppResult<Option<Order>>;

  /// All orders placed by `user_id`, newest first.
  async fn orders_for_user(&self, user_id: Uuid) -> AppResult<Vec<Order>>;

  /// Marks the order paid and consumes its stock and cart as a single unit.
  ///
  /// Either everything is applied or nothing is. Fails with `NotFound` when
  /// the order does not exist and `Conflict` when it was already paid, so a
  /// repeated capture never decrements stock twice. A decrement that would
  /// overflow the stock counter is a `Conflict` and leaves everything as it was.
  async fn capture_order(&self, capture: &CaptureCommand) -> AppResult<CaptureOutcome>;
}
