// storefront/src/store/memory.rs

use super::{stock_out_of_range, OrderStore, ORDER_ALREADY_PAID, ORDER_NOT_FOUND};
use crate::errors::{AppError, Result as AppResult};
use crate::models::{Cart, CaptureCommand, CaptureOutcome, NewOrder, Order, OrderStatus, PaymentStatus, Product};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::{debug, instrument};
use uuid::Uuid;

#[derive(Default)]
struct Tables {
  orders: HashMap<Uuid, Order>,
  products: HashMap<Uuid, Product>,
  carts: HashMap<Uuid, Cart>,
}

/// Process-local store. One mutex guards all tables, so a capture is applied
/// atomically with respect to every other operation.
#[derive(Default)]
pub struct MemoryOrderStore {
  tables: Mutex<Tables>,
}

impl MemoryOrderStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn put_product(&self, product: Product) {
    self.tables.lock().products.insert(product.id, product);
  }

  pub fn put_cart(&self, cart: Cart) {
    self.tables.lock().carts.insert(cart.id, cart);
  }

  pub fn product(&self, product_id: Uuid) -> Option<Product> {
    self.tables.lock().products.get(&product_id).cloned()
  }

  pub fn has_cart(&self, cart_id: Uuid) -> bool {
    self.tables.lock().carts.contains_key(&cart_id)
  }

  pub fn order_count(&self) -> usize {
    self.tables.lock().orders.len()
  }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
  #[instrument(name = "memory_store::insert_order", skip_all, fields(user_id = %order.user_id))]
  async fn insert_order(&self, order: NewOrder) -> AppResult<Order> {
    let now = Utc::now();
    let order = Order {
      id: Uuid::new_v4(),
      user_id: order.user_id,
      cart_id: order.cart_id,
      cart_items: order.cart_items,
      address_info: order.address_info,
      order_status: order.order_status,
      payment_method: order.payment_method,
      payment_status: order.payment_status,
      total_amount: order.total_amount,
      order_date: now,
      order_update_date: now,
      payment_id: order.payment_id,
      payer_id: order.payer_id,
    };
    self.tables.lock().orders.insert(order.id, order.clone());
    debug!(order_id = %order.id, "Order stored.");
    Ok(order)
  }

  async fn find_order(&self, order_id: Uuid) -> AppResult<Option<Order>> {
    Ok(self.tables.lock().orders.get(&order_id).cloned())
  }

  async fn orders_for_user(&self, user_id: Uuid) -> AppResult<Vec<Order>> {
    let mut orders: Vec<Order> = self
      .tables
      .lock()
      .orders
      .values()
      .filter(|o| o.user_id == user_id)
      .cloned()
      .collect();
    orders.sort_by(|a, b| b.order_date.cmp(&a.order_date));
    Ok(orders)
  }

  #[instrument(name = "memory_store::capture_order", skip_all, fields(order_id = %capture.order_id))]
  async fn capture_order(&self, capture: &CaptureCommand) -> AppResult<CaptureOutcome> {
    let mut tables = self.tables.lock();
    let Tables {
      orders,
      products,
      carts,
    } = &mut *tables;

    let order = orders
      .get_mut(&capture.order_id)
      .ok_or_else(|| AppError::NotFound(ORDER_NOT_FOUND.to_string()))?;
    if order.is_paid() {
      return Err(AppError::Conflict(ORDER_ALREADY_PAID.to_string()));
    }

    // Work out every new stock level first so a failing line changes nothing.
    let mut new_stock: HashMap<Uuid, i32> = HashMap::new();
    let mut missing_products = Vec::new();
    for item in &order.cart_items {
      let Some(product) = products.get(&item.product_id) else {
        missing_products.push(item.product_id);
        continue;
      };
      let current = new_stock.get(&item.product_id).copied().unwrap_or(product.total_stock);
      let remaining = current
        .checked_sub(item.quantity)
        .ok_or_else(|| stock_out_of_range(item.product_id))?;
      new_stock.insert(item.product_id, remaining);
    }

    let now = Utc::now();
    for (product_id, remaining) in new_stock {
      if let Some(product) = products.get_mut(&product_id) {
        product.total_stock = remaining;
        product.updated_at = now;
      }
    }
    let cart_removed = carts.remove(&order.cart_id).is_some();

    order.payment_status = PaymentStatus::Paid;
    order.order_status = OrderStatus::Confirmed;
    order.payment_id = Some(capture.payment_id.clone());
    order.payer_id = Some(capture.payer_id.clone());
    order.order_update_date = now;

    Ok(CaptureOutcome {
      order: order.clone(),
      missing_products,
      cart_removed,
    })
  }
}
