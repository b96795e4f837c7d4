// storefront/src/store/postgres.rs

use super::{stock_out_of_range, OrderStore, ORDER_ALREADY_PAID, ORDER_NOT_FOUND};
use crate::errors::{AppError, Result as AppResult};
use crate::models::{
  AddressInfo, CaptureCommand, CaptureOutcome, NewOrder, Order, OrderLineItem, OrderStatus, PaymentMethod,
  PaymentStatus,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

const ORDER_COLUMNS: &str = "id, user_id, cart_id, cart_items, address_info, order_status, payment_method, \
   payment_status, total_amount, order_date, order_update_date, payment_id, payer_id";

/// Row shape of `orders`; JSONB columns stay wrapped until converted into `Order`.
#[derive(Debug, FromRow)]
struct OrderRow {
  id: Uuid,
  user_id: Uuid,
  cart_id: Uuid,
  cart_items: Json<Vec<OrderLineItem>>,
  address_info: Json<AddressInfo>,
  order_status: OrderStatus,
  payment_method: PaymentMethod,
  payment_status: PaymentStatus,
  total_amount: f64,
  order_date: DateTime<Utc>,
  order_update_date: DateTime<Utc>,
  payment_id: Option<String>,
  payer_id: Option<String>,
}

impl From<OrderRow> for Order {
  fn from(row: OrderRow) -> Self {
    Order {
      id: row.id,
      user_id: row.user_id,
      cart_id: row.cart_id,
      cart_items: row.cart_items.0,
      address_info: row.address_info.0,
      order_status: row.order_status,
      payment_method: row.payment_method,
      payment_status: row.payment_status,
      total_amount: row.total_amount,
      order_date: row.order_date,
      order_update_date: row.order_update_date,
      payment_id: row.payment_id,
      payer_id: row.payer_id,
    }
  }
}

/// Postgres error code `numeric_value_out_of_range`.
const NUMERIC_OUT_OF_RANGE: &str = "22003";

fn stock_update_error(err: sqlx::Error, product_id: Uuid) -> AppError {
  let out_of_range =
    matches!(&err, sqlx::Error::Database(db) if db.code().as_deref() == Some(NUMERIC_OUT_OF_RANGE));
  if out_of_range {
    stock_out_of_range(product_id)
  } else {
    AppError::Persistence(err)
  }
}

#[derive(Clone)]
pub struct PgOrderStore {
  pool: PgPool,
}

impl PgOrderStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  /// Applies the bundled migrations under `storefront/migrations`.
  pub async fn migrate(&self) -> AppResult<()> {
    sqlx::migrate!("./migrations").run(&self.pool).await?;
    info!("Database migrations applied.");
    Ok(())
  }
}

#[async_trait]
impl OrderStore for PgOrderStore {
  #[instrument(name = "pg_store::insert_order", skip_all, fields(user_id = %order.user_id))]
  async fn insert_order(&self, order: NewOrder) -> AppResult<Order> {
    let now = Utc::now();
    let row: OrderRow = sqlx::query_as(&format!(
      "INSERT INTO orders ({ORDER_COLUMNS}) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10, $11, $12) \
       RETURNING {ORDER_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(order.user_id)
    .bind(order.cart_id)
    .bind(Json(&order.cart_items))
    .bind(Json(&order.address_info))
    .bind(order.order_status)
    .bind(order.payment_method)
    .bind(order.payment_status)
    .bind(order.total_amount)
    .bind(now)
    .bind(&order.payment_id)
    .bind(&order.payer_id)
    .fetch_one(&self.pool)
    .await
    .map_err(|e| {
      error!("Failed to insert order: {}", e);
      AppError::Persistence(e)
    })?;
    Ok(row.into())
  }

  #[instrument(name = "pg_store::find_order", skip(self))]
  async fn find_order(&self, order_id: Uuid) -> AppResult<Option<Order>> {
    let row: Option<OrderRow> = sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
      .bind(order_id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(row.map(Order::from))
  }

  #[instrument(name = "pg_store::orders_for_user", skip(self))]
  async fn orders_for_user(&self, user_id: Uuid) -> AppResult<Vec<Order>> {
    let rows: Vec<OrderRow> = sqlx::query_as(&format!(
      "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY order_date DESC"
    ))
    .bind(user_id)
    .fetch_all(&self.pool)
    .await?;
    Ok(rows.into_iter().map(Order::from).collect())
  }

  #[instrument(name = "pg_store::capture_order", skip_all, fields(order_id = %capture.order_id))]
  async fn capture_order(&self, capture: &CaptureCommand) -> AppResult<CaptureOutcome> {
    // Everything below commits together or not at all; dropping `tx` on an
    // early return rolls it back.
    let mut tx = self.pool.begin().await?;

    // Row lock serialises concurrent captures of the same order.
    let current: Option<OrderRow> =
      sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 FOR UPDATE"))
        .bind(capture.order_id)
        .fetch_optional(&mut *tx)
        .await?;
    let current: Order = current
      .ok_or_else(|| AppError::NotFound(ORDER_NOT_FOUND.to_string()))?
      .into();
    if current.is_paid() {
      return Err(AppError::Conflict(ORDER_ALREADY_PAID.to_string()));
    }

    // Product rows are locked in id order so concurrent captures cannot deadlock.
    let mut lines: Vec<&OrderLineItem> = current.cart_items.iter().collect();
    lines.sort_by_key(|line| line.product_id);

    let mut missing_products = Vec::new();
    for item in lines {
      let updated = sqlx::query(
        "UPDATE products SET total_stock = total_stock - $1, updated_at = now() WHERE id = $2",
      )
      .bind(item.quantity)
      .bind(item.product_id)
      .execute(&mut *tx)
      .await
      .map_err(|e| stock_update_error(e, item.product_id))?;
      if updated.rows_affected() == 0 {
        warn!(product_id = %item.product_id, "Product no longer exists; stock not adjusted.");
        missing_products.push(item.product_id);
      }
    }

    let cart_removed = sqlx::query("DELETE FROM carts WHERE id = $1")
      .bind(current.cart_id)
      .execute(&mut *tx)
      .await?
      .rows_affected()
      > 0;

    let row: OrderRow = sqlx::query_as(&format!(
      "UPDATE orders SET payment_status = $2, order_status = $3, payment_id = $4, payer_id = $5, \
       order_update_date = $6 WHERE id = $1 RETURNING {ORDER_COLUMNS}"
    ))
    .bind(capture.order_id)
    .bind(PaymentStatus::Paid)
    .bind(OrderStatus::Confirmed)
    .bind(&capture.payment_id)
    .bind(&capture.payer_id)
    .bind(Utc::now())
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(CaptureOutcome {
      order: row.into(),
      missing_products,
      cart_removed,
    })
  }
}
