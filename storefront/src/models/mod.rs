// storefront/src/models/mod.rs

//! Records the order flow reads and writes.

pub mod cart;
pub mod order;
pub mod product;

pub use cart::Cart;
pub use order::{
  AddressInfo, CaptureCommand, CaptureOutcome, NewOrder, Order, OrderLineItem, OrderStatus, PaymentMethod,
  PaymentStatus,
};
pub use product::Product;
