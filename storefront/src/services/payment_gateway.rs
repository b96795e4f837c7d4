// storefront/src/services/payment_gateway.rs

//! The payment-creation call, behind one awaitable seam.

use crate::errors::Result as AppResult;
use crate::models::OrderLineItem;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub const APPROVAL_REL: &str = "approval_url";
const PURCHASE_DESCRIPTION: &str = "Purchase from our store";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentRequest {
  pub intent: String,
  pub payer: Payer,
  pub redirect_urls: RedirectUrls,
  pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payer {
  pub payment_method: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RedirectUrls {
  pub return_url: String,
  pub cancel_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
  pub item_list: ItemList,
  pub amount: Amount,
  pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemList {
  pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
  pub name: String,
  pub sku: String,
  pub price: String,
  pub currency: String,
  pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Amount {
  pub currency: String,
  pub total: String,
}

/// Money amounts travel as strings with two decimals.
fn money(value: f64) -> String {
  format!("{:.2}", value)
}

impl PaymentRequest {
  /// Builds a single-transaction `sale` for the given order lines.
  pub fn for_order(
    items: &[OrderLineItem],
    total: f64,
    currency: &str,
    return_url: &str,
    cancel_url: &str,
  ) -> Self {
    let items = items
      .iter()
      .map(|line| Item {
        name: line.title.clone(),
        sku: line.product_id.to_string(),
        price: money(line.price),
        currency: currency.to_string(),
        quantity: line.quantity,
      })
      .collect();

    PaymentRequest {
      intent: "sale".to_string(),
      payer: Payer {
        payment_method: "paypal".to_string(),
      },
      redirect_urls: RedirectUrls {
        return_url: return_url.to_string(),
        cancel_url: cancel_url.to_string(),
      },
      transactions: vec![Transaction {
        item_list: ItemList { items },
        amount: Amount {
          currency: currency.to_string(),
          total: money(total),
        },
        description: PURCHASE_DESCRIPTION.to_string(),
      }],
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
  pub href: String,
  pub rel: String,
  #[serde(default)]
  pub method: Option<String>,
}

/// The parts of the provider's answer the order flow uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedPayment {
  pub id: String,
  #[serde(default)]
  pub links: Vec<Link>,
}

impl CreatedPayment {
  pub fn approval_url(&self) -> Option<&str> {
    self
      .links
      .iter()
      .find(|link| link.rel == APPROVAL_REL)
      .map(|link| link.href.as_str())
  }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
  /// Registers a payment with the provider. Any failure, whatever its cause,
  /// comes back as `AppError::PaymentGateway`.
  async fn create_payment(&self, request: &PaymentRequest) -> AppResult<CreatedPayment>;
}
