// storefront/src/services/payment_mock.rs

use super::payment_gateway::{CreatedPayment, Link, PaymentGateway, PaymentRequest, APPROVAL_REL};
use crate::errors::{AppError, Result as AppResult};
use async_trait::async_trait;
use tracing::{info, instrument};
use uuid::Uuid;

/// Local stand-in for the provider, used with `PAYMENT_GATEWAY=mock`.
///
/// Approval links point back at the request's return url, so a frontend can
/// walk the full redirect flow without leaving the machine.
#[derive(Debug, Clone, Default)]
pub struct MockPaymentGateway;

impl MockPaymentGateway {
  pub fn new() -> Self {
    MockPaymentGateway
  }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
  #[instrument(name = "mock_gateway::create_payment", skip_all)]
  async fn create_payment(&self, request: &PaymentRequest) -> AppResult<CreatedPayment> {
    let transaction = request
      .transactions
      .first()
      .ok_or_else(|| AppError::PaymentGateway("payment request has no transaction".to_string()))?;
    if transaction.item_list.items.is_empty() {
      return Err(AppError::PaymentGateway("payment request has no items".to_string()));
    }

    let payment_id = format!("PAYID-MOCK-{}", Uuid::new_v4().simple());
    let token = format!("EC-{}", Uuid::new_v4().simple());
    let separator = if request.redirect_urls.return_url.contains('?') { '&' } else { '?' };
    info!(%payment_id, total = %transaction.amount.total, "Simulated payment creation.");

    Ok(CreatedPayment {
      links: vec![
        Link {
          href: format!("mock://payments/{}", payment_id),
          rel: "self".to_string(),
          method: Some("GET".to_string()),
        },
        Link {
          href: format!(
            "{}{}paymentId={}&token={}",
            request.redirect_urls.return_url, separator, payment_id, token
          ),
          rel: APPROVAL_REL.to_string(),
          method: Some("REDIRECT".to_string()),
        },
      ],
      id: payment_id,
    })
  }
}
