// storefront/src/services/paypal.rs

use super::payment_gateway::{CreatedPayment, PaymentGateway, PaymentRequest};
use crate::config::PaypalCredentials;
use crate::errors::{AppError, Result as AppResult};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{error, info, instrument};

#[derive(Debug, Deserialize)]
struct AccessToken {
  access_token: String,
}

/// REST client for the provider's v1 payments API.
#[derive(Clone)]
pub struct PaypalGateway {
  http: reqwest::Client,
  api_base: String,
  client_id: String,
  client_secret: String,
}

impl PaypalGateway {
  pub fn new(credentials: &PaypalCredentials) -> Self {
    Self::with_api_base(credentials, credentials.mode.api_base())
  }

  pub fn with_api_base(credentials: &PaypalCredentials, api_base: &str) -> Self {
    Self {
      http: reqwest::Client::new(),
      api_base: api_base.trim_end_matches('/').to_string(),
      client_id: credentials.client_id.clone(),
      client_secret: credentials.client_secret.clone(),
    }
  }

  async fn access_token(&self) -> AppResult<String> {
    let response = self
      .http
      .post(format!("{}/v1/oauth2/token", self.api_base))
      .basic_auth(&self.client_id, Some(&self.client_secret))
      .form(&[("grant_type", "client_credentials")])
      .send()
      .await
      .map_err(|e| AppError::PaymentGateway(format!("token request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      error!(%status, "Payment provider rejected client credentials.");
      return Err(AppError::PaymentGateway(format!("token request returned {}: {}", status, body)));
    }

    let token: AccessToken = response
      .json()
      .await
      .map_err(|e| AppError::PaymentGateway(format!("unreadable token response: {}", e)))?;
    Ok(token.access_token)
  }
}

#[async_trait]
impl PaymentGateway for PaypalGateway {
  #[instrument(name = "paypal::create_payment", skip_all, fields(api_base = %self.api_base))]
  async fn create_payment(&self, request: &PaymentRequest) -> AppResult<CreatedPayment> {
    let token = self.access_token().await?;

    let response = self
      .http
      .post(format!("{}/v1/payments/payment", self.api_base))
      .bearer_auth(token)
      .json(request)
      .send()
      .await
      .map_err(|e| AppError::PaymentGateway(format!("payment request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      error!(%status, "Payment provider refused the payment.");
      return Err(AppError::PaymentGateway(format!("payment request returned {}: {}", status, body)));
    }

    let created: CreatedPayment = response
      .json()
      .await
      .map_err(|e| AppError::PaymentGateway(format!("unreadable payment response: {}", e)))?;
    info!(payment_id = %created.id, "Payment created with provider.");
    Ok(created)
  }
}
