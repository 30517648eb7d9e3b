//! # PayPal Gateway
//!
//! Live payment adapter over the PayPal REST API:
//!
//! 1. `POST /v1/oauth2/token` - client-credentials OAuth token
//! 2. `POST /v2/checkout/orders` - create a CAPTURE-intent order
//! 3. `POST /v2/checkout/orders/{id}/capture` - capture after approval
//!
//! Transport failures and timeouts map to `GatewayError::Unavailable`;
//! a capture that comes back in any state other than `COMPLETED` is a
//! decline (`Capture { confirmed: false }`), never a silent success.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use pleyazul_core::Order;

use crate::config::PayPalConfig;

use super::{Capture, GatewayError, GatewayResult, PaymentGateway, PaymentHandle};

/// Live PayPal payment gateway.
pub struct PayPalGateway {
    http: Client,
    config: PayPalConfig,
    timeout: Duration,
}

impl PayPalGateway {
    /// Creates a gateway from credentials and a per-call deadline.
    pub fn new(config: PayPalConfig, timeout: Duration) -> Self {
        PayPalGateway {
            http: Client::new(),
            config,
            timeout,
        }
    }

    /// Fetches an OAuth access token via client credentials.
    async fn access_token(&self) -> GatewayResult<String> {
        let (Some(client_id), Some(client_secret)) =
            (&self.config.client_id, &self.config.client_secret)
        else {
            return Err(GatewayError::NotConfigured);
        };

        let url = format!("{}/v1/oauth2/token", self.config.api_base());

        let response = self
            .http
            .post(&url)
            .timeout(self.timeout)
            .basic_auth(client_id, Some(client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(map_transport_error)?;

        if !response.status().is_success() {
            return Err(GatewayError::Unavailable(format!(
                "token request returned {}",
                response.status()
            )));
        }

        let token: TokenResponse = response.json().await.map_err(map_transport_error)?;
        Ok(token.access_token)
    }
}

#[async_trait]
impl PaymentGateway for PayPalGateway {
    fn name(&self) -> &'static str {
        "paypal"
    }

    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    async fn create_payment(&self, order: &Order) -> GatewayResult<PaymentHandle> {
        if !self.is_configured() {
            return Err(GatewayError::NotConfigured);
        }

        let token = self.access_token().await?;
        let url = format!("{}/v2/checkout/orders", self.config.api_base());

        let body = CreateOrderBody {
            intent: "CAPTURE",
            purchase_units: vec![PurchaseUnit {
                reference_id: &order.id,
                description: format!("Lectura {} - Pleyazul Oráculos", order.spread_id),
                amount: Amount {
                    currency_code: order.currency.clone(),
                    value: amount_value(order.amount_cents),
                },
            }],
            application_context: ApplicationContext {
                brand_name: "Pleyazul Oráculos",
                locale: "es-ES",
                user_action: "PAY_NOW",
            },
        };

        debug!(order_id = %order.id, "Creating PayPal order");

        let response = self
            .http
            .post(&url)
            .timeout(self.timeout)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        if !response.status().is_success() {
            return Err(GatewayError::Unavailable(format!(
                "order creation returned {}",
                response.status()
            )));
        }

        let created: OrderResponse = response.json().await.map_err(map_transport_error)?;
        let approval_url = approval_link(&created.links);

        info!(
            order_id = %order.id,
            paypal_order_id = %created.id,
            "PayPal order created"
        );

        Ok(PaymentHandle {
            provider_order_id: created.id,
            approval_url,
        })
    }

    async fn capture_payment(&self, reference: &str) -> GatewayResult<Capture> {
        if !self.is_configured() {
            return Err(GatewayError::NotConfigured);
        }

        let token = self.access_token().await?;
        let url = format!(
            "{}/v2/checkout/orders/{}/capture",
            self.config.api_base(),
            reference
        );

        debug!(reference = %reference, "Capturing PayPal order");

        let response = self
            .http
            .post(&url)
            .timeout(self.timeout)
            .bearer_auth(&token)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();

        if status.is_client_error() {
            // Unapproved or unknown order: a decline, not an outage
            warn!(reference = %reference, %status, "PayPal capture declined");
            return Ok(Capture {
                confirmed: false,
                capture_id: None,
            });
        }

        if !status.is_success() {
            return Err(GatewayError::Unavailable(format!(
                "capture returned {}",
                status
            )));
        }

        let captured: CaptureResponse = response.json().await.map_err(map_transport_error)?;
        let confirmed = captured.status == "COMPLETED";
        let capture_id = captured.first_capture_id();

        if !confirmed {
            warn!(reference = %reference, status = %captured.status, "PayPal capture not completed");
        }

        Ok(Capture {
            confirmed,
            capture_id,
        })
    }
}

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Serialize)]
struct CreateOrderBody<'a> {
    intent: &'a str,
    purchase_units: Vec<PurchaseUnit<'a>>,
    application_context: ApplicationContext<'a>,
}

#[derive(Debug, Serialize)]
struct PurchaseUnit<'a> {
    reference_id: &'a str,
    description: String,
    amount: Amount,
}

#[derive(Debug, Serialize)]
struct Amount {
    currency_code: String,
    value: String,
}

#[derive(Debug, Serialize)]
struct ApplicationContext<'a> {
    brand_name: &'a str,
    locale: &'a str,
    user_action: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct OrderResponse {
    id: String,
    #[serde(default)]
    links: Vec<Link>,
}

#[derive(Debug, Deserialize)]
struct Link {
    href: String,
    rel: String,
}

#[derive(Debug, Deserialize)]
struct CaptureResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    purchase_units: Vec<CapturePurchaseUnit>,
}

impl CaptureResponse {
    fn first_capture_id(&self) -> Option<String> {
        self.purchase_units
            .first()
            .and_then(|unit| unit.payments.as_ref())
            .and_then(|payments| payments.captures.first())
            .map(|capture| capture.id.clone())
    }
}

#[derive(Debug, Deserialize)]
struct CapturePurchaseUnit {
    #[serde(default)]
    payments: Option<Payments>,
}

#[derive(Debug, Deserialize)]
struct Payments {
    #[serde(default)]
    captures: Vec<CaptureRecord>,
}

#[derive(Debug, Deserialize)]
struct CaptureRecord {
    id: String,
}

// =============================================================================
// Helpers
// =============================================================================

/// Formats cents as the decimal string PayPal expects ("1999" → "19.99").
fn amount_value(cents: i64) -> String {
    format!("{}.{:02}", cents / 100, cents % 100)
}

/// Picks the customer-approval link out of a HATEOAS link list.
fn approval_link(links: &[Link]) -> Option<String> {
    links
        .iter()
        .find(|link| link.rel == "approve")
        .map(|link| link.href.clone())
}

fn map_transport_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Unavailable("provider timed out".to_string())
    } else {
        GatewayError::Unavailable(err.to_string())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
