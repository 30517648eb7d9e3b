//! Fulfillment configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults, then injected into [`FulfillmentService`] at construction.
//! Nothing in the service reads the environment afterwards: test mode is
//! an explicit value, not ambient state.
//!
//! [`FulfillmentService`]: crate::service::FulfillmentService

use std::env;
use std::time::Duration;

/// Fulfillment service configuration.
#[derive(Debug, Clone)]
pub struct FulfillmentConfig {
    /// Use the mock gateway instead of PayPal.
    ///
    /// Decided once at startup; selects which `PaymentGateway`
    /// implementation the service is built with.
    pub test_mode: bool,

    /// Price charged per reading, in the smallest currency unit.
    pub price_cents: i64,

    /// ISO 4217 currency code for charges.
    pub currency: String,

    /// Deadline for any single payment-gateway call.
    ///
    /// Elapsed calls surface as `GatewayUnavailable`, never hang the
    /// caller.
    pub gateway_timeout: Duration,

    /// PayPal credentials and environment.
    pub paypal: PayPalConfig,
}

/// PayPal REST credentials.
#[derive(Debug, Clone, Default)]
pub struct PayPalConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,

    /// Live environment when true, sandbox otherwise.
    pub live: bool,
}

impl PayPalConfig {
    /// Whether usable credentials are present.
    ///
    /// The deployment template ships `<to be added later>` placeholders;
    /// those do not count as configured.
    pub fn is_configured(&self) -> bool {
        let usable = |v: &Option<String>| {
            v.as_deref()
                .map(|s| !s.is_empty() && !s.starts_with('<'))
                .unwrap_or(false)
        };
        usable(&self.client_id) && usable(&self.client_secret)
    }

    /// REST API base URL for the configured environment.
    pub fn api_base(&self) -> &'static str {
        if self.live {
            "https://api-m.paypal.com"
        } else {
            "https://api-m.sandbox.paypal.com"
        }
    }
}

impl FulfillmentConfig {
    /// Load configuration from environment variables.
    ///
    /// ## Variables
    /// - `TEST_MODE` - "true" selects the mock gateway (default: false)
    /// - `ORDER_PRICE_CENTS` - price per reading (default: 1999)
    /// - `ORDER_CURRENCY` - currency code (default: EUR)
    /// - `GATEWAY_TIMEOUT_SECS` - gateway call deadline (default: 10)
    /// - `PAYPAL_CLIENT_ID` / `PAYPAL_CLIENT_SECRET` - REST credentials
    /// - `PAYPAL_ENV` - "live" or "sandbox" (default: sandbox)
    pub fn load() -> Result<Self, ConfigError> {
        let config = FulfillmentConfig {
            test_mode: env::var("TEST_MODE")
                .map(|v| v == "true")
                .unwrap_or(false),

            price_cents: env::var("ORDER_PRICE_CENTS")
                .unwrap_or_else(|_| "1999".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("ORDER_PRICE_CENTS".to_string()))?,

            currency: env::var("ORDER_CURRENCY").unwrap_or_else(|_| "EUR".to_string()),

            gateway_timeout: Duration::from_secs(
                env::var("GATEWAY_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("GATEWAY_TIMEOUT_SECS".to_string()))?,
            ),

            paypal: PayPalConfig {
                client_id: env::var("PAYPAL_CLIENT_ID").ok(),
                client_secret: env::var("PAYPAL_CLIENT_SECRET").ok(),
                live: env::var("PAYPAL_ENV")
                    .map(|v| v == "live")
                    .unwrap_or(false),
            },
        };

        if config.price_cents <= 0 {
            return Err(ConfigError::InvalidValue("ORDER_PRICE_CENTS".to_string()));
        }

        Ok(config)
    }

    /// Test-mode configuration for use in tests.
    pub fn for_tests() -> Self {
        FulfillmentConfig {
            test_mode: true,
            price_cents: 1999,
            currency: "EUR".to_string(),
            gateway_timeout: Duration::from_secs(2),
            paypal: PayPalConfig::default(),
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

// =============================================================================
// Unit Tests
// =============================================================================
