//! # Mock Payment Gateway
//!
//! Test-mode gateway that fabricates payment handles locally and
//! confirms captures for exactly the handles it issued. Models the
//! "mock payment" flow the test checkout uses instead of PayPal.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use pleyazul_core::Order;

use super::{Capture, GatewayResult, PaymentGateway, PaymentHandle};

/// Prefix for fabricated payment references.
const MOCK_REFERENCE_PREFIX: &str = "MOCK-";

/// Locally-confirming payment gateway for test mode.
///
/// Captures succeed only for references this instance fabricated, so a
/// mistyped reference in a test run fails loudly instead of silently
/// confirming.
#[derive(Debug, Default)]
pub struct MockGateway {
    issued: Mutex<HashSet<String>>,
}

impl MockGateway {
    /// Creates a new mock gateway with no outstanding handles.
    pub fn new() -> Self {
        MockGateway::default()
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn create_payment(&self, order: &Order) -> GatewayResult<PaymentHandle> {
        let reference = format!("{}{}", MOCK_REFERENCE_PREFIX, Uuid::new_v4());

        self.issued
            .lock()
            .expect("mock gateway mutex poisoned")
            .insert(reference.clone());

        info!(order_id = %order.id, reference = %reference, "Mock payment created");

        Ok(PaymentHandle {
            provider_order_id: reference,
            approval_url: None,
        })
    }

    async fn capture_payment(&self, reference: &str) -> GatewayResult<Capture> {
        let known = self
            .issued
            .lock()
            .expect("mock gateway mutex poisoned")
            .contains(reference);

        info!(reference = %reference, confirmed = known, "Mock payment capture");

        Ok(Capture {
            confirmed: known,
            capture_id: known.then(|| format!("{}CAPTURE-{}", MOCK_REFERENCE_PREFIX, reference)),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
