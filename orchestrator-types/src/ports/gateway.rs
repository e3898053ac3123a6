//! Gateway client port.
//!
//! One implementation per provider integration (Checkout.com, Stripe, ...).
//! Retries and timeouts for the network call live behind this trait.

use serde::{Deserialize, Serialize};

use crate::domain::{CurrencyCode, MethodId, OperationId, ProviderId};
use crate::error::GatewayError;

/// Context forwarded to the gateway with each submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttemptMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<OperationId>,
    /// Ask the gateway to run a 3-D Secure challenge
    pub challenge_3ds: bool,
    /// 1-indexed attempt number within the checkout
    pub attempt: usize,
}

/// Raw gateway answer; only the decline code is interpreted by the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayResponse {
    pub approved: bool,
    pub raw: serde_json::Value,
}

/// Port trait for provider gateways.
#[async_trait::async_trait]
pub trait GatewayClient: Send + Sync {
    /// Submits a payment to `provider`. The amount is in the provider's minor units.
    async fn submit(
        &self,
        provider: &ProviderId,
        amount_minor_units: i64,
        currency: &CurrencyCode,
        method: &MethodId,
        metadata: &AttemptMetadata,
    ) -> Result<GatewayResponse, GatewayError>;

    /// Extracts the provider's raw decline code from a response.
    fn decline_code(&self, provider: &ProviderId, response: &GatewayResponse) -> Option<String>;
}
