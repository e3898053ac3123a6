//! Amount-based fraud gating.

use std::sync::Arc;

use orchestrator_types::{Catalog, FraudDecision, FraudLimits, ProfileClass, ProviderId};
use rust_decimal::Decimal;

/// Gates an attempt on the amount, using the provider's per-profile thresholds.
///
/// Thresholds are inclusive and checked in a fixed order, whatever their
/// numeric ordering: refuse, then fallback, then 3DS.
#[derive(Debug, Clone)]
pub struct FraudLimitPolicy {
    catalog: Arc<Catalog>,
}

impl FraudLimitPolicy {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    /// Evaluates `amount` (major units) for `profile` against `provider`'s limits.
    ///
    /// A provider or profile without configured limits allows the attempt.
    pub fn evaluate(
        &self,
        provider: &ProviderId,
        profile: ProfileClass,
        amount: Decimal,
    ) -> FraudDecision {
        let limits = self
            .catalog
            .provider(provider)
            .and_then(|p| p.fraud_limits.limits(profile));
        let Some(limits) = limits else {
            tracing::debug!(provider = %provider, profile = %profile, "no fraud limits configured");
            return FraudDecision::Allow;
        };

        let decision = decide(limits, amount);
        if decision != FraudDecision::Allow {
            tracing::info!(
                provider = %provider,
                profile = %profile,
                amount = %amount,
                decision = %decision,
                "fraud limit reached"
            );
        }
        decision
    }
}

/// Applies one threshold set to an amount.
pub fn decide(limits: &FraudLimits, amount: Decimal) -> FraudDecision {
    if amount >= limits.refuse {
        FraudDecision::Refuse
    } else if amount >= limits.fallback {
        FraudDecision::RouteFallback
    } else if amount >= limits.three_ds {
        FraudDecision::Require3ds
    } else {
        FraudDecision::Allow
    }
}
