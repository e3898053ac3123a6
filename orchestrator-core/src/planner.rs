//! Attempt planning: fraud gate, candidate order and decline follow-up.

use std::sync::Arc;

use orchestrator_types::{
    AttemptRequest, Catalog, CurrencyCode, FraudDecision, NormalizedDecline, ProviderId,
    ProviderRole, RoutingError,
};
use serde::Serialize;

use crate::currency::CurrencyRules;
use crate::decline::ProviderErrorNormalizer;
use crate::fraud::FraudLimitPolicy;
use crate::selector::{ProviderSelector, SelectedProvider};

/// One provider to try, with the amount already in its wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedAttempt {
    pub provider: ProviderId,
    pub role: ProviderRole,
    pub amount_minor_units: i64,
    pub currency: CurrencyCode,
    pub challenge_3ds: bool,
}

/// The ordered attempts for a purchase. Empty when refused or when no
/// provider qualifies.
#[derive(Debug, Clone, Serialize)]
pub struct AttemptPlan {
    pub request: AttemptRequest,
    pub decision: FraudDecision,
    pub attempts: Vec<PlannedAttempt>,
}

impl AttemptPlan {
    pub fn is_refused(&self) -> bool {
        self.decision == FraudDecision::Refuse
    }

    fn position(&self, provider: &ProviderId) -> Option<usize> {
        self.attempts.iter().position(|a| &a.provider == provider)
    }
}

/// What to do after a provider declined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeclineOutcome {
    Retry {
        decline: NormalizedDecline,
        next: PlannedAttempt,
    },
    Terminal {
        decline: NormalizedDecline,
    },
}

impl DeclineOutcome {
    pub fn decline(&self) -> &NormalizedDecline {
        match self {
            DeclineOutcome::Retry { decline, .. } | DeclineOutcome::Terminal { decline } => decline,
        }
    }
}

/// Combines selection, fraud gating and currency conversion into a plan.
///
/// The fraud decision is taken against the lead candidate's limits (first
/// main provider, else first fallback provider):
/// - `REFUSE`: no attempts
/// - `ROUTE_FALLBACK`: fallback providers only
/// - `REQUIRE_3DS`: main providers, each with a forced challenge
/// - `ALLOW`: main providers
///
/// When no main provider qualifies the plan starts on fallback providers.
#[derive(Debug, Clone)]
pub struct AttemptPlanner {
    selector: ProviderSelector,
    fraud: FraudLimitPolicy,
    currency: CurrencyRules,
    normalizer: ProviderErrorNormalizer,
}

impl AttemptPlanner {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            selector: ProviderSelector::new(catalog.clone()),
            fraud: FraudLimitPolicy::new(catalog.clone()),
            currency: CurrencyRules::new(catalog.clone()),
            normalizer: ProviderErrorNormalizer::new(catalog),
        }
    }

    pub fn plan(&self, request: &AttemptRequest) -> Result<AttemptPlan, RoutingError> {
        let main = self.candidates(request, ProviderRole::Main);
        let fallback = self.candidates(request, ProviderRole::Fallback);

        let decision = main
            .first()
            .or(fallback.first())
            .map(|lead| self.fraud.evaluate(&lead.provider.id, request.profile, request.amount))
            .unwrap_or(FraudDecision::Allow);

        let (selected, force_3ds) = match decision {
            FraudDecision::Refuse => (Vec::new(), false),
            FraudDecision::RouteFallback => (fallback, false),
            FraudDecision::Require3ds if main.is_empty() => (fallback, true),
            FraudDecision::Require3ds => (main, true),
            FraudDecision::Allow if main.is_empty() => (fallback, false),
            FraudDecision::Allow => (main, false),
        };

        let attempts = selected
            .iter()
            .map(|s| self.attempt(request, s, force_3ds))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!(
            method = %request.method,
            country = %request.country,
            currency = %request.currency,
            decision = %decision,
            attempts = attempts.len(),
            "attempt plan built"
        );

        Ok(AttemptPlan {
            request: request.clone(),
            decision,
            attempts,
        })
    }

    /// Decides whether to move on after `provider` declined with `raw_code`.
    ///
    /// Fallback-eligible declines continue with the rest of the plan. Once a
    /// plan of main providers is exhausted, fallback providers not yet tried
    /// are appended in configuration order. A refused plan never continues.
    pub fn after_decline(
        &self,
        plan: &AttemptPlan,
        provider: &ProviderId,
        raw_code: &str,
    ) -> Result<DeclineOutcome, RoutingError> {
        let decline = self.normalizer.normalize(provider, raw_code);
        if !decline.is_mapped {
            tracing::warn!(provider = %provider, code = raw_code, "unmapped decline code");
        }
        if plan.is_refused() {
            tracing::warn!(provider = %provider, "decline reported against a refused plan");
            return Ok(DeclineOutcome::Terminal { decline });
        }
        if !decline.is_fallback_eligible {
            return Ok(DeclineOutcome::Terminal { decline });
        }

        let extension = self.extension(plan);
        let force_3ds = plan.decision == FraudDecision::Require3ds;
        let extend =
            |selected: &SelectedProvider<'_>| self.attempt(&plan.request, selected, force_3ds);

        let next = match plan.position(provider) {
            Some(i) => match plan.attempts.get(i + 1) {
                Some(next) => Some(Ok(next.clone())),
                None => extension.first().map(extend),
            },
            None => extension
                .iter()
                .position(|s| &s.provider.id == provider)
                .and_then(|i| extension.get(i + 1))
                .map(extend),
        };

        match next.transpose()? {
            Some(next) => Ok(DeclineOutcome::Retry { decline, next }),
            None => Ok(DeclineOutcome::Terminal { decline }),
        }
    }

    /// Fallback providers appended after a main-provider plan.
    fn extension(&self, plan: &AttemptPlan) -> Vec<SelectedProvider<'_>> {
        if plan.attempts.iter().any(|a| a.role == ProviderRole::Fallback) {
            return Vec::new();
        }
        self.candidates(&plan.request, ProviderRole::Fallback)
            .into_iter()
            .filter(|s| plan.position(&s.provider.id).is_none())
            .collect()
    }

    fn candidates(
        &self,
        request: &AttemptRequest,
        role: ProviderRole,
    ) -> Vec<SelectedProvider<'_>> {
        self.selector.select(
            role,
            request.environment,
            &request.currency,
            &request.method,
            &request.country,
        )
    }

    fn attempt(
        &self,
        request: &AttemptRequest,
        selected: &SelectedProvider<'_>,
        force_3ds: bool,
    ) -> Result<PlannedAttempt, RoutingError> {
        let provider = &selected.provider.id;
        Ok(PlannedAttempt {
            provider: provider.clone(),
            role: selected.provider.role,
            amount_minor_units: self
                .currency
                .to_minor_units(provider, &request.currency, request.amount)?,
            currency: request.currency.clone(),
            challenge_3ds: force_3ds || selected.eligibility.requires_3ds(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use orchestrator_types::{CatalogConfig, CountryCode, Environment, MethodId, ProfileClass};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn request(env: Environment, currency: &str, country: &str, amount: Decimal) -> AttemptRequest {
        AttemptRequest {
            environment: env,
            currency: CurrencyCode::new(currency).unwrap(),
            method: MethodId::new("visa"),
            country: CountryCode::new(country).unwrap(),
            profile: ProfileClass::Default,
            amount,
        }
    }

    fn providers(plan: &AttemptPlan) -> Vec<&str> {
        plan.attempts.iter().map(|a| a.provider.as_str()).collect()
    }

    fn planner() -> AttemptPlanner {
        AttemptPlanner::new(fixtures::catalog())
    }

    fn provider_json(id: &str, is_main: bool) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "environments": ["production"],
            "is_active": true,
            "is_main": is_main,
            "data": {
                "fallback_error_codes": ["soft"],
                "currency_rules": {"*": {"multiplier": 100}},
                "fraud_limits": {"default": {"3ds": 500, "fallback": 800, "refuse": 1000}},
                "methods": {"main": {"visa": {"-3ds": ["*"]}}}
            }
        })
    }

    /// One main provider and two fallbacks, all sharing one fraud table.
    fn two_fallback_planner() -> AttemptPlanner {
        let json = serde_json::json!({
            "providers": [
                provider_json("main1", true),
                provider_json("fb1", false),
                provider_json("fb2", false),
            ]
        });
        let config: CatalogConfig = serde_json::from_value(json).unwrap();
        AttemptPlanner::new(Arc::new(Catalog::from_config(config).unwrap()))
    }

    #[test]
    fn test_allowed_plan_uses_main_providers() {
        let plan = planner()
            .plan(&request(Environment::Staging, "USD", "us", dec!(49.99)))
            .unwrap();
        assert_eq!(plan.decision, FraudDecision::Allow);
        assert_eq!(providers(&plan), vec!["checkout", "stripe"]);
        assert_eq!(plan.attempts[0].amount_minor_units, 4999);
        assert!(!plan.attempts[0].challenge_3ds);
    }

    #[test]
    fn test_eligibility_3ds_carried_into_attempt() {
        let plan = planner()
            .plan(&request(Environment::Production, "EUR", "de", dec!(10)))
            .unwrap();
        assert_eq!(providers(&plan), vec!["checkout"]);
        assert!(plan.attempts[0].challenge_3ds);
    }

    #[test]
    fn test_require_3ds_forces_challenge() {
        let plan = planner()
            .plan(&request(Environment::Production, "USD", "us", dec!(150)))
            .unwrap();
        assert_eq!(plan.decision, FraudDecision::Require3ds);
        assert!(plan.attempts.iter().all(|a| a.challenge_3ds));
    }

    #[test]
    fn test_route_fallback_skips_main() {
        let plan = planner()
            .plan(&request(Environment::Production, "USD", "us", dec!(750)))
            .unwrap();
        assert_eq!(plan.decision, FraudDecision::RouteFallback);
        assert_eq!(providers(&plan), vec!["worldpay"]);
        assert_eq!(plan.attempts[0].role, ProviderRole::Fallback);
    }

    #[test]
    fn test_refused_plan_is_empty() {
        let plan = planner()
            .plan(&request(Environment::Production, "USD", "us", dec!(2000)))
            .unwrap();
        assert!(plan.is_refused());
        assert!(plan.attempts.is_empty());
    }

    #[test]
    fn test_no_main_candidate_starts_on_fallback() {
        // checkout excludes br, appmax covers it
        let plan = planner()
            .plan(&request(Environment::Production, "BRL", "br", dec!(80)))
            .unwrap();
        assert_eq!(providers(&plan), vec!["appmax"]);
        assert_eq!(plan.attempts[0].amount_minor_units, 8000);
    }

    #[test]
    fn test_zero_decimal_wire_amount() {
        let plan = planner()
            .plan(&request(Environment::Production, "JPY", "jp", dec!(50)))
            .unwrap();
        assert_eq!(plan.attempts[0].amount_minor_units, 50);
    }

    #[test]
    fn test_soft_decline_moves_to_next_main() {
        let planner = planner();
        let plan = planner
            .plan(&request(Environment::Staging, "USD", "us", dec!(20)))
            .unwrap();
        let outcome = planner
            .after_decline(&plan, &ProviderId::from("checkout"), "20005")
            .unwrap();
        match outcome {
            DeclineOutcome::Retry { decline, next } => {
                assert_eq!(decline.internal_code, "api.ecode.card_not_functioning");
                assert_eq!(next.provider.as_str(), "stripe");
            }
            other => panic!("expected retry, got {other:?}"),
        }
    }

    #[test]
    fn test_exhausted_main_plan_falls_back() {
        let planner = planner();
        let plan = planner
            .plan(&request(Environment::Production, "USD", "us", dec!(20)))
            .unwrap();
        let outcome = planner
            .after_decline(&plan, &ProviderId::from("checkout"), "20012")
            .unwrap();
        let DeclineOutcome::Retry { next, .. } = outcome else {
            panic!("expected retry");
        };
        assert_eq!(next.provider.as_str(), "worldpay");
        assert_eq!(next.role, ProviderRole::Fallback);
        // worldpay only offers visa with 3DS
        assert!(next.challenge_3ds);
    }

    #[test]
    fn test_appended_fallback_exhausts() {
        let planner = planner();
        let plan = planner
            .plan(&request(Environment::Production, "USD", "us", dec!(20)))
            .unwrap();
        let outcome = planner
            .after_decline(&plan, &ProviderId::from("worldpay"), "REFUSED_5")
            .unwrap();
        assert!(matches!(outcome, DeclineOutcome::Terminal { .. }));
    }

    #[test]
    fn test_hard_decline_is_terminal() {
        let planner = planner();
        let plan = planner
            .plan(&request(Environment::Staging, "USD", "us", dec!(20)))
            .unwrap();
        let outcome = planner
            .after_decline(&plan, &ProviderId::from("checkout"), "20051")
            .unwrap();
        assert!(matches!(outcome, DeclineOutcome::Terminal { .. }));
        assert_eq!(outcome.decline().internal_code, "api.ecode.insufficient_funds");
    }

    #[test]
    fn test_fallback_plan_does_not_extend() {
        let planner = planner();
        let plan = planner
            .plan(&request(Environment::Production, "USD", "us", dec!(750)))
            .unwrap();
        let outcome = planner
            .after_decline(&plan, &ProviderId::from("worldpay"), "REFUSED_5")
            .unwrap();
        assert!(matches!(
            outcome,
            DeclineOutcome::Terminal { decline } if decline.is_fallback_eligible
        ));
    }

    #[test]
    fn test_refused_plan_never_retries() {
        let planner = two_fallback_planner();
        let plan = planner
            .plan(&request(Environment::Production, "USD", "us", dec!(5000)))
            .unwrap();
        assert!(plan.is_refused());
        assert!(plan.attempts.is_empty());

        for provider in ["main1", "fb1", "fb2"] {
            let outcome = planner
                .after_decline(&plan, &ProviderId::from(provider), "soft")
                .unwrap();
            assert!(matches!(
                outcome,
                DeclineOutcome::Terminal { decline } if decline.is_fallback_eligible
            ));
        }
    }

    #[test]
    fn test_allowed_plan_walks_both_fallbacks() {
        let planner = two_fallback_planner();
        let plan = planner
            .plan(&request(Environment::Production, "USD", "us", dec!(50)))
            .unwrap();
        assert_eq!(providers(&plan), vec!["main1"]);

        let outcome = planner
            .after_decline(&plan, &ProviderId::from("fb1"), "soft")
            .unwrap();
        let DeclineOutcome::Retry { next, .. } = outcome else {
            panic!("expected retry");
        };
        assert_eq!(next.provider.as_str(), "fb2");
    }
}
