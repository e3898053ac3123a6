//! Candidate provider selection.

use std::sync::Arc;

use orchestrator_types::{
    Catalog, CountryCode, CurrencyCode, Eligibility, Environment, MethodId, ProviderDefinition,
    ProviderRole,
};

use crate::eligibility::MethodEligibility;

/// A provider that passed selection, with the eligibility it was selected under.
#[derive(Debug, Clone, Copy)]
pub struct SelectedProvider<'a> {
    pub provider: &'a ProviderDefinition,
    pub eligibility: Eligibility,
}

/// Filters the catalogue down to the providers that can take an attempt.
///
/// A provider qualifies when it is active, has the requested role, runs in
/// the environment, has a currency rule for the currency and offers the
/// method in the country. Configuration order is kept as is; callers that
/// need a preference order declare providers in that order.
#[derive(Debug, Clone)]
pub struct ProviderSelector {
    catalog: Arc<Catalog>,
    eligibility: MethodEligibility,
}

impl ProviderSelector {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            eligibility: MethodEligibility::new(catalog.clone()),
            catalog,
        }
    }

    /// Ordered candidates. An empty list means no provider qualifies.
    pub fn select_candidates(
        &self,
        role: ProviderRole,
        environment: Environment,
        currency: &CurrencyCode,
        method: &MethodId,
        country: &CountryCode,
    ) -> Vec<&ProviderDefinition> {
        self.select(role, environment, currency, method, country)
            .into_iter()
            .map(|s| s.provider)
            .collect()
    }

    /// Like [`select_candidates`](Self::select_candidates), keeping each eligibility.
    pub fn select(
        &self,
        role: ProviderRole,
        environment: Environment,
        currency: &CurrencyCode,
        method: &MethodId,
        country: &CountryCode,
    ) -> Vec<SelectedProvider<'_>> {
        let selected: Vec<_> = self
            .catalog
            .providers()
            .iter()
            .filter(|p| p.is_active && p.role == role && p.runs_in(environment))
            .filter(|p| {
                let supported = p.supports_currency(currency);
                if !supported {
                    tracing::debug!(
                        provider = %p.id,
                        currency = %currency,
                        "dropped: currency not supported"
                    );
                }
                supported
            })
            .filter_map(|p| {
                let eligibility = self.eligibility.is_offered(&p.id, method, country);
                if !eligibility.is_offered() {
                    tracing::debug!(
                        provider = %p.id,
                        method = %method,
                        country = %country,
                        "dropped: method excluded"
                    );
                    return None;
                }
                Some(SelectedProvider {
                    provider: p,
                    eligibility,
                })
            })
            .collect();

        tracing::debug!(
            role = %role,
            environment = %environment,
            candidates = selected.len(),
            "provider selection finished"
        );
        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn ids(providers: &[&ProviderDefinition]) -> Vec<String> {
        providers.iter().map(|p| p.id.to_string()).collect()
    }

    fn select(
        role: ProviderRole,
        env: Environment,
        currency: &str,
        method: &str,
        country: &str,
    ) -> Vec<String> {
        let selector = ProviderSelector::new(fixtures::catalog());
        ids(&selector.select_candidates(
            role,
            env,
            &CurrencyCode::new(currency).unwrap(),
            &MethodId::new(method),
            &CountryCode::new(country).unwrap(),
        ))
    }

    #[test]
    fn test_production_excludes_staging_only_provider() {
        // stripe is active and main but not enabled in production
        assert_eq!(
            select(ProviderRole::Main, Environment::Production, "USD", "visa", "us"),
            vec!["checkout"]
        );
    }

    #[test]
    fn test_declaration_order_kept() {
        assert_eq!(
            select(ProviderRole::Main, Environment::Staging, "USD", "visa", "us"),
            vec!["checkout", "stripe"]
        );
    }

    #[test]
    fn test_fallback_role() {
        assert_eq!(
            select(ProviderRole::Fallback, Environment::Production, "USD", "visa", "us"),
            vec!["worldpay"]
        );
        assert_eq!(
            select(ProviderRole::Fallback, Environment::Production, "BRL", "visa", "br"),
            vec!["appmax"]
        );
    }

    #[test]
    fn test_excluded_country_yields_empty_list() {
        let selected = select(ProviderRole::Main, Environment::Production, "BRL", "visa", "br");
        assert!(selected.is_empty());
    }

    #[test]
    fn test_inactive_method_yields_empty_list() {
        let selected = select(ProviderRole::Main, Environment::Production, "USD", "amex", "us");
        assert!(selected.is_empty());
    }

    #[test]
    fn test_unsupported_currency_drops_provider() {
        // appmax only converts BRL
        let selected = select(ProviderRole::Fallback, Environment::Staging, "USD", "elo", "br");
        assert!(selected.is_empty());
    }

    #[test]
    fn test_inactive_provider_never_selected() {
        for env in [Environment::Development, Environment::Staging, Environment::Production] {
            let selected = select(ProviderRole::Main, env, "USD", "visa", "us");
            assert!(!selected.contains(&"bitgo".to_string()));
        }
    }

    #[test]
    fn test_eligibility_kept_with_selection() {
        let selector = ProviderSelector::new(fixtures::catalog());
        let selected = selector.select(
            ProviderRole::Main,
            Environment::Staging,
            &CurrencyCode::new("EUR").unwrap(),
            &MethodId::new("visa"),
            &CountryCode::new("de").unwrap(),
        );
        assert_eq!(selected.len(), 2);
        assert!(selected.iter().all(|s| s.eligibility == Eligibility::OfferedWith3ds));
    }
}
