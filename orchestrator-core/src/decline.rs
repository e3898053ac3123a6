//! Decline normalization.
//!
//! Translates a provider's raw decline code into the internal error taxonomy
//! and says whether another provider may be tried:
//! - **Mapped**: the provider's i18n table knows the code.
//! - **Fallback-eligible**: the provider lists the code in its fallback set.
//!
//! The two tables are independent, so a code can be mapped and terminal,
//! unmapped and fallback-eligible (Stripe style), both, or neither.

use std::sync::Arc;

use orchestrator_types::{Catalog, GENERIC_DECLINE, NormalizedDecline, ProviderId};

#[derive(Debug, Clone)]
pub struct ProviderErrorNormalizer {
    catalog: Arc<Catalog>,
}

impl ProviderErrorNormalizer {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    /// Normalizes `raw_code` as reported by `provider`.
    ///
    /// Unknown providers and unmapped codes fall through to [`GENERIC_DECLINE`].
    pub fn normalize(&self, provider: &ProviderId, raw_code: &str) -> NormalizedDecline {
        let raw_code = raw_code.trim();
        let Some(definition) = self.catalog.provider(provider) else {
            tracing::debug!(
                provider = %provider,
                "decline from a provider missing from the catalogue"
            );
            return generic(false);
        };

        let table = &definition.error_codes;
        let is_fallback_eligible = table.is_fallback_eligible(raw_code);
        match table.internal_code(raw_code) {
            Some(internal_code) => NormalizedDecline {
                internal_code: internal_code.to_string(),
                is_fallback_eligible,
                is_mapped: true,
            },
            None => generic(is_fallback_eligible),
        }
    }
}

fn generic(is_fallback_eligible: bool) -> NormalizedDecline {
    NormalizedDecline {
        internal_code: GENERIC_DECLINE.to_string(),
        is_fallback_eligible,
        is_mapped: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn normalizer() -> ProviderErrorNormalizer {
        ProviderErrorNormalizer::new(fixtures::catalog())
    }

    #[test]
    fn test_code_in_both_tables() {
        let decline = normalizer().normalize(&ProviderId::from("checkout"), "20005");
        assert_eq!(decline.internal_code, "api.ecode.card_not_functioning");
        assert!(decline.is_fallback_eligible);
        assert!(decline.is_mapped);
    }

    #[test]
    fn test_mapped_but_terminal() {
        let decline = normalizer().normalize(&ProviderId::from("checkout"), "20051");
        assert_eq!(decline.internal_code, "api.ecode.insufficient_funds");
        assert!(!decline.is_fallback_eligible);
    }

    #[test]
    fn test_fallback_code_without_mapping() {
        let decline = normalizer().normalize(&ProviderId::from("stripe"), "card_declined");
        assert_eq!(decline.internal_code, GENERIC_DECLINE);
        assert!(decline.is_fallback_eligible);
        assert!(!decline.is_mapped);
    }

    #[test]
    fn test_unknown_code_is_generic_and_terminal() {
        let decline = normalizer().normalize(&ProviderId::from("checkout"), "99999");
        assert_eq!(decline.internal_code, GENERIC_DECLINE);
        assert!(!decline.is_fallback_eligible);
    }

    #[test]
    fn test_tables_are_per_provider() {
        // "20005" means nothing to Stripe
        let decline = normalizer().normalize(&ProviderId::from("stripe"), "20005");
        assert_eq!(decline.internal_code, GENERIC_DECLINE);
        assert!(!decline.is_fallback_eligible);
    }

    #[test]
    fn test_unknown_provider_is_generic() {
        let decline = normalizer().normalize(&ProviderId::from("kraken"), "20005");
        assert_eq!(decline.internal_code, GENERIC_DECLINE);
        assert!(!decline.is_fallback_eligible);
    }

    #[test]
    fn test_surrounding_whitespace_ignored() {
        let decline = normalizer().normalize(&ProviderId::from("checkout"), " 20054\n");
        assert_eq!(decline.internal_code, "api.ecode.card_expired");
    }
}
