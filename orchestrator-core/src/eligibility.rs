//! Method eligibility per provider and country.

use std::sync::Arc;

use orchestrator_types::{Catalog, CountryCode, Eligibility, MethodId, ProviderId};

/// Decides whether a provider offers a method in a country, and with 3DS or not.
///
/// Decision order:
/// 1. method unknown or globally inactive: excluded
/// 2. provider unknown or has no rule for the method: excluded
/// 3. country in `excl`: excluded
/// 4. country in `+3ds`: offered with 3DS
/// 5. country in `-3ds`: offered without 3DS
/// 6. otherwise: excluded
///
/// `+3ds` is checked before `-3ds`, so a `*` in `-3ds` never shadows a
/// specific `+3ds` entry.
#[derive(Debug, Clone)]
pub struct MethodEligibility {
    catalog: Arc<Catalog>,
}

impl MethodEligibility {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub fn is_offered(
        &self,
        provider: &ProviderId,
        method: &MethodId,
        country: &CountryCode,
    ) -> Eligibility {
        match self.catalog.method(method) {
            Some(m) if m.is_active => {}
            Some(_) => {
                tracing::debug!(method = %method, "method is globally inactive");
                return Eligibility::Excluded;
            }
            None => {
                tracing::debug!(method = %method, "unknown method");
                return Eligibility::Excluded;
            }
        }

        let Some(rule) = self
            .catalog
            .provider(provider)
            .and_then(|p| p.methods.rule(method))
        else {
            return Eligibility::Excluded;
        };

        if rule.is_excluded(country) {
            Eligibility::Excluded
        } else if rule.with_3ds.matches(country) {
            Eligibility::OfferedWith3ds
        } else if rule.without_3ds.matches(country) {
            Eligibility::OfferedNo3ds
        } else {
            Eligibility::Excluded
        }
    }
}
