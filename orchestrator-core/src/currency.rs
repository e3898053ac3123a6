//! Conversion between decimal amounts and provider wire amounts.

use std::sync::Arc;

use orchestrator_types::{Catalog, CurrencyCode, Money, ProviderId, RoutingError};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Per-provider minor-unit rules.
///
/// The multiplier comes from the provider's exact currency entry, then its
/// `*` entry. There is no built-in default: a provider that lists neither
/// does not support the currency.
#[derive(Debug, Clone)]
pub struct CurrencyRules {
    catalog: Arc<Catalog>,
}

impl CurrencyRules {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    /// Multiplier applied by `provider` for `currency`.
    pub fn multiplier(
        &self,
        provider: &ProviderId,
        currency: &CurrencyCode,
    ) -> Result<u32, RoutingError> {
        self.catalog
            .provider(provider)
            .ok_or_else(|| RoutingError::UnknownProvider(provider.clone()))?
            .currency_rules
            .multiplier(currency)
            .ok_or_else(|| RoutingError::UnsupportedCurrency {
                provider: provider.clone(),
                currency: currency.clone(),
            })
    }

    /// `round(amount * multiplier)`, halves away from zero.
    pub fn to_minor_units(
        &self,
        provider: &ProviderId,
        currency: &CurrencyCode,
        amount: Decimal,
    ) -> Result<i64, RoutingError> {
        let multiplier = self.multiplier(provider, currency)?;
        amount
            .checked_mul(Decimal::from(multiplier))
            .map(|scaled| scaled.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
            .and_then(|scaled| scaled.to_i64())
            .ok_or_else(|| RoutingError::AmountOutOfRange(amount.to_string()))
    }

    /// Same as [`to_minor_units`](Self::to_minor_units), wrapped with its currency.
    pub fn to_money(
        &self,
        provider: &ProviderId,
        currency: &CurrencyCode,
        amount: Decimal,
    ) -> Result<Money, RoutingError> {
        let minor = self.to_minor_units(provider, currency, amount)?;
        Ok(Money::new(minor, currency.clone()))
    }

    /// Exact division of a wire amount by the multiplier.
    pub fn to_decimal(
        &self,
        provider: &ProviderId,
        currency: &CurrencyCode,
        minor_units: i64,
    ) -> Result<Decimal, RoutingError> {
        let multiplier = self.multiplier(provider, currency)?;
        Ok((Decimal::from(minor_units) / Decimal::from(multiplier)).normalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use rust_decimal_macros::dec;

    fn rules() -> CurrencyRules {
        CurrencyRules::new(fixtures::catalog())
    }

    fn code(c: &str) -> CurrencyCode {
        CurrencyCode::new(c).unwrap()
    }

    #[test]
    fn test_round_trip_at_multiplier_resolution() {
        let rules = rules();
        let checkout = ProviderId::from("checkout");
        for currency in ["USD", "EUR", "BHD", "KWD"] {
            for amount in [dec!(0), dec!(0.01), dec!(999999.99)] {
                let minor = rules.to_minor_units(&checkout, &code(currency), amount).unwrap();
                let back = rules.to_decimal(&checkout, &code(currency), minor).unwrap();
                assert_eq!(back, amount, "{currency} {amount}");
            }
        }
    }

    #[test]
    fn test_zero_decimal_currencies_round_to_whole_units() {
        let rules = rules();
        let checkout = ProviderId::from("checkout");
        for currency in ["JPY", "KRW"] {
            let minor = rules.to_minor_units(&checkout, &code(currency), dec!(999999.99)).unwrap();
            assert_eq!(minor, 1_000_000);
            assert_eq!(rules.to_decimal(&checkout, &code(currency), minor).unwrap(), dec!(1000000));
            assert_eq!(rules.to_minor_units(&checkout, &code(currency), dec!(0.01)).unwrap(), 0);
        }
    }

    #[test]
    fn test_exact_entries_win_over_wildcard() {
        let rules = rules();
        let checkout = ProviderId::from("checkout");
        assert_eq!(rules.multiplier(&checkout, &code("JPY")).unwrap(), 1);
        assert_eq!(rules.multiplier(&checkout, &code("KRW")).unwrap(), 1);
        assert_eq!(rules.multiplier(&checkout, &code("BHD")).unwrap(), 1000);
        assert_eq!(rules.multiplier(&checkout, &code("KWD")).unwrap(), 1000);
        assert_eq!(rules.multiplier(&checkout, &code("USD")).unwrap(), 100);

        assert_eq!(rules.to_minor_units(&checkout, &code("JPY"), dec!(1500)).unwrap(), 1500);
        assert_eq!(rules.to_minor_units(&checkout, &code("KWD"), dec!(12.345)).unwrap(), 12345);
    }

    #[test]
    fn test_half_rounds_away_from_zero() {
        let rules = rules();
        let checkout = ProviderId::from("checkout");
        assert_eq!(rules.to_minor_units(&checkout, &code("USD"), dec!(10.005)).unwrap(), 1001);
        assert_eq!(rules.to_minor_units(&checkout, &code("USD"), dec!(-10.005)).unwrap(), -1001);
        assert_eq!(rules.to_minor_units(&checkout, &code("JPY"), dec!(0.5)).unwrap(), 1);
    }

    #[test]
    fn test_unsupported_currency_is_an_error() {
        let rules = rules();
        let result = rules.to_minor_units(&ProviderId::from("appmax"), &code("USD"), dec!(10));
        assert!(matches!(result, Err(RoutingError::UnsupportedCurrency { .. })));
        assert!(rules.to_decimal(&ProviderId::from("appmax"), &code("USD"), 1000).is_err());
    }

    #[test]
    fn test_unknown_provider() {
        let result = rules().multiplier(&ProviderId::from("kraken"), &code("USD"));
        assert!(matches!(result, Err(RoutingError::UnknownProvider(_))));
    }

    #[test]
    fn test_overflow_reported() {
        let result = rules().to_minor_units(
            &ProviderId::from("checkout"),
            &code("KWD"),
            Decimal::MAX,
        );
        assert!(matches!(result, Err(RoutingError::AmountOutOfRange(_))));
    }

    #[test]
    fn test_to_money() {
        let money = rules()
            .to_money(&ProviderId::from("checkout"), &code("EUR"), dec!(19.99))
            .unwrap();
        assert_eq!(money.amount(), 1999);
        assert_eq!(money.currency().as_str(), "EUR");
    }
}
