//! Currency codes and provider wire amounts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// An upper-case currency code.
///
/// Covers ISO 4217 fiat codes (`USD`, `JPY`, `KWD`) as well as the crypto
/// tickers used on the wallet leg (`USDT`, `BTC`). The code says nothing about
/// the minor-unit scale; that comes from each provider's currency rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Parses and normalizes a currency code (3 to 10 ASCII alphanumerics).
    pub fn new(code: &str) -> Result<Self, DomainError> {
        let code = code.trim();
        let valid =
            (3..=10).contains(&code.len()) && code.chars().all(|c| c.is_ascii_alphanumeric());
        if !valid {
            return Err(DomainError::InvalidCurrencyCode(code.to_string()));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CurrencyCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

/// Amount in a provider's wire format with its currency.
///
/// The amount is a signed count of the provider's minor units; what a unit is
/// worth depends on the provider's multiplier for the currency, so two
/// `Money` values with the same currency are only comparable when they were
/// produced for the same provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: i64,
    currency: CurrencyCode,
}

impl Money {
    /// Creates a new Money value.
    pub fn new(amount: i64, currency: CurrencyCode) -> Self {
        Self { amount, currency }
    }

    /// Creates a zero-value Money for the given currency.
    pub fn zero(currency: CurrencyCode) -> Self {
        Self {
            amount: 0,
            currency,
        }
    }

    /// Returns the amount in minor units.
    pub fn amount(&self) -> i64 {
        self.amount
    }

    /// Returns the currency.
    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }

    /// Checked addition - returns error if currencies don't match or the
    /// sum overflows.
    pub fn checked_add(&self, other: &Money) -> Result<Money, DomainError> {
        self.ensure_same_currency(other)?;
        self.with_amount(self.amount.checked_add(other.amount))
    }

    /// Checked subtraction - returns error if currencies don't match or the
    /// difference overflows.
    ///
    /// The result may be negative; refunds and fee reversals are signed.
    pub fn checked_sub(&self, other: &Money) -> Result<Money, DomainError> {
        self.ensure_same_currency(other)?;
        self.with_amount(self.amount.checked_sub(other.amount))
    }

    fn with_amount(&self, amount: Option<i64>) -> Result<Money, DomainError> {
        let amount = amount.ok_or_else(|| DomainError::AmountOverflow(self.currency.clone()))?;
        Ok(Money {
            amount,
            currency: self.currency.clone(),
        })
    }

    fn ensure_same_currency(&self, other: &Money) -> Result<(), DomainError> {
        if self.currency != other.currency {
            return Err(DomainError::CurrencyMismatch {
                expected: self.currency.clone(),
                got: other.currency.clone(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} (minor)", self.amount, self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd() -> CurrencyCode {
        CurrencyCode::new("USD").unwrap()
    }

    #[test]
    fn test_currency_code_is_uppercased() {
        assert_eq!(CurrencyCode::new("jpy").unwrap().as_str(), "JPY");
        assert_eq!(CurrencyCode::new("usdt").unwrap().as_str(), "USDT");
    }

    #[test]
    fn test_invalid_currency_codes_rejected() {
        assert!(matches!(
            CurrencyCode::new("*"),
            Err(DomainError::InvalidCurrencyCode(_))
        ));
        assert!(CurrencyCode::new("US").is_err());
        assert!(CurrencyCode::new("U-D").is_err());
    }

    #[test]
    fn test_money_addition_and_negative_subtraction() {
        let a = Money::new(100, usd());
        let b = Money::new(250, usd());
        assert_eq!(a.checked_add(&b).unwrap().amount(), 350);
        assert_eq!(a.checked_sub(&b).unwrap().amount(), -150);
    }

    #[test]
    fn test_money_overflow_is_an_error() {
        let max = Money::new(i64::MAX, usd());
        let min = Money::new(i64::MIN, usd());
        let one = Money::new(1, usd());
        assert!(matches!(max.checked_add(&one), Err(DomainError::AmountOverflow(_))));
        assert!(matches!(min.checked_sub(&one), Err(DomainError::AmountOverflow(_))));
        assert_eq!(max.checked_sub(&one).unwrap().amount(), i64::MAX - 1);
    }

    #[test]
    fn test_currency_mismatch() {
        let usd = Money::new(100, usd());
        let eur = Money::new(50, CurrencyCode::new("EUR").unwrap());
        let result = usd.checked_add(&eur);
        assert!(matches!(result, Err(DomainError::CurrencyMismatch { .. })));
    }

    #[test]
    fn test_currency_code_serde_validates() {
        let parsed: CurrencyCode = serde_json::from_str("\"kwd\"").unwrap();
        assert_eq!(parsed.as_str(), "KWD");
        assert!(serde_json::from_str::<CurrencyCode>("\"$\"").is_err());
    }
}
