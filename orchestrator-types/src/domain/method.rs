//! Payment methods (card brands) and purchase items.

use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifier of a payment method, e.g. `visa`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MethodId(String);

impl MethodId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MethodId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A payment method offered at checkout.
#[derive(Debug, Clone)]
pub struct PaymentMethod {
    pub id: MethodId,
    pub name: String,
    /// Logo URI
    pub logo: String,
    /// Card-number mask, compiled at load time
    pub mask: Option<Regex>,
    pub is_active: bool,
}

impl PaymentMethod {
    /// Returns true if the card number fits this method's mask.
    ///
    /// Spaces and dashes are ignored. A method without a mask accepts any number.
    pub fn accepts_card_number(&self, card_number: &str) -> bool {
        let digits: String = card_number
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect();
        match &self.mask {
            Some(mask) => mask.is_match(&digits),
            None => true,
        }
    }
}

/// Price tier of a purchase item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceTier {
    Low,
    Mid,
    High,
}

impl std::str::FromStr for PriceTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(PriceTier::Low),
            "mid" => Ok(PriceTier::Mid),
            "high" => Ok(PriceTier::High),
            _ => Err(format!("Unknown price tier: {}", s)),
        }
    }
}

/// A tariff/plan that can be purchased.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseItem {
    pub id: String,
    pub days: u32,
    pub prices_usd: BTreeMap<PriceTier, Decimal>,
    pub is_primary: bool,
}

impl PurchaseItem {
    /// USD price for a tier, if the item is sold in that tier.
    pub fn price(&self, tier: PriceTier) -> Option<Decimal> {
        self.prices_usd.get(&tier).copied()
    }

    /// USD price per day for a tier, rounded to cents.
    pub fn daily_price(&self, tier: PriceTier) -> Option<Decimal> {
        let price = self.price(tier)?;
        if self.days == 0 {
            return None;
        }
        Some(
            (price / Decimal::from(self.days))
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn visa() -> PaymentMethod {
        PaymentMethod {
            id: MethodId::new("visa"),
            name: "Visa".into(),
            logo: "/img/visa.svg".into(),
            mask: Some(Regex::new(r"^4\d{12}(\d{3})?$").unwrap()),
            is_active: true,
        }
    }

    #[test]
    fn test_method_id_normalized() {
        assert_eq!(MethodId::new(" VISA ").as_str(), "visa");
    }

    #[test]
    fn test_card_mask() {
        let method = visa();
        assert!(method.accepts_card_number("4111 1111 1111 1111"));
        assert!(!method.accepts_card_number("5500-0000-0000-0004"));
    }

    #[test]
    fn test_method_without_mask_accepts_anything() {
        let method = PaymentMethod { mask: None, ..visa() };
        assert!(method.accepts_card_number("6062 8288 8866 6688"));
    }

    #[test]
    fn test_purchase_item_prices() {
        let item = PurchaseItem {
            id: "month".into(),
            days: 30,
            prices_usd: BTreeMap::from([
                (PriceTier::Low, dec!(9.99)),
                (PriceTier::High, dec!(29.99)),
            ]),
            is_primary: true,
        };
        assert_eq!(item.price(PriceTier::Low), Some(dec!(9.99)));
        assert_eq!(item.price(PriceTier::Mid), None);
        assert_eq!(item.daily_price(PriceTier::High), Some(dec!(1.00)));
    }
}
