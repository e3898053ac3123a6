//! Derived decisions. Computed per attempt, never stored.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Internal code for declines a provider table does not map.
pub const GENERIC_DECLINE: &str = "api.ecode.generic_decline";

/// Whether a method is offered for a country, and how.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Eligibility {
    #[serde(rename = "OFFERED_NO_3DS")]
    OfferedNo3ds,
    #[serde(rename = "OFFERED_WITH_3DS")]
    OfferedWith3ds,
    Excluded,
}

impl Eligibility {
    pub fn is_offered(self) -> bool {
        !matches!(self, Eligibility::Excluded)
    }

    pub fn requires_3ds(self) -> bool {
        matches!(self, Eligibility::OfferedWith3ds)
    }
}

impl fmt::Display for Eligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Eligibility::OfferedNo3ds => write!(f, "OFFERED_NO_3DS"),
            Eligibility::OfferedWith3ds => write!(f, "OFFERED_WITH_3DS"),
            Eligibility::Excluded => write!(f, "EXCLUDED"),
        }
    }
}

/// Outcome of the fraud limit check for one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FraudDecision {
    Allow,
    #[serde(rename = "REQUIRE_3DS")]
    Require3ds,
    RouteFallback,
    Refuse,
}

impl fmt::Display for FraudDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FraudDecision::Allow => write!(f, "ALLOW"),
            FraudDecision::Require3ds => write!(f, "REQUIRE_3DS"),
            FraudDecision::RouteFallback => write!(f, "ROUTE_FALLBACK"),
            FraudDecision::Refuse => write!(f, "REFUSE"),
        }
    }
}

/// A provider decline translated into the internal taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedDecline {
    pub internal_code: String,
    pub is_fallback_eligible: bool,
    /// False when the code fell through to [`GENERIC_DECLINE`]
    pub is_mapped: bool,
}
