//! Provider definitions and the tables each provider owns.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use super::country::{CountryCode, CountrySet};
use super::method::MethodId;
use super::money::CurrencyCode;

/// Identifier of a payment provider, e.g. `checkout`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(String);

impl ProviderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProviderId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Execution environment a provider may be enabled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(format!("Unknown environment: {}", s)),
        }
    }
}

/// Whether a provider is attempted first or only as a fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderRole {
    Main,
    Fallback,
}

impl fmt::Display for ProviderRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderRole::Main => write!(f, "main"),
            ProviderRole::Fallback => write!(f, "fallback"),
        }
    }
}

impl FromStr for ProviderRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "main" => Ok(ProviderRole::Main),
            "fallback" => Ok(ProviderRole::Fallback),
            _ => Err(format!("Unknown provider role: {}", s)),
        }
    }
}

/// Risk tier used to pick fraud thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileClass {
    Default,
    Affiliate,
}

impl fmt::Display for ProfileClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileClass::Default => write!(f, "default"),
            ProfileClass::Affiliate => write!(f, "affiliate"),
        }
    }
}

impl FromStr for ProfileClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "default" => Ok(ProfileClass::Default),
            "affiliate" => Ok(ProfileClass::Affiliate),
            _ => Err(format!("Unknown profile class: {}", s)),
        }
    }
}

/// Country lists for one method of one provider.
#[derive(Debug, Clone, Default)]
pub struct MethodRule {
    /// `+3ds`: offered, challenge required
    pub with_3ds: CountrySet,
    /// `-3ds`: offered without challenge
    pub without_3ds: CountrySet,
    /// `excl`: never offered
    pub excluded: CountrySet,
}

impl MethodRule {
    pub fn is_excluded(&self, country: &CountryCode) -> bool {
        self.excluded.matches(country)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MethodTable {
    rules: BTreeMap<MethodId, MethodRule>,
}

impl MethodTable {
    pub fn new(rules: BTreeMap<MethodId, MethodRule>) -> Self {
        Self { rules }
    }

    pub fn rule(&self, method: &MethodId) -> Option<&MethodRule> {
        self.rules.get(method)
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodId> {
        self.rules.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Minor-unit multipliers keyed by currency, with an optional `*` entry.
#[derive(Debug, Clone, Default)]
pub struct CurrencyRuleTable {
    exact: BTreeMap<CurrencyCode, u32>,
    wildcard: Option<u32>,
}

impl CurrencyRuleTable {
    pub fn new(exact: BTreeMap<CurrencyCode, u32>, wildcard: Option<u32>) -> Self {
        Self { exact, wildcard }
    }

    /// Exact entry first, then the wildcard.
    pub fn multiplier(&self, currency: &CurrencyCode) -> Option<u32> {
        self.exact.get(currency).copied().or(self.wildcard)
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.wildcard.is_none()
    }
}

/// Raw provider decline codes: the i18n mapping and the fallback set are independent.
#[derive(Debug, Clone, Default)]
pub struct ErrorCodeTable {
    mapped: HashMap<String, String>,
    fallback: HashSet<String>,
}

impl ErrorCodeTable {
    pub fn new(mapped: HashMap<String, String>, fallback: HashSet<String>) -> Self {
        Self { mapped, fallback }
    }

    pub fn internal_code(&self, raw: &str) -> Option<&str> {
        self.mapped.get(raw).map(String::as_str)
    }

    pub fn is_fallback_eligible(&self, raw: &str) -> bool {
        self.fallback.contains(raw)
    }
}

/// Amount thresholds (major units) for one profile class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FraudLimits {
    #[serde(rename = "3ds")]
    pub three_ds: Decimal,
    pub fallback: Decimal,
    pub refuse: Decimal,
}

#[derive(Debug, Clone, Default)]
pub struct FraudLimitTable {
    limits: BTreeMap<ProfileClass, FraudLimits>,
}

impl FraudLimitTable {
    pub fn new(limits: BTreeMap<ProfileClass, FraudLimits>) -> Self {
        Self { limits }
    }

    pub fn limits(&self, profile: ProfileClass) -> Option<&FraudLimits> {
        self.limits.get(&profile)
    }
}

/// A configured payment provider. Immutable once the catalogue is built.
#[derive(Debug, Clone)]
pub struct ProviderDefinition {
    pub id: ProviderId,
    pub name: String,
    pub environments: Vec<Environment>,
    pub role: ProviderRole,
    pub is_active: bool,
    pub methods: MethodTable,
    pub currency_rules: CurrencyRuleTable,
    pub error_codes: ErrorCodeTable,
    pub fraud_limits: FraudLimitTable,
}

impl ProviderDefinition {
    pub fn runs_in(&self, environment: Environment) -> bool {
        self.environments.contains(&environment)
    }

    pub fn supports_currency(&self, currency: &CurrencyCode) -> bool {
        self.currency_rules.multiplier(currency).is_some()
    }
}
