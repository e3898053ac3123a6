//! Data Transfer Objects: the configuration document and attempt requests.
//!
//! The configuration DTOs mirror the on-disk structure one to one; they are
//! turned into the validated [`Catalog`](crate::Catalog) at start-up and are
//! not used afterwards.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::domain::{
    CountryCode, CurrencyCode, Environment, FraudLimits, MethodId, PriceTier, ProfileClass,
};

// ─────────────────────────────────────────────────────────────────────────────
// Configuration DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Root of the configuration document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Providers in declaration order; this order is the selection order
    pub providers: Vec<ProviderConfig>,
    #[serde(default)]
    pub methods: BTreeMap<String, MethodConfig>,
    #[serde(default)]
    pub purchase_items: BTreeMap<String, PurchaseItemConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub environments: Vec<Environment>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_main: bool,
    #[serde(default)]
    pub data: ProviderDataConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderDataConfig {
    #[serde(default)]
    pub fallback_error_codes: Vec<String>,
    #[serde(default)]
    pub i18n_error_codes: HashMap<String, String>,
    /// Currency code or `*` to multiplier
    #[serde(default)]
    pub currency_rules: BTreeMap<String, CurrencyRuleConfig>,
    #[serde(default)]
    pub fraud_limits: BTreeMap<ProfileClass, FraudLimits>,
    #[serde(default)]
    pub methods: ProviderMethodsConfig,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CurrencyRuleConfig {
    pub multiplier: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderMethodsConfig {
    #[serde(default)]
    pub main: BTreeMap<String, MethodRuleConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MethodRuleConfig {
    #[serde(rename = "+3ds", default)]
    pub with_3ds: Vec<String>,
    #[serde(rename = "-3ds", default)]
    pub without_3ds: Vec<String>,
    #[serde(default)]
    pub excl: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodConfig {
    pub name: String,
    #[serde(default)]
    pub logo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseItemConfig {
    pub days: u32,
    #[serde(default)]
    pub prices_usd: BTreeMap<PriceTier, Decimal>,
    #[serde(default)]
    pub is_primary: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Attempt DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Everything known about a purchase attempt before a provider is chosen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRequest {
    pub environment: Environment,
    pub currency: CurrencyCode,
    pub method: MethodId,
    pub country: CountryCode,
    #[serde(default = "default_profile")]
    pub profile: ProfileClass,
    /// Amount in major units of `currency`
    pub amount: Decimal,
}

fn default_profile() -> ProfileClass {
    ProfileClass::Default
}
