//! The immutable provider catalogue.
//!
//! Built once from a [`CatalogConfig`] at start-up and shared read-only
//! (usually behind an `Arc`) by every component. Construction validates the
//! whole document: an active provider without currency rules or a method
//! table, a duplicate provider, a non-positive multiplier or a card mask that
//! does not compile all refuse the catalogue.

use regex::Regex;
use std::collections::{BTreeMap, HashSet};

use crate::domain::{
    CountrySet, CurrencyCode, CurrencyRuleTable, ErrorCodeTable, FraudLimitTable, MethodId,
    MethodRule, MethodTable, PaymentMethod, ProviderDefinition, ProviderId, ProviderRole,
    PurchaseItem,
};
use crate::dto::{CatalogConfig, MethodConfig, ProviderConfig, PurchaseItemConfig};
use crate::error::ConfigError;

const WILDCARD: &str = "*";

#[derive(Debug, Clone)]
pub struct Catalog {
    providers: Vec<ProviderDefinition>,
    methods: BTreeMap<MethodId, PaymentMethod>,
    purchase_items: Vec<PurchaseItem>,
}

impl Catalog {
    /// Validates the configuration document and builds the catalogue.
    pub fn from_config(config: CatalogConfig) -> Result<Self, ConfigError> {
        let methods = config
            .methods
            .into_iter()
            .map(|(id, cfg)| build_method(MethodId::new(id), cfg))
            .map(|m| m.map(|m| (m.id.clone(), m)))
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        let mut seen = HashSet::new();
        let mut providers = Vec::with_capacity(config.providers.len());
        for cfg in config.providers {
            let provider = build_provider(cfg)?;
            if !seen.insert(provider.id.clone()) {
                return Err(ConfigError::DuplicateProvider(provider.id));
            }
            for method in provider.methods.methods() {
                if !methods.contains_key(method) {
                    tracing::warn!(
                        provider = %provider.id,
                        method = %method,
                        "provider references a method missing from the catalogue"
                    );
                }
            }
            providers.push(provider);
        }

        let purchase_items = config
            .purchase_items
            .into_iter()
            .map(|(id, cfg)| build_purchase_item(id, cfg))
            .collect::<Result<Vec<_>, _>>()?;
        if purchase_items.iter().filter(|i| i.is_primary).count() > 1 {
            tracing::warn!("more than one purchase item is flagged primary");
        }

        tracing::info!(
            providers = providers.len(),
            methods = methods.len(),
            purchase_items = purchase_items.len(),
            "provider catalogue loaded"
        );

        Ok(Self {
            providers,
            methods,
            purchase_items,
        })
    }

    /// Providers in configuration declaration order.
    pub fn providers(&self) -> &[ProviderDefinition] {
        &self.providers
    }

    pub fn provider(&self, id: &ProviderId) -> Option<&ProviderDefinition> {
        self.providers.iter().find(|p| &p.id == id)
    }

    pub fn method(&self, id: &MethodId) -> Option<&PaymentMethod> {
        self.methods.get(id)
    }

    pub fn methods(&self) -> impl Iterator<Item = &PaymentMethod> {
        self.methods.values()
    }

    /// First active method whose mask accepts the card number.
    pub fn detect_method(&self, card_number: &str) -> Option<&PaymentMethod> {
        self.methods
            .values()
            .filter(|m| m.is_active && m.mask.is_some())
            .find(|m| m.accepts_card_number(card_number))
    }

    pub fn purchase_items(&self) -> &[PurchaseItem] {
        &self.purchase_items
    }

    pub fn purchase_item(&self, id: &str) -> Option<&PurchaseItem> {
        self.purchase_items.iter().find(|i| i.id == id)
    }

    pub fn primary_item(&self) -> Option<&PurchaseItem> {
        self.purchase_items.iter().find(|i| i.is_primary)
    }
}

fn build_provider(cfg: ProviderConfig) -> Result<ProviderDefinition, ConfigError> {
    let id = ProviderId::new(cfg.id);
    let data = cfg.data;

    if cfg.is_active {
        if cfg.environments.is_empty() {
            return Err(ConfigError::NoEnvironments(id));
        }
        if data.currency_rules.is_empty() {
            return Err(ConfigError::MissingTable {
                provider: id,
                table: "currency_rules",
            });
        }
        if data.methods.main.is_empty() {
            return Err(ConfigError::MissingTable {
                provider: id,
                table: "methods",
            });
        }
    }

    let mut exact = BTreeMap::new();
    let mut wildcard = None;
    for (key, rule) in data.currency_rules {
        let multiplier = u32::try_from(rule.multiplier)
            .ok()
            .filter(|m| *m > 0)
            .ok_or_else(|| ConfigError::InvalidMultiplier {
                provider: id.clone(),
                key: key.clone(),
            })?;
        if key.trim() == WILDCARD {
            wildcard = Some(multiplier);
        } else {
            exact.insert(CurrencyCode::new(&key)?, multiplier);
        }
    }

    let rules = data
        .methods
        .main
        .into_iter()
        .map(|(method, rule)| {
            Ok((
                MethodId::new(method),
                MethodRule {
                    with_3ds: CountrySet::parse(&rule.with_3ds)?,
                    without_3ds: CountrySet::parse(&rule.without_3ds)?,
                    excluded: CountrySet::parse(&rule.excl)?,
                },
            ))
        })
        .collect::<Result<BTreeMap<_, _>, ConfigError>>()?;

    // Raw codes are trimmed on lookup, so keys are stored trimmed too
    let error_codes = ErrorCodeTable::new(
        data.i18n_error_codes
            .into_iter()
            .map(|(raw, internal)| (raw.trim().to_string(), internal))
            .collect(),
        data.fallback_error_codes
            .iter()
            .map(|raw| raw.trim().to_string())
            .collect(),
    );

    Ok(ProviderDefinition {
        name: cfg.name.unwrap_or_else(|| id.to_string()),
        id,
        environments: cfg.environments,
        role: if cfg.is_main {
            ProviderRole::Main
        } else {
            ProviderRole::Fallback
        },
        is_active: cfg.is_active,
        methods: MethodTable::new(rules),
        currency_rules: CurrencyRuleTable::new(exact, wildcard),
        error_codes,
        fraud_limits: FraudLimitTable::new(data.fraud_limits),
    })
}

fn build_method(id: MethodId, cfg: MethodConfig) -> Result<PaymentMethod, ConfigError> {
    let mask = cfg
        .mask
        .as_deref()
        .map(Regex::new)
        .transpose()
        .map_err(|source| ConfigError::InvalidMask {
            method: id.clone(),
            source,
        })?;
    Ok(PaymentMethod {
        id,
        name: cfg.name,
        logo: cfg.logo,
        mask,
        is_active: cfg.is_active,
    })
}

fn build_purchase_item(id: String, cfg: PurchaseItemConfig) -> Result<PurchaseItem, ConfigError> {
    if cfg.days == 0 {
        return Err(ConfigError::InvalidDuration(id));
    }
    Ok(PurchaseItem {
        id,
        days: cfg.days,
        prices_usd: cfg.prices_usd,
        is_primary: cfg.is_primary,
    })
}
