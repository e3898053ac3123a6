//! Ledger accounts taking part in an operation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a ledger account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(Uuid);

impl AccountId {
    /// Creates a new random AccountId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an AccountId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for AccountId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// The part a provider plays in the settlement pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountRole {
    /// Fiat collection provider (card acquirer or bank)
    Card,
    /// Liquidity / exchange provider
    Liquidity,
    /// Custodial wallet provider
    Wallet,
}

/// A provider's account plus the internal ledger account its fees are booked to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderAccount {
    pub role: AccountRole,
    pub account: AccountId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child: Option<AccountId>,
}

impl ProviderAccount {
    pub fn new(role: AccountRole, account: AccountId) -> Self {
        Self {
            role,
            account,
            child: None,
        }
    }

    pub fn with_child(mut self, child: AccountId) -> Self {
        self.child = Some(child);
        self
    }
}
