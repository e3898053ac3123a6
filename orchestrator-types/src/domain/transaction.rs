//! Transaction domain model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::account::AccountId;
use super::money::CurrencyCode;
use crate::error::DomainError;

/// Unique identifier for a Transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(Uuid);

impl TransactionId {
    /// Creates a new random TransactionId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a TransactionId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TransactionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// The kind of money movement a transaction records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Card,
    Bank,
    Crypto,
    SystemFee,
    Exchange,
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Card => write!(f, "card"),
            TransactionType::Bank => write!(f, "bank"),
            TransactionType::Crypto => write!(f, "crypto"),
            TransactionType::SystemFee => write!(f, "system_fee"),
            TransactionType::Exchange => write!(f, "exchange"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    #[default]
    Pending,
    Successful,
    Failed,
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionStatus::Pending => write!(f, "pending"),
            TransactionStatus::Successful => write!(f, "successful"),
            TransactionStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Commission record linked to a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commission {
    /// Rate in percent, e.g. `2.5`
    pub percent: Decimal,
}

impl Commission {
    pub fn new(percent: Decimal) -> Self {
        Self { percent }
    }

    /// Fee charged on `base` at this rate, unrounded.
    pub fn fee_on(&self, base: Decimal) -> Decimal {
        base * self.percent / Decimal::ONE_HUNDRED
    }
}

/// A recorded money movement within an operation.
///
/// Everything except `status` is fixed at creation; status only moves
/// from pending to successful or failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier
    pub id: TransactionId,
    /// Type of transaction
    pub transaction_type: TransactionType,
    status: TransactionStatus,
    pub from_account: AccountId,
    pub to_account: AccountId,
    /// Amount in the transaction currency
    pub amount: Decimal,
    pub currency: CurrencyCode,
    /// What the recipient gets on an exchange
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_currency: Option<CurrencyCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commission: Option<Commission>,
    /// When the transaction was created
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Creates a new pending transaction.
    pub fn new(
        transaction_type: TransactionType,
        from_account: AccountId,
        to_account: AccountId,
        amount: Decimal,
        currency: CurrencyCode,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            transaction_type,
            status: TransactionStatus::Pending,
            from_account,
            to_account,
            amount,
            currency,
            recipient_amount: None,
            recipient_currency: None,
            commission: None,
            created_at: Utc::now(),
        }
    }

    /// Creates a new pending exchange from one currency into another.
    pub fn exchange(
        from_account: AccountId,
        to_account: AccountId,
        amount: Decimal,
        currency: CurrencyCode,
        recipient_amount: Decimal,
        recipient_currency: CurrencyCode,
    ) -> Self {
        Self {
            recipient_amount: Some(recipient_amount),
            recipient_currency: Some(recipient_currency),
            ..Self::new(TransactionType::Exchange, from_account, to_account, amount, currency)
        }
    }

    pub fn with_commission(mut self, commission: Commission) -> Self {
        self.commission = Some(commission);
        self
    }

    /// Sets the status directly, for rebuilding stored records.
    pub fn with_status(mut self, status: TransactionStatus) -> Self {
        self.status = status;
        self
    }

    pub fn status(&self) -> TransactionStatus {
        self.status
    }

    pub fn is_successful(&self) -> bool {
        self.status == TransactionStatus::Successful
    }

    pub fn is_failed(&self) -> bool {
        self.status == TransactionStatus::Failed
    }

    /// Moves a pending transaction to successful or failed.
    pub fn transition(&mut self, to: TransactionStatus) -> Result<(), DomainError> {
        if self.status != TransactionStatus::Pending || to == TransactionStatus::Pending {
            return Err(DomainError::InvalidStatusTransition {
                id: self.id,
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }
}
