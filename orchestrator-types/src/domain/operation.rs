//! Operations: one money movement from payer to final custody.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::account::{AccountId, AccountRole, ProviderAccount};
use super::money::CurrencyCode;
use super::transaction::{Transaction, TransactionId, TransactionStatus, TransactionType};
use crate::error::DomainError;

/// Unique identifier for an Operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationId(Uuid);

impl OperationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for OperationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for OperationId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Stages of the settlement pipeline, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SettlementStep {
    CardCollection = 1,
    CardToSystem = 2,
    SystemToLiquidity = 3,
    LiquidityToWallet = 4,
}

impl SettlementStep {
    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn next(self) -> Option<SettlementStep> {
        match self {
            SettlementStep::CardCollection => Some(SettlementStep::CardToSystem),
            SettlementStep::CardToSystem => Some(SettlementStep::SystemToLiquidity),
            SettlementStep::SystemToLiquidity => Some(SettlementStep::LiquidityToWallet),
            SettlementStep::LiquidityToWallet => None,
        }
    }
}

impl TryFrom<u8> for SettlementStep {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(SettlementStep::CardCollection),
            2 => Ok(SettlementStep::CardToSystem),
            3 => Ok(SettlementStep::SystemToLiquidity),
            4 => Ok(SettlementStep::LiquidityToWallet),
            other => Err(DomainError::ValidationError(format!(
                "Settlement step must be 1-4, got {}",
                other
            ))),
        }
    }
}

impl From<SettlementStep> for u8 {
    fn from(step: SettlementStep) -> Self {
        step.number()
    }
}

impl fmt::Display for SettlementStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SettlementStep::CardCollection => "card collection",
            SettlementStep::CardToSystem => "card to system",
            SettlementStep::SystemToLiquidity => "system to liquidity",
            SettlementStep::LiquidityToWallet => "liquidity to wallet",
        };
        write!(f, "step {} ({})", self.number(), name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    #[default]
    InProgress,
    Completed,
    Declined,
    Cancelled,
}

impl OperationStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, OperationStatus::InProgress)
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationStatus::InProgress => write!(f, "in_progress"),
            OperationStatus::Completed => write!(f, "completed"),
            OperationStatus::Declined => write!(f, "declined"),
            OperationStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// How fiat enters the pipeline; selects the per-flow fee rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowType {
    #[default]
    CardToWallet,
    BankToWallet,
}

/// A long-lived money movement and the transactions recorded against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    pub id: OperationId,
    #[serde(default)]
    pub flow: FlowType,
    /// Amount submitted by the payer, in `currency`
    pub amount: Decimal,
    pub currency: CurrencyCode,
    step: SettlementStep,
    #[serde(default)]
    status: OperationStatus,
    /// The operating entity's own ledger account
    pub system_account: AccountId,
    #[serde(default)]
    pub accounts: Vec<ProviderAccount>,
    #[serde(default)]
    transactions: Vec<Transaction>,
    pub created_at: DateTime<Utc>,
}

impl Operation {
    /// Starts a new operation at the card-collection step.
    pub fn new(
        flow: FlowType,
        amount: Decimal,
        currency: CurrencyCode,
        system_account: AccountId,
        accounts: Vec<ProviderAccount>,
    ) -> Result<Self, DomainError> {
        if amount <= Decimal::ZERO {
            return Err(DomainError::ValidationError(
                "Operation amount must be positive".into(),
            ));
        }
        Ok(Self {
            id: OperationId::new(),
            flow,
            amount,
            currency,
            step: SettlementStep::CardCollection,
            status: OperationStatus::InProgress,
            system_account,
            accounts,
            transactions: Vec::new(),
            created_at: Utc::now(),
        })
    }

    pub fn step(&self) -> SettlementStep {
        self.step
    }

    pub fn status(&self) -> OperationStatus {
        self.status
    }

    /// Transactions in the order they were recorded.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn account(&self, role: AccountRole) -> Option<&ProviderAccount> {
        self.accounts.iter().find(|a| a.role == role)
    }

    pub fn account_by_id(&self, id: AccountId) -> Option<&ProviderAccount> {
        self.accounts.iter().find(|a| a.account == id)
    }

    /// Appends a transaction.
    pub fn record(&mut self, transaction: Transaction) -> Result<TransactionId, DomainError> {
        self.ensure_open()?;
        let id = transaction.id;
        self.transactions.push(transaction);
        Ok(id)
    }

    /// Settles a pending transaction as successful or failed.
    pub fn set_transaction_status(
        &mut self,
        id: TransactionId,
        status: TransactionStatus,
    ) -> Result<(), DomainError> {
        self.ensure_open()?;
        self.transactions
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(DomainError::TransactionNotFound(id))?
            .transition(status)
    }

    /// Moves the operation one step forward. Moving to the current step is a
    /// no-op.
    ///
    /// The leg of the step being left must already be recorded as successful.
    pub fn advance_to(&mut self, step: SettlementStep) -> Result<(), DomainError> {
        self.ensure_open()?;
        if step == self.step {
            return Ok(());
        }
        if step < self.step {
            return Err(DomainError::StepRegression {
                from: self.step,
                to: step,
            });
        }
        if self.step.next() != Some(step) {
            return Err(DomainError::StepSkipped {
                from: self.step,
                to: step,
            });
        }
        self.ensure_leg_settled(self.step)?;
        self.step = step;
        Ok(())
    }

    /// Marks the operation completed once the wallet leg has succeeded.
    pub fn complete(&mut self) -> Result<(), DomainError> {
        self.ensure_open()?;
        if self.step != SettlementStep::LiquidityToWallet {
            return Err(DomainError::ValidationError(format!(
                "Operation {} cannot complete at {}",
                self.id, self.step
            )));
        }
        self.ensure_leg_settled(self.step)?;
        self.status = OperationStatus::Completed;
        Ok(())
    }

    /// Whether the transaction that closes `step` is recorded as successful.
    ///
    /// - step 1: anything collected out of the card account
    /// - step 2: the card account's leg into the system account
    /// - step 3: the exchange
    /// - step 4: the crypto delivery out of the liquidity account
    pub fn is_leg_settled(&self, step: SettlementStep) -> bool {
        let from = |role| self.account(role).map(|a| a.account);
        let card = from(AccountRole::Card);
        let liquidity = from(AccountRole::Liquidity);
        self.transactions
            .iter()
            .filter(|t| t.is_successful())
            .any(|t| match step {
                SettlementStep::CardCollection => Some(t.from_account) == card,
                SettlementStep::CardToSystem => {
                    Some(t.from_account) == card && t.to_account == self.system_account
                }
                SettlementStep::SystemToLiquidity => {
                    t.transaction_type == TransactionType::Exchange
                }
                SettlementStep::LiquidityToWallet => {
                    t.transaction_type == TransactionType::Crypto
                        && Some(t.from_account) == liquidity
                }
            })
    }

    pub fn decline(&mut self) -> Result<(), DomainError> {
        self.ensure_open()?;
        self.status = OperationStatus::Declined;
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<(), DomainError> {
        self.ensure_open()?;
        self.status = OperationStatus::Cancelled;
        Ok(())
    }

    fn ensure_leg_settled(&self, step: SettlementStep) -> Result<(), DomainError> {
        if !self.is_leg_settled(step) {
            return Err(DomainError::LegNotSettled { id: self.id, step });
        }
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), DomainError> {
        if self.status.is_terminal() {
            return Err(DomainError::OperationTerminal {
                id: self.id,
                status: self.status,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn operation() -> Operation {
        Operation::new(
            FlowType::CardToWallet,
            dec!(100),
            CurrencyCode::new("EUR").unwrap(),
            AccountId::new(),
            vec![
                ProviderAccount::new(AccountRole::Card, AccountId::new()),
                ProviderAccount::new(AccountRole::Liquidity, AccountId::new()),
                ProviderAccount::new(AccountRole::Wallet, AccountId::new()),
            ],
        )
        .unwrap()
    }

    fn account(op: &Operation, role: AccountRole) -> AccountId {
        op.account(role).unwrap().account
    }

    fn card_leg(op: &mut Operation, status: TransactionStatus) -> TransactionId {
        let card = account(op, AccountRole::Card);
        let tx = Transaction::new(
            TransactionType::SystemFee,
            card,
            op.system_account,
            dec!(4),
            op.currency.clone(),
        )
        .with_status(status);
        op.record(tx).unwrap()
    }

    fn exchange_leg(op: &mut Operation) {
        let liquidity = account(op, AccountRole::Liquidity);
        let tx = Transaction::exchange(
            op.system_account,
            liquidity,
            dec!(96),
            op.currency.clone(),
            dec!(103.1),
            CurrencyCode::new("USDT").unwrap(),
        )
        .with_status(TransactionStatus::Successful);
        op.record(tx).unwrap();
    }

    fn crypto_leg(op: &mut Operation) {
        let liquidity = account(op, AccountRole::Liquidity);
        let wallet = account(op, AccountRole::Wallet);
        let tx = Transaction::new(
            TransactionType::Crypto,
            liquidity,
            wallet,
            dec!(103.1),
            CurrencyCode::new("USDT").unwrap(),
        )
        .with_status(TransactionStatus::Successful);
        op.record(tx).unwrap();
    }

    #[test]
    fn test_new_operation_starts_at_step_one() {
        let op = operation();
        assert_eq!(op.step(), SettlementStep::CardCollection);
        assert_eq!(op.status(), OperationStatus::InProgress);
        assert!(op.transactions().is_empty());
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        let result = Operation::new(
            FlowType::CardToWallet,
            dec!(0),
            CurrencyCode::new("EUR").unwrap(),
            AccountId::new(),
            vec![],
        );
        assert!(matches!(result, Err(DomainError::ValidationError(_))));
    }

    #[test]
    fn test_step_never_decreases() {
        let mut op = operation();
        card_leg(&mut op, TransactionStatus::Successful);
        op.advance_to(SettlementStep::CardToSystem).unwrap();
        op.advance_to(SettlementStep::SystemToLiquidity).unwrap();
        op.advance_to(SettlementStep::SystemToLiquidity).unwrap();
        let result = op.advance_to(SettlementStep::CardToSystem);
        assert!(matches!(result, Err(DomainError::StepRegression { .. })));
        assert_eq!(op.step(), SettlementStep::SystemToLiquidity);
    }

    #[test]
    fn test_steps_cannot_be_skipped() {
        let mut op = operation();
        card_leg(&mut op, TransactionStatus::Successful);
        let result = op.advance_to(SettlementStep::LiquidityToWallet);
        assert!(matches!(
            result,
            Err(DomainError::StepSkipped {
                from: SettlementStep::CardCollection,
                to: SettlementStep::LiquidityToWallet,
            })
        ));
        assert_eq!(op.step(), SettlementStep::CardCollection);
    }

    #[test]
    fn test_advance_waits_for_successful_leg() {
        let mut op = operation();
        assert!(matches!(
            op.advance_to(SettlementStep::CardToSystem),
            Err(DomainError::LegNotSettled {
                step: SettlementStep::CardCollection,
                ..
            })
        ));

        let id = card_leg(&mut op, TransactionStatus::Pending);
        assert!(op.advance_to(SettlementStep::CardToSystem).is_err());

        op.set_transaction_status(id, TransactionStatus::Successful)
            .unwrap();
        op.advance_to(SettlementStep::CardToSystem).unwrap();
        assert_eq!(op.step(), SettlementStep::CardToSystem);
    }

    #[test]
    fn test_failed_leg_does_not_advance() {
        let mut op = operation();
        card_leg(&mut op, TransactionStatus::Failed);
        assert!(matches!(
            op.advance_to(SettlementStep::CardToSystem),
            Err(DomainError::LegNotSettled { .. })
        ));
    }

    #[test]
    fn test_terminal_operation_is_frozen() {
        let mut op = operation();
        op.cancel().unwrap();
        assert!(matches!(
            op.advance_to(SettlementStep::CardToSystem),
            Err(DomainError::OperationTerminal { .. })
        ));
        assert!(op.decline().is_err());
    }

    #[test]
    fn test_complete_requires_settled_wallet_leg() {
        let mut op = operation();
        assert!(op.complete().is_err());

        card_leg(&mut op, TransactionStatus::Successful);
        op.advance_to(SettlementStep::CardToSystem).unwrap();
        op.advance_to(SettlementStep::SystemToLiquidity).unwrap();
        assert!(op.advance_to(SettlementStep::LiquidityToWallet).is_err());

        exchange_leg(&mut op);
        op.advance_to(SettlementStep::LiquidityToWallet).unwrap();
        assert!(matches!(
            op.complete(),
            Err(DomainError::LegNotSettled {
                step: SettlementStep::LiquidityToWallet,
                ..
            })
        ));

        crypto_leg(&mut op);
        op.complete().unwrap();
        assert_eq!(op.status(), OperationStatus::Completed);
    }

    #[test]
    fn test_record_and_settle_transaction() {
        let mut op = operation();
        let card = op.account(AccountRole::Card).unwrap().account;
        let id = op
            .record(Transaction::new(
                TransactionType::SystemFee,
                card,
                op.system_account,
                dec!(4),
                op.currency.clone(),
            ))
            .unwrap();
        op.set_transaction_status(id, TransactionStatus::Successful)
            .unwrap();
        assert!(op.transactions()[0].is_successful());

        let missing = op.set_transaction_status(TransactionId::new(), TransactionStatus::Failed);
        assert!(matches!(missing, Err(DomainError::TransactionNotFound(_))));
    }

    #[test]
    fn test_step_serializes_as_number() {
        let json = serde_json::to_string(&SettlementStep::SystemToLiquidity).unwrap();
        assert_eq!(json, "3");
        assert!(serde_json::from_str::<SettlementStep>("5").is_err());
    }
}
