//! Transaction lookups over an operation snapshot.
//!
//! Failed transactions never count. Pending ones do: a fee booked but not yet
//! settled is still owed.

use orchestrator_types::{
    AccountId, AccountRole, CurrencyCode, Operation, Transaction, TransactionType,
};
use rust_decimal::Decimal;

/// Which side of the exchange a liquidity fee belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leg {
    /// Booked in the operation currency
    Fiat,
    /// Booked in any other currency
    Crypto,
}

impl Leg {
    fn matches(self, operation: &Operation, currency: &CurrencyCode) -> bool {
        match self {
            Leg::Fiat => *currency == operation.currency,
            Leg::Crypto => *currency != operation.currency,
        }
    }
}

fn live(operation: &Operation) -> impl Iterator<Item = &Transaction> {
    operation.transactions().iter().filter(|t| !t.is_failed())
}

/// The collecting provider's fee leg paid into the system account.
pub(crate) fn card_inbound(operation: &Operation) -> Option<&Transaction> {
    let card = operation.account(AccountRole::Card)?.account;
    live(operation).find(|t| {
        t.transaction_type == TransactionType::SystemFee
            && t.from_account == card
            && t.to_account == operation.system_account
    })
}

/// The exchange out of the system account.
pub(crate) fn exchange(operation: &Operation) -> Option<&Transaction> {
    live(operation).find(|t| t.transaction_type == TransactionType::Exchange)
}

/// The crypto delivery from the liquidity provider to a wallet.
pub(crate) fn crypto_delivery(operation: &Operation) -> Option<&Transaction> {
    let liquidity = operation.account(AccountRole::Liquidity)?.account;
    live(operation)
        .find(|t| t.transaction_type == TransactionType::Crypto && t.from_account == liquidity)
}

/// The liquidity provider's crypto fee leg paid into the system account.
pub(crate) fn liquidity_inbound(operation: &Operation) -> Option<&Transaction> {
    let liquidity = operation.account(AccountRole::Liquidity)?.account;
    live(operation).find(|t| {
        t.transaction_type == TransactionType::SystemFee
            && t.from_account == liquidity
            && t.to_account == operation.system_account
            && Leg::Crypto.matches(operation, &t.currency)
    })
}

/// Sum of fees the system paid to `child`, optionally restricted to one leg.
pub(crate) fn outbound_fees(operation: &Operation, child: AccountId, leg: Option<Leg>) -> Decimal {
    live(operation)
        .filter(|t| {
            t.transaction_type == TransactionType::SystemFee
                && t.from_account == operation.system_account
                && t.to_account == child
                && leg.is_none_or(|leg| leg.matches(operation, &t.currency))
        })
        .map(|t| t.amount)
        .sum()
}

pub(crate) fn child_of(operation: &Operation, role: AccountRole) -> Option<AccountId> {
    operation.account(role).and_then(|a| a.child)
}
