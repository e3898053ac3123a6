//! Settlement pipeline arithmetic.
//!
//! Money moves card → system → liquidity (exchange) → wallet. Given an
//! operation snapshot this module derives the amount expected at the current
//! step and who earned what along the way:
//!
//! - **Step amounts** need the previous leg's transaction and are `None`
//!   until it is recorded.
//! - **Fees** are read from the transactions alone, never from the step
//!   number. A missing transaction contributes zero.
//!
//! Snapshots may be taken mid-flight, so nothing here asserts that the
//! transaction set is consistent with the step.

mod flow;
mod ledger;

pub use ledger::Leg;

use orchestrator_types::{
    AccountRole, FlowType, Operation, OperationId, OperationStatus, SettlementStep,
};
use rust_decimal::Decimal;
use serde::Serialize;

/// Fees attributed to each party of an operation, in transaction currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeeBreakdown {
    pub card_provider: Decimal,
    pub liquidity_provider_fiat: Decimal,
    pub liquidity_provider_crypto: Decimal,
    pub wallet_provider: Decimal,
    pub house_fiat: Decimal,
    pub house_crypto: Decimal,
}

/// Read-only summary of where an operation stands.
#[derive(Debug, Clone, Serialize)]
pub struct SettlementView {
    pub operation_id: OperationId,
    pub flow: FlowType,
    pub status: OperationStatus,
    pub step: SettlementStep,
    /// `None` while the previous leg has not landed
    pub expected_amount: Option<Decimal>,
    pub fees: FeeBreakdown,
}

/// Computes step amounts and the fee ledger for an operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SettlementStepCalculator;

impl SettlementStepCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Amount expected at the operation's current step.
    ///
    /// - step 1: the amount submitted by the payer
    /// - step 2: that amount less the collecting provider's fee leg, once
    ///   the leg is successful
    /// - step 3: what the exchange delivers
    /// - step 4: the crypto sent to the wallet
    pub fn current_step_amount(&self, operation: &Operation) -> Option<Decimal> {
        match operation.step() {
            SettlementStep::CardCollection => Some(operation.amount),
            SettlementStep::CardToSystem => ledger::card_inbound(operation)
                .filter(|t| t.is_successful())
                .map(|t| operation.amount - t.amount),
            SettlementStep::SystemToLiquidity => {
                ledger::exchange(operation).and_then(|t| t.recipient_amount)
            }
            SettlementStep::LiquidityToWallet => {
                ledger::crypto_delivery(operation).map(|t| t.amount)
            }
        }
    }

    pub fn card_provider_fee(&self, operation: &Operation) -> Decimal {
        card_provider_fee(operation)
    }

    pub fn liquidity_provider_fee(&self, operation: &Operation, leg: Leg) -> Decimal {
        liquidity_provider_fee(operation, leg)
    }

    pub fn wallet_provider_fee(&self, operation: &Operation) -> Decimal {
        wallet_provider_fee(operation)
    }

    /// What the system keeps from the collecting provider's fee leg after
    /// paying the card provider and the fiat-side liquidity fee.
    pub fn house_fee_fiat(&self, operation: &Operation) -> Decimal {
        let Some(inbound) = ledger::card_inbound(operation) else {
            return Decimal::ZERO;
        };
        inbound.amount
            - card_provider_fee(operation)
            - liquidity_provider_fee(operation, Leg::Fiat)
    }

    /// Crypto-side margin, computed per flow type.
    pub fn house_fee_crypto(&self, operation: &Operation) -> Decimal {
        flow::house_fee_crypto(operation)
    }

    pub fn fee_breakdown(&self, operation: &Operation) -> FeeBreakdown {
        FeeBreakdown {
            card_provider: self.card_provider_fee(operation),
            liquidity_provider_fiat: self.liquidity_provider_fee(operation, Leg::Fiat),
            liquidity_provider_crypto: self.liquidity_provider_fee(operation, Leg::Crypto),
            wallet_provider: self.wallet_provider_fee(operation),
            house_fiat: self.house_fee_fiat(operation),
            house_crypto: self.house_fee_crypto(operation),
        }
    }

    pub fn view(&self, operation: &Operation) -> SettlementView {
        SettlementView {
            operation_id: operation.id,
            flow: operation.flow,
            status: operation.status(),
            step: operation.step(),
            expected_amount: self.current_step_amount(operation),
            fees: self.fee_breakdown(operation),
        }
    }
}

fn card_provider_fee(operation: &Operation) -> Decimal {
    ledger::child_of(operation, AccountRole::Card)
        .map(|child| ledger::outbound_fees(operation, child, None))
        .unwrap_or_default()
}

fn liquidity_provider_fee(operation: &Operation, leg: Leg) -> Decimal {
    ledger::child_of(operation, AccountRole::Liquidity)
        .map(|child| ledger::outbound_fees(operation, child, Some(leg)))
        .unwrap_or_default()
}

/// The wallet is whichever account received the crypto delivery.
pub(crate) fn wallet_provider_fee(operation: &Operation) -> Decimal {
    ledger::crypto_delivery(operation)
        .and_then(|t| operation.account_by_id(t.to_account))
        .and_then(|wallet| wallet.child)
        .map(|child| ledger::outbound_fees(operation, child, None))
        .unwrap_or_default()
}
