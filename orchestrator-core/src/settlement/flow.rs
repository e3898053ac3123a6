//! Per-flow house margin on the crypto leg.

use orchestrator_types::{AccountRole, FlowType, Operation};
use rust_decimal::Decimal;

use super::ledger::{self, Leg};
use super::wallet_provider_fee;

pub(crate) fn house_fee_crypto(operation: &Operation) -> Decimal {
    match operation.flow {
        FlowType::CardToWallet => card_to_wallet(operation),
        FlowType::BankToWallet => bank_to_wallet(operation),
    }
}

/// The whole card-flow margin is taken on the fiat leg.
fn card_to_wallet(_operation: &Operation) -> Decimal {
    Decimal::ZERO
}

/// Inbound crypto fee from the liquidity provider, less the crypto-leg
/// liquidity fee and the wallet fee.
fn bank_to_wallet(operation: &Operation) -> Decimal {
    let Some(inbound) = ledger::liquidity_inbound(operation) else {
        return Decimal::ZERO;
    };
    let liquidity = ledger::child_of(operation, AccountRole::Liquidity)
        .map(|child| ledger::outbound_fees(operation, child, Some(Leg::Crypto)))
        .unwrap_or_default();
    inbound.amount - liquidity - wallet_provider_fee(operation)
}
