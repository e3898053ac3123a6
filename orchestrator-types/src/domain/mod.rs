//! Domain models for the payment orchestrator.

pub mod account;
pub mod country;
pub mod decision;
pub mod method;
pub mod money;
pub mod operation;
pub mod provider;
pub mod transaction;

pub use account::{AccountId, AccountRole, ProviderAccount};
pub use country::{CountryCode, CountryPattern, CountrySet, Region};
pub use decision::{Eligibility, FraudDecision, GENERIC_DECLINE, NormalizedDecline};
pub use method::{MethodId, PaymentMethod, PriceTier, PurchaseItem};
pub use money::{CurrencyCode, Money};
pub use operation::{FlowType, Operation, OperationId, OperationStatus, SettlementStep};
pub use provider::{
    CurrencyRuleTable, Environment, ErrorCodeTable, FraudLimitTable, FraudLimits, MethodRule,
    MethodTable, ProfileClass, ProviderDefinition, ProviderId, ProviderRole,
};
pub use transaction::{Commission, Transaction, TransactionId, TransactionStatus, TransactionType};
