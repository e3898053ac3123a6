//! # Orchestrator Core
//!
//! Routing, decline handling and settlement arithmetic for the payment
//! orchestrator.
//!
//! ## Architecture
//!
//! - `currency` - decimal ⇄ provider wire amounts
//! - `decline` - provider decline codes to the internal taxonomy
//! - `eligibility` - method offering per provider and country
//! - `selector` - ordered candidate providers for an attempt
//! - `fraud` - amount-based gating
//! - `settlement` - step amounts and fee attribution
//! - `planner` - attempt plans and decline follow-up
//! - `service` - async orchestration over the store and gateway ports
//!
//! Every component except the service is synchronous and reads an
//! `Arc<Catalog>` built once at start-up. The service is generic over
//! `S: OperationStore` and `G: GatewayClient`.

pub mod currency;
pub mod decline;
pub mod eligibility;
pub mod fraud;
pub mod planner;
pub mod selector;
pub mod service;
pub mod settlement;

#[cfg(test)]
mod fixtures;

pub use currency::CurrencyRules;
pub use decline::ProviderErrorNormalizer;
pub use eligibility::MethodEligibility;
pub use fraud::FraudLimitPolicy;
pub use planner::{AttemptPlan, AttemptPlanner, DeclineOutcome, PlannedAttempt};
pub use selector::{ProviderSelector, SelectedProvider};
pub use service::{AttemptRecord, CheckoutOutcome, OrchestrationService};
pub use settlement::{FeeBreakdown, Leg, SettlementStepCalculator, SettlementView};
