//! Orchestration Service
//!
//! Drives attempt plans through the gateway port and reads settlement
//! state through the operation store port. All routing and fee logic stays
//! in the synchronous components; this layer only sequences port calls.

use std::sync::Arc;

use orchestrator_types::{
    AppError, AttemptMetadata, AttemptRequest, Catalog, FraudDecision, GatewayClient,
    NormalizedDecline, Operation, OperationId, OperationStore, ProviderId,
};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::planner::{AttemptPlanner, DeclineOutcome, PlannedAttempt};
use crate::settlement::{SettlementStepCalculator, SettlementView};

/// One gateway submission made during a checkout.
#[derive(Debug, Clone, Serialize)]
pub struct AttemptRecord {
    pub provider: ProviderId,
    pub amount_minor_units: i64,
    pub challenge_3ds: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decline: Option<NormalizedDecline>,
}

impl AttemptRecord {
    fn new(attempt: &PlannedAttempt, decline: Option<NormalizedDecline>) -> Self {
        Self {
            provider: attempt.provider.clone(),
            amount_minor_units: attempt.amount_minor_units,
            challenge_3ds: attempt.challenge_3ds,
            decline,
        }
    }
}

/// How a checkout ended.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CheckoutOutcome {
    Approved {
        provider: ProviderId,
        attempts: Vec<AttemptRecord>,
    },
    Declined {
        decline: NormalizedDecline,
        attempts: Vec<AttemptRecord>,
    },
    Refused {
        decision: FraudDecision,
    },
    NoProvider,
}

/// Application service for payment orchestration.
///
/// Generic over both ports so tests can inject scripted gateways and
/// in-memory stores.
pub struct OrchestrationService<S: OperationStore, G: GatewayClient> {
    store: S,
    gateway: G,
    planner: AttemptPlanner,
    settlement: SettlementStepCalculator,
}

impl<S: OperationStore, G: GatewayClient> OrchestrationService<S, G> {
    pub fn new(catalog: Arc<Catalog>, store: S, gateway: G) -> Self {
        Self {
            store,
            gateway,
            planner: AttemptPlanner::new(catalog),
            settlement: SettlementStepCalculator::new(),
        }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn planner(&self) -> &AttemptPlanner {
        &self.planner
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Settlement
    // ─────────────────────────────────────────────────────────────────────────────

    pub async fn settlement_view(&self, id: OperationId) -> Result<SettlementView, AppError> {
        let operation = self.operation(id).await?;
        Ok(self.settlement.view(&operation))
    }

    /// Amount expected at the operation's current step, if the previous leg landed.
    pub async fn current_step_amount(&self, id: OperationId) -> Result<Option<Decimal>, AppError> {
        let operation = self.operation(id).await?;
        Ok(self.settlement.current_step_amount(&operation))
    }

    async fn operation(&self, id: OperationId) -> Result<Operation, AppError> {
        self.store
            .get_operation(id)
            .await
            .map_err(AppError::from)
            .and_then(|opt| opt.ok_or_else(|| AppError::NotFound(format!("Operation {}", id))))
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Checkout
    // ─────────────────────────────────────────────────────────────────────────────

    /// Plans the attempt and submits it, moving on after fallback-eligible declines.
    pub async fn checkout(
        &self,
        request: AttemptRequest,
        operation_id: Option<OperationId>,
    ) -> Result<CheckoutOutcome, AppError> {
        if request.amount <= Decimal::ZERO {
            return Err(AppError::BadRequest("Amount must be positive".into()));
        }

        let plan = self.planner.plan(&request)?;
        if plan.is_refused() {
            return Ok(CheckoutOutcome::Refused {
                decision: plan.decision,
            });
        }
        let Some(mut current) = plan.attempts.first().cloned() else {
            tracing::info!(
                method = %request.method,
                country = %request.country,
                "no eligible provider"
            );
            return Ok(CheckoutOutcome::NoProvider);
        };

        let mut attempts: Vec<AttemptRecord> = Vec::new();
        loop {
            let metadata = AttemptMetadata {
                operation_id,
                challenge_3ds: current.challenge_3ds,
                attempt: attempts.len() + 1,
            };
            let response = self
                .gateway
                .submit(
                    &current.provider,
                    current.amount_minor_units,
                    &current.currency,
                    &request.method,
                    &metadata,
                )
                .await?;

            if response.approved {
                tracing::info!(
                    provider = %current.provider,
                    attempt = metadata.attempt,
                    "payment approved"
                );
                attempts.push(AttemptRecord::new(&current, None));
                return Ok(CheckoutOutcome::Approved {
                    provider: current.provider,
                    attempts,
                });
            }

            let code = self
                .gateway
                .decline_code(&current.provider, &response)
                .unwrap_or_default();
            let outcome = self.planner.after_decline(&plan, &current.provider, &code)?;
            attempts.push(AttemptRecord::new(&current, Some(outcome.decline().clone())));

            match outcome {
                DeclineOutcome::Retry { next, .. }
                    if !attempts.iter().any(|a| a.provider == next.provider) =>
                {
                    tracing::info!(
                        from = %current.provider,
                        to = %next.provider,
                        "retrying on next provider"
                    );
                    current = next;
                }
                DeclineOutcome::Retry { decline, .. } | DeclineOutcome::Terminal { decline } => {
                    tracing::info!(
                        provider = %current.provider,
                        code = %decline.internal_code,
                        attempts = attempts.len(),
                        "payment declined"
                    );
                    return Ok(CheckoutOutcome::Declined { decline, attempts });
                }
            }
        }
    }
}
