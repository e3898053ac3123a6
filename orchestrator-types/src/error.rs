//! Error types for the payment orchestrator.

use crate::domain::{
    CurrencyCode, MethodId, OperationId, OperationStatus, ProviderId, SettlementStep,
    TransactionId, TransactionStatus,
};

/// Domain-level errors (operation and transaction invariant violations).
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch {
        expected: CurrencyCode,
        got: CurrencyCode,
    },

    #[error("Amount overflow in {0} minor units")]
    AmountOverflow(CurrencyCode),

    #[error("Invalid currency code: {0:?}")]
    InvalidCurrencyCode(String),

    #[error("Invalid country code: {0:?}")]
    InvalidCountryCode(String),

    #[error("Settlement step cannot move from {from} back to {to}")]
    StepRegression {
        from: SettlementStep,
        to: SettlementStep,
    },

    #[error("Settlement step cannot skip from {from} to {to}")]
    StepSkipped {
        from: SettlementStep,
        to: SettlementStep,
    },

    #[error("Operation {id} has no successful transaction for {step}")]
    LegNotSettled {
        id: OperationId,
        step: SettlementStep,
    },

    #[error("Operation {id} is {status} and can no longer change")]
    OperationTerminal {
        id: OperationId,
        status: OperationStatus,
    },

    #[error("Transaction {id} cannot move from {from} to {to}")]
    InvalidStatusTransition {
        id: TransactionId,
        from: TransactionStatus,
        to: TransactionStatus,
    },

    #[error("Transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Errors raised while converting amounts or resolving providers.
#[derive(Debug, thiserror::Error)]
pub enum RoutingError {
    #[error("Provider {provider} has no currency rule for {currency}")]
    UnsupportedCurrency {
        provider: ProviderId,
        currency: CurrencyCode,
    },

    #[error("Unknown provider: {0}")]
    UnknownProvider(ProviderId),

    #[error("Amount {0} does not fit the provider wire format")]
    AmountOutOfRange(String),
}

/// Configuration errors. Any of these aborts start-up.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Provider {provider} is active but has no {table} table")]
    MissingTable {
        provider: ProviderId,
        table: &'static str,
    },

    #[error("Provider {0} is declared more than once")]
    DuplicateProvider(ProviderId),

    #[error("Provider {0} is active but lists no environments")]
    NoEnvironments(ProviderId),

    #[error("Provider {provider} has a non-positive multiplier for {key}")]
    InvalidMultiplier { provider: ProviderId, key: String },

    #[error("Invalid card mask for method {method}: {source}")]
    InvalidMask {
        method: MethodId,
        #[source]
        source: regex::Error,
    },

    #[error("Purchase item {0} must last at least one day")]
    InvalidDuration(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Repository-level errors (operation store failures).
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Store error: {0}")]
    Backend(String),

    #[error("Entity not found")]
    NotFound,
}

/// Gateway port errors. Declines are not errors; these are transport failures.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Gateway {0} is unavailable")]
    Unavailable(ProviderId),

    #[error("Gateway {provider} rejected the request: {reason}")]
    Rejected { provider: ProviderId, reason: String },
}

/// Application-level errors returned by the orchestration service.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Domain(DomainError::TransactionNotFound(id)) => {
                AppError::NotFound(format!("Transaction not found: {}", id))
            }
            RepoError::Domain(e) => AppError::BadRequest(e.to_string()),
            RepoError::NotFound => AppError::NotFound("Resource not found".into()),
            RepoError::Backend(e) => AppError::Internal(e),
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        AppError::from(RepoError::Domain(err))
    }
}
