//! Operation store port.
//!
//! The surrounding order workflow owns operations and their transactions;
//! the core only reads consistent snapshots through this trait.

use crate::domain::{Operation, OperationId};
use crate::error::RepoError;

/// Read access to operations and their recorded transactions.
///
/// A returned operation is a snapshot: later legs may land in the store
/// while the caller is still computing over it.
#[async_trait::async_trait]
pub trait OperationStore: Send + Sync + 'static {
    /// Gets an operation, with its transactions, by ID.
    async fn get_operation(&self, id: OperationId) -> Result<Option<Operation>, RepoError>;
}
