//! In-memory operation store.

use async_trait::async_trait;
use dashmap::DashMap;
use orchestrator_types::{DomainError, Operation, OperationId, OperationStore, RepoError};

/// Operation store backed by a concurrent map.
///
/// `update` holds the entry's shard lock for the duration of the closure, so
/// two updates of the same operation never interleave.
#[derive(Debug, Default)]
pub struct InMemoryOperationStore {
    operations: DashMap<OperationId, Operation>,
}

impl InMemoryOperationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an operation.
    pub fn insert(&self, operation: Operation) {
        tracing::debug!(operation_id = %operation.id, step = %operation.step(), "operation stored");
        self.operations.insert(operation.id, operation);
    }

    /// Applies `f` to the stored operation.
    pub fn update<T>(
        &self,
        id: OperationId,
        f: impl FnOnce(&mut Operation) -> Result<T, DomainError>,
    ) -> Result<T, RepoError> {
        let mut entry = self.operations.get_mut(&id).ok_or(RepoError::NotFound)?;
        f(entry.value_mut()).map_err(RepoError::Domain)
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

#[async_trait]
impl OperationStore for InMemoryOperationStore {
    async fn get_operation(&self, id: OperationId) -> Result<Option<Operation>, RepoError> {
        Ok(self.operations.get(&id).map(|entry| entry.value().clone()))
    }
}
