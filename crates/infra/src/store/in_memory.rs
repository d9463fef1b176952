use std::sync::RwLock;

use super::{StoreError, Tables, WorkflowStore};

/// In-memory workflow store.
///
/// Intended for tests/dev. Every transaction clones the tables, so it is not
/// optimized for large data sets.
#[derive(Debug, Default)]
pub struct InMemoryWorkflowStore {
    tables: RwLock<Tables>,
}

impl InMemoryWorkflowStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WorkflowStore for InMemoryWorkflowStore {
    fn read<R>(&self, f: impl FnOnce(&Tables) -> R) -> Result<R, StoreError> {
        let tables = self.tables.read().map_err(|_| StoreError::Poisoned)?;
        Ok(f(&tables))
    }

    fn transaction<R, E>(&self, f: impl FnOnce(&mut Tables) -> Result<R, E>) -> Result<R, E>
    where
        E: From<StoreError>,
    {
        let mut tables = self.tables.write().map_err(|_| StoreError::Poisoned)?;
        let mut working = tables.clone();
        let out = f(&mut working)?;
        *tables = working;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use allyflow_core::{AgreementId, DomainError};
    use allyflow_partnerships::Partnership;

    #[derive(Debug, PartialEq)]
    enum TestError {
        Store(StoreError),
        Domain(DomainError),
    }

    impl From<StoreError> for TestError {
        fn from(e: StoreError) -> Self {
            TestError::Store(e)
        }
    }

    #[test]
    fn failed_transaction_commits_nothing() {
        let store = InMemoryWorkflowStore::new();
        let id = allyflow_core::PartnershipId::new();

        let result: Result<(), TestError> = store.transaction(|tables| {
            tables.insert_partnership(Partnership::empty(id));
            Err(TestError::Domain(DomainError::conflict("abort")))
        });
        assert!(result.is_err());

        let present = store
            .read(|tables| tables.partnership(id).is_ok())
            .unwrap();
        assert!(!present);
    }

    #[test]
    fn missing_records_are_not_found() {
        let store = InMemoryWorkflowStore::new();
        let err = store
            .read(|tables| tables.agreement(AgreementId::new()).map(|_| ()))
            .unwrap()
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "agreement", .. }));
    }
}
