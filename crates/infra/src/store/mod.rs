//! Workflow record storage.
//!
//! Each partnership, agreement and promotion is an independently addressable
//! record. The store exposes two operations: a read-only snapshot view and an
//! all-or-nothing transaction. Guards that span records (pair uniqueness, 1:1
//! links, source status re-validation) run inside the transaction together with
//! the write they protect.

mod in_memory;
mod tables;

pub use in_memory::InMemoryWorkflowStore;
pub use tables::Tables;

use std::sync::Arc;

use allyflow_core::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("workflow store lock poisoned")]
    Poisoned,
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Collaborator
    }
}

pub trait WorkflowStore: Send + Sync {
    /// Run `f` against a consistent snapshot of all tables.
    fn read<R>(&self, f: impl FnOnce(&Tables) -> R) -> Result<R, StoreError>;

    /// Run `f` against a working copy and commit it only if `f` succeeds.
    ///
    /// Transactions are serialized; a failed closure leaves the store untouched.
    fn transaction<R, E>(&self, f: impl FnOnce(&mut Tables) -> Result<R, E>) -> Result<R, E>
    where
        E: From<StoreError>;
}

impl<S: WorkflowStore> WorkflowStore for Arc<S> {
    fn read<R>(&self, f: impl FnOnce(&Tables) -> R) -> Result<R, StoreError> {
        (**self).read(f)
    }

    fn transaction<R, E>(&self, f: impl FnOnce(&mut Tables) -> Result<R, E>) -> Result<R, E>
    where
        E: From<StoreError>,
    {
        (**self).transaction(f)
    }
}
