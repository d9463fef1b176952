//! Application-level error for the workflow services.
//!
//! Wraps every failure a service call can surface, and classifies it into the
//! four caller-facing kinds through [`WorkflowError::kind`].

use allyflow_ai::{DraftError, GenerationError};
use allyflow_core::{DomainError, ErrorKind};
use thiserror::Error;

use crate::collaborators::{DirectoryError, FileStoreError};
use crate::store::StoreError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    /// Validation, state conflict or missing record (deterministic).
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The text-generation service failed.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// Account or listing lookup failed.
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// Image upload failed.
    #[error(transparent)]
    FileStore(#[from] FileStoreError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<DraftError> for WorkflowError {
    fn from(value: DraftError) -> Self {
        match value {
            DraftError::Validation(e) => WorkflowError::Domain(e),
            DraftError::Generation(e) => WorkflowError::Generation(e),
        }
    }
}

impl WorkflowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WorkflowError::Domain(e) => e.kind(),
            WorkflowError::Generation(e) => e.kind(),
            WorkflowError::Directory(e) => e.kind(),
            WorkflowError::FileStore(e) => e.kind(),
            WorkflowError::Store(e) => e.kind(),
        }
    }

    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            WorkflowError::Domain(e) => Some(e),
            _ => None,
        }
    }
}
