//! Domain error model.

use core::fmt::Display;

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Coarse classification surfaced to callers.
///
/// Every error in the workspace maps onto exactly one of these kinds.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad input. Never retried.
    Validation,
    /// Wrong status, duplicate creation, identity mismatch or stale version.
    /// The caller should refresh state instead of retrying blindly.
    StateConflict,
    /// A referenced record is absent.
    NotFound,
    /// An external collaborator (text generation, file store, directory) failed.
    Collaborator,
}

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// invariants, conflicts). Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (missing field, inverted range, bad category).
    #[error("validation failed on `{field}`: {message}")]
    Validation { field: &'static str, message: String },

    /// A transition was attempted from the wrong status.
    #[error("{entity} is {actual}, expected {expected}")]
    InvalidState {
        entity: &'static str,
        expected: String,
        actual: String,
    },

    /// The caller is not the account recorded for this step.
    #[error("only the recorded {role} may perform this {entity} transition")]
    IdentityMismatch {
        entity: &'static str,
        role: &'static str,
    },

    /// A uniqueness guard rejected a creation.
    #[error("{entity} already exists: {detail}")]
    AlreadyExists { entity: &'static str, detail: String },

    /// Stale version / optimistic concurrency.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A requested record was not found.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
}

impl DomainError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn missing(field: &'static str) -> Self {
        Self::validation(field, "required field is missing")
    }

    pub fn invalid_state(entity: &'static str, expected: impl Display, actual: impl Display) -> Self {
        Self::InvalidState {
            entity,
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    pub fn identity_mismatch(entity: &'static str, role: &'static str) -> Self {
        Self::IdentityMismatch { entity, role }
    }

    pub fn already_exists(entity: &'static str, detail: impl Into<String>) -> Self {
        Self::AlreadyExists {
            entity,
            detail: detail.into(),
        }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found(entity: &'static str, id: impl Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::Validation { .. } => ErrorKind::Validation,
            DomainError::InvalidState { .. }
            | DomainError::IdentityMismatch { .. }
            | DomainError::AlreadyExists { .. }
            | DomainError::Conflict(_) => ErrorKind::StateConflict,
            DomainError::NotFound { .. } => ErrorKind::NotFound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_state_reports_expected_and_actual() {
        let err = DomainError::invalid_state("agreement", "SENT", "GENERATED");
        assert_eq!(err.to_string(), "agreement is GENERATED, expected SENT");
        assert_eq!(err.kind(), ErrorKind::StateConflict);
    }

    #[test]
    fn validation_names_the_field() {
        let err = DomainError::missing("purpose");
        assert!(err.to_string().contains("`purpose`"));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn guards_classify_as_state_conflict() {
        assert_eq!(
            DomainError::already_exists("promotion", "agreement 1").kind(),
            ErrorKind::StateConflict
        );
        assert_eq!(
            DomainError::identity_mismatch("agreement", "sender").kind(),
            ErrorKind::StateConflict
        );
        assert_eq!(DomainError::not_found("agreement", 7).kind(), ErrorKind::NotFound);
    }
}
