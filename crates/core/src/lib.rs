//! `allyflow-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by the partnership,
//! agreement and promotion lifecycles (no infrastructure concerns).

pub mod aggregate;
pub mod error;
pub mod event;
pub mod id;
pub mod period;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateRoot, ExpectedVersion};
pub use error::{DomainError, DomainResult, ErrorKind};
pub use event::Event;
pub use id::{AccountId, AgreementId, ListingId, PartnershipId, PromotionId};
pub use period::DateRange;
pub use value_object::ValueObject;

/// Returns `true` when the string is present and contains non-whitespace text.
pub fn has_text(value: Option<&str>) -> bool {
    value.is_some_and(|s| !s.trim().is_empty())
}
