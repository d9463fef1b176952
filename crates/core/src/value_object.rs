//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have no identity and are **immutable**: two instances with the
/// same attribute values are the same value. `DateRange` and the lifecycle
/// descriptors (period, organization, clause sets) are value objects; the
/// partnership, agreement and promotion records are aggregates.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
