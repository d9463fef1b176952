//! Agreement domain module (bilateral document with sequential signing).
//!
//! This crate contains business rules for agreements, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage). The guard that an
//! agreement may only be created from an accepted partnership, once, is
//! checked by the caller against the partnership record.

pub mod agreement;

pub use agreement::{
    AdvanceAgreement, Agreement, AgreementClauses, AgreementCommand, AgreementCreated,
    AgreementDraftUpdated, AgreementEvent, AgreementStatus, CreateAgreement, Signer,
    StatusAdvanced, Transition, UpdateDraft,
};
