//! Partnership inquiry domain module.
//!
//! This crate contains the inquiry-to-acceptance lifecycle between two
//! accounts, implemented purely as deterministic domain logic (no IO, no
//! HTTP, no storage). Uniqueness per (sender, receiver) pair is a store-level
//! guard enforced by the caller.

pub mod descriptor;
pub mod partnership;

pub use descriptor::{Keywords, OrgKind, OrganizationDescriptor, PeriodDescriptor, PeriodKind};
pub use partnership::{
    AcceptInquiry, AcceptedStatus, CreatePartnership, DeclineInquiry, DeletePartnership,
    EditContent, InquiryAccepted, InquiryDeclined, InquirySubmitted, Partnership,
    PartnershipCommand, PartnershipContentEdited, PartnershipCreated, PartnershipDeleted,
    PartnershipEvent, SendStatus, SubmitInquiry,
};
