//! Promotion publication domain module.
//!
//! A promotion is the public listing produced from an approved agreement. This
//! crate holds the draft-to-published lifecycle and the clause extraction used
//! to seed promotion copy from an agreement body. The one-promotion-per-agreement
//! guard is a store-level check enforced by the caller.

pub mod clauses;
pub mod promotion;

pub use clauses::BodyClauses;
pub use promotion::{
    CreatePromotion, DeletePromotion, Promotion, PromotionCommand, PromotionContent,
    PromotionCreated, PromotionDeleted, PromotionDraftSaved, PromotionEvent, PromotionPatch,
    PromotionPublished, PromotionRepublished, PromotionStatus, PublishPromotion,
    RepublishPromotion, SaveDraft,
};
