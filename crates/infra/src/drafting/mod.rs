//! Document kinds run through the drafting pipeline: the inquiry message, the
//! agreement, the promotion copy and a store's own benefit post.

pub mod agreement;
pub mod benefit;
pub mod inquiry;
pub mod promotion;

pub use agreement::{AgreementDraft, AgreementDraftKind, AgreementInput};
pub use benefit::{BenefitDraftKind, BenefitInput};
pub use inquiry::{InquiryDraftKind, InquiryInput};
pub use promotion::{PromotionCopy, PromotionDraftKind, PromotionInput};
