use allyflow_agreements::Agreement;
use allyflow_ai::DraftKind;
use allyflow_core::{DateRange, DomainError, has_text, period::check_optional_range};
use allyflow_promotions::BodyClauses;
use allyflow_text::{ExtractError, extract, strip_fences};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::collaborators::ListingSnapshot;

pub const FALLBACK_TITLE: &str = "기본 제목";
pub const FALLBACK_CONTENT: &str = "기본 내용";

/// Approved agreement plus its originating listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotionInput {
    pub clauses: BodyClauses,
    pub agreement_period: String,
    pub agreement_body: String,
    pub agreement_range: Option<DateRange>,
    pub listing: ListingSnapshot,
    listing_range: Option<String>,
}

impl PromotionInput {
    pub fn new(agreement: &Agreement, listing: Option<ListingSnapshot>) -> Self {
        let listing = listing.unwrap_or_default();
        Self {
            clauses: BodyClauses::extract(agreement.content()),
            agreement_period: agreement.clauses().target_period.clone(),
            agreement_body: agreement.content().to_string(),
            agreement_range: agreement.period(),
            listing_range: listing.range_text(),
            listing,
        }
    }
}

/// Generated headline and body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PromotionCopy {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PromotionDraftKind;

impl DraftKind for PromotionDraftKind {
    type Input = PromotionInput;
    type Output = PromotionCopy;
    const NAME: &'static str = "promotion";

    fn validate(&self, input: &PromotionInput) -> Result<(), DomainError> {
        check_optional_range(input.listing.start, input.listing.end)
    }

    fn prompt(&self, input: &PromotionInput) -> String {
        format!(
            "아래 정보를 바탕으로 홍보 게시글을 350자-500자 내외로 작성\n\
             \n\
             ## 계약 정보\n\
             * **제휴 대상**: {target}\n\
             * **기간**: {period}\n\
             * **혜택**: {benefit}\n\
             * **조건**: {condition}\n\
             \n\
             ## 게시글 정보\n\
             * **제목**: {title}\n\
             * **내용**: {body}\n\
             \n\
             ## 작성 조건\n\
             * **다음과 같은 섹션을 포함할 것:** 💚 대상, 💚 혜택, 💚 기간\n\
             * **핵심 내용(대상, 혜택, 기간, 조건)은 목록 형태로 명확하게 정리**\n\
             * **마지막 문단에는 마무리 문구를 1-2문장 사용**\n\
             * 게시글의 내용과 관련된 이모티콘을 적절히 사용\n\
             * 응답은 JSON 형식으로 반환: {{\"title\": \"...\", \"content\": \"...\"}}\n",
            target = input.clauses.target,
            period = input.clauses.period,
            benefit = input.clauses.benefit,
            condition = input.clauses.condition,
            title = input.listing.title,
            body = input.listing.body,
        )
    }

    fn parse(&self, raw: &str) -> Result<PromotionCopy, ExtractError> {
        extract(raw)
    }

    fn fallback(&self, input: &PromotionInput, raw: &str) -> PromotionCopy {
        let title = if has_text(Some(input.listing.title.as_str())) {
            input.listing.title.trim().to_string()
        } else {
            FALLBACK_TITLE.to_string()
        };
        let body = strip_fences(raw);
        PromotionCopy {
            title,
            content: if body.is_empty() {
                FALLBACK_CONTENT.to_string()
            } else {
                body
            },
        }
    }

    fn explicit_period(&self, input: &PromotionInput, _output: &PromotionCopy) -> Option<DateRange> {
        input.agreement_range
    }

    fn period_candidates<'a>(
        &self,
        input: &'a PromotionInput,
        _output: &'a PromotionCopy,
    ) -> Vec<Option<&'a str>> {
        vec![
            Some(input.agreement_period.as_str()),
            input.clauses.period_text(),
            input.listing_range.as_deref(),
            Some(input.agreement_body.as_str()),
        ]
    }

    fn reference_date(&self, input: &PromotionInput) -> Option<NaiveDate> {
        input.listing.start
    }
}
