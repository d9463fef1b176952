use allyflow_agreements::AgreementClauses;
use allyflow_ai::DraftKind;
use allyflow_core::{DomainError, has_text, period::check_optional_range};
use allyflow_text::{ExtractError, extract};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::collaborators::ListingSnapshot;

pub const FALLBACK_ROLE: &str = "상호 협의된 역할과 의무";
pub const FALLBACK_EFFECT: &str = "효력 관련 조항";
pub const FALLBACK_ETC: &str = "기타 조항";

/// Partnership and listing facts an agreement is drafted from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgreementInput {
    pub purpose: String,
    pub detail: String,
    pub period_value: String,
    pub listing: Option<ListingSnapshot>,
    listing_range: Option<String>,
}

impl AgreementInput {
    pub fn new(
        purpose: impl Into<String>,
        detail: impl Into<String>,
        period_value: impl Into<String>,
        listing: Option<ListingSnapshot>,
    ) -> Self {
        let listing_range = listing.as_ref().and_then(ListingSnapshot::range_text);
        Self {
            purpose: purpose.into(),
            detail: detail.into(),
            period_value: period_value.into(),
            listing,
            listing_range,
        }
    }

    /// Resolver inputs in preference order: the period clause, the body, the
    /// partnership period text, then the listing's own range.
    pub fn period_candidates<'a>(
        &'a self,
        clauses: &'a AgreementClauses,
        content: &'a str,
    ) -> Vec<Option<&'a str>> {
        vec![
            Some(clauses.target_period.as_str()),
            Some(content),
            Some(self.period_value.as_str()),
            self.listing_range.as_deref(),
        ]
    }

    /// Year source for partial dates.
    pub fn reference_date(&self) -> Option<NaiveDate> {
        self.listing.as_ref().and_then(|l| l.start)
    }
}

/// Clause fields plus the full document body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgreementDraft {
    pub clauses: AgreementClauses,
    pub content: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AgreementReply {
    purpose: String,
    target_period: String,
    benefit_condition: String,
    role: String,
    effect: String,
    etc: String,
    content: String,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct AgreementDraftKind;

impl DraftKind for AgreementDraftKind {
    type Input = AgreementInput;
    type Output = AgreementDraft;
    const NAME: &'static str = "agreement";

    fn validate(&self, input: &AgreementInput) -> Result<(), DomainError> {
        if !has_text(Some(input.purpose.as_str())) {
            return Err(DomainError::missing("purpose"));
        }
        if let Some(listing) = &input.listing {
            check_optional_range(listing.start, listing.end)?;
        }
        Ok(())
    }

    fn prompt(&self, input: &AgreementInput) -> String {
        let listing = input.listing.clone().unwrap_or_default();
        let date = |d: Option<NaiveDate>| d.map(|d| d.to_string()).unwrap_or_default();
        format!(
            "너는 기업과 기관 간의 제휴 협약서를 작성하는 AI 비서야.\n\
             JSON 형식으로만 응답하라.\n\
             \n\
             {{\n\
             \x20 \"purpose\": \"...\",\n\
             \x20 \"targetPeriod\": \"YYYY-MM-DD ~ YYYY-MM-DD\",\n\
             \x20 \"benefitCondition\": \"...\",\n\
             \x20 \"role\": \"...\",\n\
             \x20 \"effect\": \"...\",\n\
             \x20 \"etc\": \"...\",\n\
             \x20 \"content\": \"전체 협약서 본문\"\n\
             }}\n\
             \n\
             [제휴 모집글 정보]\n\
             제목: {title}\n\
             대상: {target}\n\
             기간: {start} ~ {end}\n\
             혜택: {benefit}\n\
             조건: {condition}\n\
             \n\
             [제휴 문의글 정보]\n\
             목적: {purpose}\n\
             상세 내용: {detail}\n\
             기간: {period}\n",
            title = listing.title,
            target = listing.target,
            start = date(listing.start),
            end = date(listing.end),
            benefit = listing.benefit,
            condition = listing.condition,
            purpose = input.purpose,
            detail = input.detail,
            period = input.period_value,
        )
    }

    fn parse(&self, raw: &str) -> Result<AgreementDraft, ExtractError> {
        let reply: AgreementReply = extract(raw)?;
        Ok(AgreementDraft {
            clauses: AgreementClauses {
                purpose: reply.purpose,
                target_period: reply.target_period,
                benefit_condition: reply.benefit_condition,
                role: reply.role,
                effect: reply.effect,
                etc: reply.etc,
            },
            content: reply.content,
        })
    }

    fn fallback(&self, input: &AgreementInput, raw: &str) -> AgreementDraft {
        AgreementDraft {
            clauses: AgreementClauses {
                purpose: input.purpose.clone(),
                target_period: input.period_value.clone(),
                benefit_condition: input.detail.clone(),
                role: FALLBACK_ROLE.to_string(),
                effect: FALLBACK_EFFECT.to_string(),
                etc: FALLBACK_ETC.to_string(),
            },
            content: raw.trim().to_string(),
        }
    }

    fn period_candidates<'a>(
        &self,
        input: &'a AgreementInput,
        output: &'a AgreementDraft,
    ) -> Vec<Option<&'a str>> {
        input.period_candidates(&output.clauses, &output.content)
    }

    fn reference_date(&self, input: &AgreementInput) -> Option<NaiveDate> {
        input.reference_date()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing() -> ListingSnapshot {
        ListingSnapshot {
            title: "가을 축제 제휴 모집".to_string(),
            target: "재학생".to_string(),
            benefit: "음료 할인".to_string(),
            condition: "학생증 제시".to_string(),
            body: "축제 기간 제휴처를 모집합니다".to_string(),
            start: NaiveDate::from_ymd_opt(2025, 9, 1),
            end: NaiveDate::from_ymd_opt(2025, 9, 30),
        }
    }

    fn input() -> AgreementInput {
        AgreementInput::new("학생 복지 증진", "10% 할인", "3개월", Some(listing()))
    }

    #[test]
    fn prompt_embeds_listing_and_partnership() {
        let prompt = AgreementDraftKind.prompt(&input());
        assert!(prompt.contains("제목: 가을 축제 제휴 모집"));
        assert!(prompt.contains("기간: 2025-09-01 ~ 2025-09-30"));
        assert!(prompt.contains("목적: 학생 복지 증진"));
        assert!(prompt.contains("\"targetPeriod\""));
    }

    #[test]
    fn complete_reply_maps_every_clause() {
        let raw = r#"```json
{"purpose":"복지","targetPeriod":"2025-09-01 ~ 2025-09-14","benefitCondition":"할인",
 "role":"역할","effect":"효력","etc":"기타","content":"본문"}
```"#;
        let draft = AgreementDraftKind.parse(raw).unwrap();
        assert_eq!(draft.clauses.target_period, "2025-09-01 ~ 2025-09-14");
        assert_eq!(draft.content, "본문");
    }

    #[test]
    fn partial_reply_is_rejected_whole() {
        assert!(AgreementDraftKind.parse(r#"{"purpose":"복지"}"#).is_err());
    }

    #[test]
    fn fallback_uses_partnership_facts_and_fixed_clauses() {
        let draft = AgreementDraftKind.fallback(&input(), "  자유 형식 답변  ");
        assert_eq!(draft.clauses.purpose, "학생 복지 증진");
        assert_eq!(draft.clauses.target_period, "3개월");
        assert_eq!(draft.clauses.benefit_condition, "10% 할인");
        assert_eq!(draft.clauses.role, FALLBACK_ROLE);
        assert_eq!(draft.clauses.effect, FALLBACK_EFFECT);
        assert_eq!(draft.clauses.etc, FALLBACK_ETC);
        assert_eq!(draft.content, "자유 형식 답변");
    }

    #[test]
    fn listing_range_is_the_last_candidate() {
        let input = input();
        let draft = AgreementDraftKind.fallback(&input, "");
        let candidates = AgreementDraftKind.period_candidates(&input, &draft);
        assert_eq!(candidates.last().copied().flatten(), Some("2025-09-01 ~ 2025-09-30"));
        assert_eq!(AgreementDraftKind.reference_date(&input), NaiveDate::from_ymd_opt(2025, 9, 1));
    }

    #[test]
    fn inverted_listing_dates_fail_validation() {
        let mut bad = listing();
        bad.end = NaiveDate::from_ymd_opt(2025, 8, 1);
        let input = AgreementInput::new("복지", "할인", "3개월", Some(bad));
        assert!(AgreementDraftKind.validate(&input).is_err());
    }
}
