use allyflow_ai::DraftKind;
use allyflow_core::{DomainError, has_text};
use allyflow_partnerships::{Keywords, OrganizationDescriptor, PeriodDescriptor};
use allyflow_text::{ExtractError, strip_fences};

/// Inputs of an inquiry message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InquiryInput {
    pub purpose: String,
    pub period: PeriodDescriptor,
    pub organization: OrganizationDescriptor,
    pub detail: String,
    pub keywords: Keywords,
}

/// Plain-prose partnership proposal (300 to 500 characters).
#[derive(Debug, Default, Clone, Copy)]
pub struct InquiryDraftKind;

impl DraftKind for InquiryDraftKind {
    type Input = InquiryInput;
    type Output = String;
    const NAME: &'static str = "inquiry";

    fn validate(&self, input: &InquiryInput) -> Result<(), DomainError> {
        if !has_text(Some(input.purpose.as_str())) {
            return Err(DomainError::missing("purpose"));
        }
        if !has_text(Some(input.period.value.as_str())) {
            return Err(DomainError::missing("period_value"));
        }
        if !has_text(Some(input.detail.as_str())) {
            return Err(DomainError::missing("detail"));
        }
        Ok(())
    }

    fn prompt(&self, input: &InquiryInput) -> String {
        format!(
            "당신은 제휴 요청 홍보 담당자입니다.\n\
             아래 입력값을 참고하여 제휴 제안/홍보글을 작성하세요.\n\
             \n\
             [제휴 요청 정보]\n\
             - 제휴 목적: {purpose}\n\
             - 제휴 기간: {period_value} {period_kind}\n\
             - 우리 단체: {org_kind} {org_value}\n\
             - 세부 내용: {detail}\n\
             - 요청 키워드: {keywords}\n\
             \n\
             [작성 규칙]\n\
             1) 분량: 300~500자\n\
             2) 문단: 인사/소개 → 제휴 필요성 → 기대 효과/혜택 → 마무리\n\
             3) 문체: 요청 키워드 반영 (예: 친절함, 간결함, 예의, 설득력, 따뜻함 등)\n\
             4) 이모지: ☺️😊🙌🏻🤝🏻🙏🏻🍀⭐️💌📍📢 중 2~3개 사용 (본문 안에서)\n\
             5) 불필요한 설명, 코드블록, 따옴표 금지\n",
            purpose = input.purpose,
            period_value = input.period.value,
            period_kind = input.period.kind,
            org_kind = input.organization.kind,
            org_value = input.organization.value,
            detail = input.detail,
            keywords = input.keywords.joined(),
        )
    }

    fn parse(&self, raw: &str) -> Result<String, ExtractError> {
        let text = strip_fences(raw);
        if text.is_empty() {
            return Err(ExtractError::Unparseable {
                preview: String::new(),
                reason: "reply is blank after removing fences".to_string(),
            });
        }
        Ok(text)
    }

    fn fallback(&self, input: &InquiryInput, _raw: &str) -> String {
        let sender = if input.organization.value.is_empty() {
            input.organization.kind.to_string()
        } else {
            input.organization.value.clone()
        };
        format!(
            "안녕하세요, {sender}입니다.\n\n\
             {purpose}을(를) 위해 {period} 동안의 제휴를 제안드립니다.\n\n\
             {detail}\n\n\
             긍정적인 검토 부탁드립니다. 감사합니다.",
            purpose = input.purpose.trim(),
            period = input.period.value,
            detail = input.detail.trim(),
        )
    }
}
