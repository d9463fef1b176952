use allyflow_ai::DraftKind;
use allyflow_core::{DateRange, DomainError, has_text, period::check_optional_range};
use allyflow_text::{ExtractError, school_name, strip_fences};
use chrono::NaiveDate;

/// Used when neither the title nor the target names a university.
pub const DEFAULT_SCHOOL: &str = "00대학교";

const IMAGE_ATTACHED: &str = "(이미지 첨부됨)";

/// A store's own benefit post: copy fields typed in by the owner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BenefitInput {
    pub title: String,
    pub target: String,
    pub benefit: String,
    pub condition: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub has_image: bool,
}

impl BenefitInput {
    /// University named in the title, else in the target.
    pub fn school(&self) -> &str {
        school_name(&self.title)
            .or_else(|| school_name(&self.target))
            .unwrap_or(DEFAULT_SCHOOL)
    }

    fn period_text(&self) -> String {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => format!("{start} ~ {end}"),
            (Some(start), None) => format!("{start} ~"),
            (None, Some(end)) => format!("~ {end}"),
            (None, None) => "상시".to_string(),
        }
    }

    /// The sample post the model is asked to adapt. Also the fallback body.
    fn template(&self) -> String {
        let period = self.period_text();
        let mut text = format!(
            "저희는 {school} {target}분들을 위해 특별한 이벤트를 준비했습니다.\n\
             {period} 동안, 저희 매장을 방문하시는 {target}분들께 {benefit} 혜택을 제공합니다.\n\
             \n\
             이번 이벤트는 저희 매장을 아껴주시는 고객님들께 보답하고자 마련했습니다.\n\
             친구, 가족, 혹은 연인과 함께 방문하셔서 저희가 준비한 혜택을 마음껏 누리시고 즐거운 추억을 만들어 가세요!\n\
             이용 시 {condition} 부탁드립니다.\n\
             \n\
             📅 이벤트 기간\n\
             {period}\n\
             \n\
             🎯 이벤트 대상\n\
             {target}\n\
             \n\
             💬 문의 안내\n\
             문의는 매장으로 직접 방문하시거나, 아래 연락처로 문의해주시기 바랍니다.",
            school = self.school(),
            target = self.target.trim(),
            benefit = self.benefit.trim(),
            condition = self.condition.trim(),
        );
        if self.has_image {
            text.push('\n');
            text.push_str(IMAGE_ATTACHED);
        }
        text
    }
}

/// Body copy of a benefit post, adapted from a fixed sample.
#[derive(Debug, Default, Clone, Copy)]
pub struct BenefitDraftKind;

impl DraftKind for BenefitDraftKind {
    type Input = BenefitInput;
    type Output = String;
    const NAME: &'static str = "benefit";

    fn validate(&self, input: &BenefitInput) -> Result<(), DomainError> {
        check_optional_range(input.start_date, input.end_date)?;
        let required = [
            ("title", &input.title),
            ("target", &input.target),
            ("benefit", &input.benefit),
            ("condition", &input.condition),
        ];
        for (field, value) in required {
            if !has_text(Some(value.as_str())) {
                return Err(DomainError::missing(field));
            }
        }
        Ok(())
    }

    fn prompt(&self, input: &BenefitInput) -> String {
        format!(
            "너는 아래 '원본 텍스트'를 참고하여, 명시된 규칙에 따라 빈칸을 채우거나 일부 문구를 수정하여 최종 본문만 출력한다.\n\
             - 이모지 사용 규칙\n\
             \x20   1) 이모지 리스트 `[☺️😊😚🙌🏻🤝🏻🤙🏻🙏🏻🍀⭐️💌📍❗️💬📢🕒]`에서 3개를 무작위로 선택\n\
             \x20   2) 1문단과 2문단 본문 내용에서만 적절히 배치\n\
             \x20   3) 이모지는 문장 중간에 삽입 금지\n\
             \x20   4) 📅 이벤트 기간, 🎯 이벤트 대상, 💬 문의 안내 섹션과 해당 섹션의 본문에는 이모지 사용 금지\n\
             - 불필요한 접두/접미 문장, 설명, 따옴표, 코드블록 금지\n\
             - 300~500자 내외, 문단은 샘플처럼 2개 본문 + 3개 섹션으로 구성\n\
             \n\
             [입력 값]\n\
             - 제목: {title}\n\
             - 대상: {target}\n\
             - 기간: {period}\n\
             - 혜택: {benefit}\n\
             - 조건: {condition}\n\
             \n\
             [원본 텍스트]\n\
             {template}\n",
            title = input.title.trim(),
            target = input.target.trim(),
            period = input.period_text(),
            benefit = input.benefit.trim(),
            condition = input.condition.trim(),
            template = input.template(),
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

    fn fallback(&self, input: &BenefitInput, _raw: &str) -> String {
        input.template()
    }

    fn explicit_period(&self, input: &BenefitInput, _output: &String) -> Option<DateRange> {
        match (input.start_date, input.end_date) {
            (Some(start), Some(end)) => DateRange::new(start, end).ok(),
            _ => None,
        }
    }
}
