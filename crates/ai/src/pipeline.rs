use allyflow_core::{DateRange, DomainError, ErrorKind};
use allyflow_text::resolve_first;
use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::draft::DraftKind;
use crate::generator::{GenerationError, TextGenerator};

/// Where a draft's fields came from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DraftSource {
    /// Every field was taken from the generated reply.
    Generated,
    /// The reply was unparseable; every field is the deterministic fallback.
    Fallback,
}

/// Result of one drafting run. Nothing has been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct Drafted<O> {
    pub output: O,
    pub source: DraftSource,
    /// Explicit dates, else dates resolved from the kind's candidate texts.
    pub period: Option<DateRange>,
    /// The raw reply, kept for diagnostics.
    pub raw: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DraftError {
    #[error(transparent)]
    Validation(#[from] DomainError),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

impl DraftError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DraftError::Validation(e) => e.kind(),
            DraftError::Generation(e) => e.kind(),
        }
    }
}

/// Validate → prompt → generate → extract (or fall back) → resolve dates.
#[derive(Debug, Clone)]
pub struct DraftingPipeline<G> {
    generator: G,
}

impl<G: TextGenerator> DraftingPipeline<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Run one drafting pass for `kind`.
    ///
    /// Validation and generator failures abort with nothing produced. A reply
    /// that cannot be parsed is replaced by the kind's fallback. A period that
    /// cannot be resolved is left empty.
    pub async fn draft<K: DraftKind>(
        &self,
        kind: &K,
        input: &K::Input,
        today: NaiveDate,
    ) -> Result<Drafted<K::Output>, DraftError> {
        kind.validate(input)?;

        let prompt = kind.prompt(input);
        debug!(kind = K::NAME, prompt_chars = prompt.chars().count(), "requesting draft");

        let raw = self.generator.generate(&prompt).await.map_err(|e| {
            warn!(kind = K::NAME, error = %e, "text generation failed");
            e
        })?;

        let (output, source) = match kind.parse(&raw) {
            Ok(output) => (output, DraftSource::Generated),
            Err(e) => {
                warn!(
                    kind = K::NAME,
                    preview = %e.preview(),
                    "generated reply unparseable, using fallback"
                );
                (kind.fallback(input, &raw), DraftSource::Fallback)
            }
        };

        let period = kind.explicit_period(input, &output).or_else(|| {
            let reference = kind.reference_date(input).unwrap_or(today);
            match resolve_first(kind.period_candidates(input, &output), reference) {
                Ok(range) => Some(range),
                Err(e) => {
                    debug!(kind = K::NAME, error = %e, "no period resolved for draft");
                    None
                }
            }
        });

        info!(
            kind = K::NAME,
            source = ?source,
            period = ?period,
            "draft produced"
        );

        Ok(Drafted {
            output,
            source,
            period,
            raw,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use allyflow_text::{ExtractError, extract};
    use serde::Deserialize;

    use crate::generator::ScriptedGenerator;

    struct Notice;

    struct NoticeInput {
        purpose: String,
        period_text: String,
        explicit: Option<(NaiveDate, NaiveDate)>,
    }

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    struct NoticeOutput {
        title: String,
        body: String,
    }

    impl DraftKind for Notice {
        type Input = NoticeInput;
        type Output = NoticeOutput;
        const NAME: &'static str = "notice";

        fn validate(&self, input: &NoticeInput) -> Result<(), DomainError> {
            if input.purpose.trim().is_empty() {
                return Err(DomainError::missing("purpose"));
            }
            if let Some((s, e)) = input.explicit {
                DateRange::new(s, e)?;
            }
            Ok(())
        }

        fn prompt(&self, input: &NoticeInput) -> String {
            format!("Write a notice about {} for {}", input.purpose, input.period_text)
        }

        fn parse(&self, raw: &str) -> Result<NoticeOutput, ExtractError> {
            extract(raw)
        }

        fn fallback(&self, input: &NoticeInput, raw: &str) -> NoticeOutput {
            NoticeOutput {
                title: input.purpose.clone(),
                body: raw.to_string(),
            }
        }

        fn explicit_period(&self, input: &NoticeInput, _output: &NoticeOutput) -> Option<DateRange> {
            input.explicit.map(|(s, e)| DateRange::ordered(s, e))
        }

        fn period_candidates<'a>(
            &self,
            input: &'a NoticeInput,
            output: &'a NoticeOutput,
        ) -> Vec<Option<&'a str>> {
            vec![Some(input.period_text.as_str()), Some(output.body.as_str())]
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn input(period_text: &str) -> NoticeInput {
        NoticeInput {
            purpose: "festival".to_string(),
            period_text: period_text.to_string(),
            explicit: None,
        }
    }

    #[tokio::test]
    async fn parsed_reply_is_generated_source() {
        let pipeline = DraftingPipeline::new(ScriptedGenerator::replying(
            "```json\n{\"title\": \"Fall festival\", \"body\": \"Join us\"}\n```",
        ));
        let drafted = pipeline
            .draft(&Notice, &input("2025-09-01 ~ 2025-09-14"), d(2025, 1, 1))
            .await
            .unwrap();

        assert_eq!(drafted.source, DraftSource::Generated);
        assert_eq!(drafted.output.title, "Fall festival");
        let period = drafted.period.unwrap();
        assert_eq!((period.start(), period.end()), (d(2025, 9, 1), d(2025, 9, 14)));
        assert_eq!(pipeline.generator().prompts()[0], "Write a notice about festival for 2025-09-01 ~ 2025-09-14");
    }

    #[tokio::test]
    async fn unparseable_reply_falls_back_entirely() {
        let pipeline = DraftingPipeline::new(ScriptedGenerator::replying(
            "Sorry, here is prose instead: 9월 1일 ~ 9월 3일",
        ));
        let drafted = pipeline.draft(&Notice, &input(""), d(2025, 1, 1)).await.unwrap();

        assert_eq!(drafted.source, DraftSource::Fallback);
        assert_eq!(
            drafted.output,
            NoticeOutput {
                title: "festival".to_string(),
                body: "Sorry, here is prose instead: 9월 1일 ~ 9월 3일".to_string(),
            }
        );
        // blank period text is skipped; the body resolves with today's year
        let period = drafted.period.unwrap();
        assert_eq!((period.start(), period.end()), (d(2025, 9, 1), d(2025, 9, 3)));
    }

    #[tokio::test]
    async fn explicit_period_wins_over_text() {
        let pipeline = DraftingPipeline::new(ScriptedGenerator::replying(
            "{\"title\": \"t\", \"body\": \"2030-01-01 ~ 2030-01-02\"}",
        ));
        let mut notice = input("2029-01-01 ~ 2029-01-02");
        notice.explicit = Some((d(2025, 5, 1), d(2025, 5, 31)));

        let drafted = pipeline.draft(&Notice, &notice, d(2025, 1, 1)).await.unwrap();
        assert_eq!(drafted.period.unwrap().end(), d(2025, 5, 31));
    }

    #[tokio::test]
    async fn unresolvable_period_is_left_empty() {
        let pipeline = DraftingPipeline::new(ScriptedGenerator::replying(
            "{\"title\": \"t\", \"body\": \"dates to be agreed\"}",
        ));
        let drafted = pipeline.draft(&Notice, &input("TBD"), d(2025, 1, 1)).await.unwrap();
        assert_eq!(drafted.period, None);
    }

    #[tokio::test]
    async fn validation_fails_before_generation() {
        let pipeline = DraftingPipeline::new(ScriptedGenerator::replying("unused"));
        let mut notice = input("");
        notice.explicit = Some((d(2025, 5, 31), d(2025, 5, 1)));

        let err = pipeline.draft(&Notice, &notice, d(2025, 1, 1)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(pipeline.generator().calls(), 0);
    }

    #[tokio::test]
    async fn generator_failures_propagate_unchanged() {
        let blocked = GenerationError::ContentBlocked {
            reason: "SAFETY".to_string(),
        };
        let pipeline = DraftingPipeline::new(ScriptedGenerator::failing(blocked.clone()));

        let err = pipeline.draft(&Notice, &input(""), d(2025, 1, 1)).await.unwrap_err();
        assert_eq!(err, DraftError::Generation(blocked));
        assert_eq!(err.kind(), ErrorKind::Collaborator);
    }
}
