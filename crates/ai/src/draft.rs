use allyflow_core::{DateRange, DomainError};
use allyflow_text::ExtractError;
use chrono::NaiveDate;

/// One kind of generated document (inquiry message, agreement, promotion copy).
///
/// A kind owns everything that is specific to its document: input validation,
/// the prompt template, how the reply maps onto the output record, and the
/// deterministic fallback. The pipeline owns the order of those steps.
///
/// Implementations must be pure. `parse` either yields a complete output or
/// fails; it never fills some fields from the reply and others from defaults.
pub trait DraftKind: Send + Sync {
    type Input: Send + Sync;
    type Output: Send;

    /// Stable name used in logs (e.g. "agreement").
    const NAME: &'static str;

    /// Reject missing required inputs and inverted explicit dates.
    fn validate(&self, input: &Self::Input) -> Result<(), DomainError>;

    /// Render the fixed prompt template with the inputs embedded verbatim.
    fn prompt(&self, input: &Self::Input) -> String;

    /// Map a raw reply onto the output record.
    fn parse(&self, raw: &str) -> Result<Self::Output, ExtractError>;

    /// Output built from the inputs alone. `raw` is the unparseable reply, which
    /// a kind may keep as body text but never mines for clauses.
    fn fallback(&self, input: &Self::Input, raw: &str) -> Self::Output;

    /// Dates already known without resolving text (explicit input fields).
    fn explicit_period(&self, _input: &Self::Input, _output: &Self::Output) -> Option<DateRange> {
        None
    }

    /// Texts to run through the date resolver, most preferred first.
    fn period_candidates<'a>(
        &self,
        _input: &'a Self::Input,
        _output: &'a Self::Output,
    ) -> Vec<Option<&'a str>> {
        Vec::new()
    }

    /// Year source for partial dates. Defaults to the caller's "today".
    fn reference_date(&self, _input: &Self::Input) -> Option<NaiveDate> {
        None
    }
}
