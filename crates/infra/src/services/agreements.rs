use allyflow_agreements::{
    AdvanceAgreement, Agreement, AgreementClauses, AgreementCommand, CreateAgreement, Transition,
    UpdateDraft,
};
use allyflow_ai::TextGenerator;
use allyflow_core::{
    AccountId, AgreementId, DateRange, DomainError, ExpectedVersion, ListingId, PartnershipId,
    has_text,
};
use allyflow_partnerships::{AcceptedStatus, Partnership};
use allyflow_text::resolve_first;
use chrono::NaiveDate;
use tracing::{debug, info};

use super::{Workflow, execute};
use crate::drafting::{AgreementDraftKind, AgreementInput};
use crate::error::WorkflowError;
use crate::store::{Tables, WorkflowStore};

/// Clause fields typed in by hand. Dates are optional but come as a pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualAgreement {
    pub clauses: AgreementClauses,
    pub content: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

pub struct AgreementService<'a, S, G> {
    wf: &'a Workflow<S, G>,
}

impl<'a, S: WorkflowStore, G: TextGenerator> AgreementService<'a, S, G> {
    pub(super) fn new(wf: &'a Workflow<S, G>) -> Self {
        Self { wf }
    }

    /// Draft an agreement for an accepted partnership with the text generator.
    pub async fn create_generated(
        &self,
        partnership_id: PartnershipId,
    ) -> Result<Agreement, WorkflowError> {
        let partnership = self
            .wf
            .store
            .read(|t| ensure_can_create(t, partnership_id).cloned())??;

        let listing = self.wf.listing_snapshot(partnership.listing()).await?;
        let input = AgreementInput::new(
            partnership.purpose(),
            partnership.detail(),
            partnership.period().map(|p| p.value.as_str()).unwrap_or_default(),
            listing,
        );

        let drafted = self
            .wf
            .pipeline
            .draft(&AgreementDraftKind, &input, self.wf.clock.today())
            .await?;

        let agreement = self
            .create(
                &partnership,
                partnership.listing(),
                drafted.output.clauses,
                drafted.output.content,
                drafted.period,
            )
            .await?;

        info!(
            agreement_id = %agreement.id_typed(),
            source = ?drafted.source,
            "agreement drafted"
        );
        Ok(agreement)
    }

    /// Create a DRAFT agreement from hand-written clauses.
    ///
    /// Explicit dates win. Without them the period is resolved from the
    /// clauses, the body, the partnership period and the listing range.
    pub async fn create_manual(
        &self,
        partnership_id: PartnershipId,
        manual: ManualAgreement,
    ) -> Result<Agreement, WorkflowError> {
        let explicit = match (manual.start_date, manual.end_date) {
            (Some(start), Some(end)) => Some(DateRange::new(start, end)?),
            (None, None) => None,
            _ => {
                return Err(DomainError::validation(
                    "end_date",
                    "start and end dates must be given together",
                )
                .into());
            }
        };
        if !has_text(Some(manual.clauses.purpose.as_str())) {
            return Err(DomainError::missing("purpose").into());
        }

        let partnership = self
            .wf
            .store
            .read(|t| ensure_can_create(t, partnership_id).cloned())??;

        let period = match explicit {
            Some(range) => Some(range),
            None => {
                let listing = self.wf.listing_snapshot(partnership.listing()).await?;
                let input = AgreementInput::new(
                    partnership.purpose(),
                    partnership.detail(),
                    partnership.period().map(|p| p.value.as_str()).unwrap_or_default(),
                    listing,
                );
                let reference = input.reference_date().unwrap_or_else(|| self.wf.clock.today());
                let candidates = input.period_candidates(&manual.clauses, &manual.content);
                match resolve_first(candidates, reference) {
                    Ok(range) => Some(range),
                    Err(e) => {
                        debug!(%partnership_id, error = %e, "no period resolved for manual agreement");
                        None
                    }
                }
            }
        };

        self.create(
            &partnership,
            partnership.listing(),
            manual.clauses,
            manual.content,
            period,
        )
        .await
    }

    pub fn update_draft(
        &self,
        agreement_id: AgreementId,
        expected: ExpectedVersion,
        clauses: AgreementClauses,
        content: impl Into<String>,
    ) -> Result<Agreement, WorkflowError> {
        self.transition(
            agreement_id,
            expected,
            AgreementCommand::UpdateDraft(UpdateDraft {
                agreement_id,
                clauses,
                content: content.into(),
                occurred_at: self.wf.clock.now(),
            }),
        )
    }

    /// Move the agreement one step along the signing sequence.
    pub fn advance(
        &self,
        agreement_id: AgreementId,
        expected: ExpectedVersion,
        transition: Transition,
        caller: AccountId,
    ) -> Result<Agreement, WorkflowError> {
        self.transition(
            agreement_id,
            expected,
            AgreementCommand::Advance(AdvanceAgreement {
                agreement_id,
                transition,
                caller,
                occurred_at: self.wf.clock.now(),
            }),
        )
    }

    /// Approved agreements of `account` whose range touches the month.
    pub fn approved_in_month(
        &self,
        account: AccountId,
        year: i32,
        month: u32,
    ) -> Result<Vec<Agreement>, WorkflowError> {
        if !(1..=12).contains(&month) {
            return Err(DomainError::validation("month", format!("month {month} is out of range")).into());
        }
        Ok(self.wf.store.read(|t| {
            t.approved_in_month(account, year, month)
                .into_iter()
                .cloned()
                .collect()
        })?)
    }

    pub fn get(&self, agreement_id: AgreementId) -> Result<Agreement, WorkflowError> {
        Ok(self.wf.store.read(|t| t.agreement(agreement_id).cloned())??)
    }

    async fn create(
        &self,
        partnership: &Partnership,
        listing: Option<ListingId>,
        clauses: AgreementClauses,
        content: String,
        period: Option<DateRange>,
    ) -> Result<Agreement, WorkflowError> {
        let partnership_id = partnership.id_typed();
        let (sender, receiver) = match (partnership.sender(), partnership.receiver()) {
            (Some(s), Some(r)) => (s, r),
            _ => return Err(DomainError::not_found("partnership", partnership_id).into()),
        };
        let sender_name = self.wf.accounts.display_name(sender).await?;
        let receiver_name = self.wf.accounts.display_name(receiver).await?;

        let agreement_id = AgreementId::new();
        let command = AgreementCommand::CreateAgreement(CreateAgreement {
            agreement_id,
            partnership_id,
            listing,
            sender,
            receiver,
            sender_name,
            receiver_name,
            clauses,
            content,
            period,
            occurred_at: self.wf.clock.now(),
        });

        self.wf.store.transaction(|tables| -> Result<_, WorkflowError> {
            ensure_can_create(tables, partnership_id)?;
            let mut agreement = Agreement::empty(agreement_id);
            execute(&mut agreement, ExpectedVersion::Exact(0), &command)?;
            tables.insert_agreement(agreement.clone());
            Ok(agreement)
        })
    }

    fn transition(
        &self,
        agreement_id: AgreementId,
        expected: ExpectedVersion,
        command: AgreementCommand,
    ) -> Result<Agreement, WorkflowError> {
        self.wf.store.transaction(|tables| -> Result<_, WorkflowError> {
            let agreement = tables.agreement_mut(agreement_id)?;
            execute(agreement, expected, &command)?;
            Ok(agreement.clone())
        })
    }
}

fn ensure_can_create(tables: &Tables, partnership_id: PartnershipId) -> Result<&Partnership, DomainError> {
    let partnership = tables.partnership(partnership_id)?;
    if partnership.accepted_status() != AcceptedStatus::Accepted {
        return Err(DomainError::invalid_state(
            "partnership",
            AcceptedStatus::Accepted,
            partnership.accepted_status(),
        ));
    }
    if let Some(existing) = tables.agreement_for_partnership(partnership_id) {
        return Err(DomainError::already_exists(
            "agreement",
            format!(
                "partnership {partnership_id} already has agreement {}",
                existing.id_typed()
            ),
        ));
    }
    Ok(partnership)
}
