use allyflow_ai::TextGenerator;
use allyflow_core::{AccountId, DomainError, ExpectedVersion, ListingId, PartnershipId};
use allyflow_partnerships::{
    AcceptInquiry, CreatePartnership, DeclineInquiry, DeletePartnership, EditContent, Keywords,
    OrgKind, OrganizationDescriptor, Partnership, PartnershipCommand, PeriodDescriptor, PeriodKind,
    SubmitInquiry,
};
use tracing::info;

use super::{Workflow, execute};
use crate::drafting::{InquiryDraftKind, InquiryInput};
use crate::error::WorkflowError;
use crate::store::{Tables, WorkflowStore};

/// Raw inquiry form, categories still as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InquiryRequest {
    pub sender: AccountId,
    pub receiver: AccountId,
    pub listing: ListingId,
    pub purpose: String,
    pub period_type: String,
    pub period_value: String,
    pub org_type: String,
    pub org_value: String,
    pub detail: String,
    pub keywords: Vec<String>,
}

pub struct PartnershipService<'a, S, G> {
    wf: &'a Workflow<S, G>,
}

impl<'a, S: WorkflowStore, G: TextGenerator> PartnershipService<'a, S, G> {
    pub(super) fn new(wf: &'a Workflow<S, G>) -> Self {
        Self { wf }
    }

    /// Draft a new inquiry message and store it as a DRAFT partnership.
    pub async fn draft_inquiry(&self, request: InquiryRequest) -> Result<Partnership, WorkflowError> {
        let input = InquiryInput {
            purpose: request.purpose.clone(),
            period: PeriodDescriptor::new(request.period_type.parse::<PeriodKind>()?, &request.period_value),
            organization: OrganizationDescriptor::new(
                request.org_type.parse::<OrgKind>()?,
                &request.org_value,
            ),
            detail: request.detail.clone(),
            keywords: Keywords::parse(&request.keywords)?,
        };
        if request.sender == request.receiver {
            return Err(DomainError::validation(
                "receiver",
                "an inquiry cannot be sent to the sender's own account",
            )
            .into());
        }
        self.wf
            .store
            .read(|t| ensure_no_open_inquiry(t, request.sender, request.receiver))??;

        let sender_name = self.wf.accounts.display_name(request.sender).await?;
        let receiver_name = self.wf.accounts.display_name(request.receiver).await?;

        let drafted = self
            .wf
            .pipeline
            .draft(&InquiryDraftKind, &input, self.wf.clock.today())
            .await?;

        let partnership_id = PartnershipId::new();
        let command = PartnershipCommand::CreatePartnership(CreatePartnership {
            partnership_id,
            sender: request.sender,
            receiver: request.receiver,
            listing: request.listing,
            sender_display_name: sender_name,
            receiver_display_name: receiver_name,
            purpose: input.purpose,
            period: input.period,
            organization: input.organization,
            detail: input.detail,
            keywords: input.keywords,
            content: drafted.output,
            occurred_at: self.wf.clock.now(),
        });

        let created = self.wf.store.transaction(|tables| -> Result<_, WorkflowError> {
            ensure_no_open_inquiry(tables, request.sender, request.receiver)?;
            let mut partnership = Partnership::empty(partnership_id);
            execute(&mut partnership, ExpectedVersion::Exact(0), &command)?;
            tables.insert_partnership(partnership.clone());
            Ok(partnership)
        })?;

        info!(
            partnership_id = %partnership_id,
            source = ?drafted.source,
            "inquiry drafted"
        );
        Ok(created)
    }

    pub fn edit_content(
        &self,
        partnership_id: PartnershipId,
        expected: ExpectedVersion,
        content: impl Into<String>,
    ) -> Result<Partnership, WorkflowError> {
        self.transition(
            partnership_id,
            expected,
            PartnershipCommand::EditContent(EditContent {
                partnership_id,
                content: content.into(),
                occurred_at: self.wf.clock.now(),
            }),
        )
    }

    /// DRAFT -> SENT, optionally replacing the message one last time.
    pub fn submit(
        &self,
        partnership_id: PartnershipId,
        expected: ExpectedVersion,
        content: Option<String>,
    ) -> Result<Partnership, WorkflowError> {
        self.transition(
            partnership_id,
            expected,
            PartnershipCommand::SubmitInquiry(SubmitInquiry {
                partnership_id,
                content,
                occurred_at: self.wf.clock.now(),
            }),
        )
    }

    pub fn accept(
        &self,
        partnership_id: PartnershipId,
        expected: ExpectedVersion,
        caller: AccountId,
    ) -> Result<Partnership, WorkflowError> {
        self.transition(
            partnership_id,
            expected,
            PartnershipCommand::AcceptInquiry(AcceptInquiry {
                partnership_id,
                caller,
                occurred_at: self.wf.clock.now(),
            }),
        )
    }

    pub fn decline(
        &self,
        partnership_id: PartnershipId,
        expected: ExpectedVersion,
        caller: AccountId,
    ) -> Result<Partnership, WorkflowError> {
        self.transition(
            partnership_id,
            expected,
            PartnershipCommand::DeclineInquiry(DeclineInquiry {
                partnership_id,
                caller,
                occurred_at: self.wf.clock.now(),
            }),
        )
    }

    /// Remove an unsent draft or a declined inquiry.
    pub fn delete(
        &self,
        partnership_id: PartnershipId,
        expected: ExpectedVersion,
    ) -> Result<Partnership, WorkflowError> {
        self.transition(
            partnership_id,
            expected,
            PartnershipCommand::DeletePartnership(DeletePartnership {
                partnership_id,
                occurred_at: self.wf.clock.now(),
            }),
        )
    }

    pub fn get(&self, partnership_id: PartnershipId) -> Result<Partnership, WorkflowError> {
        Ok(self
            .wf
            .store
            .read(|t| t.partnership(partnership_id).cloned())??)
    }

    fn transition(
        &self,
        partnership_id: PartnershipId,
        expected: ExpectedVersion,
        command: PartnershipCommand,
    ) -> Result<Partnership, WorkflowError> {
        self.wf.store.transaction(|tables| -> Result<_, WorkflowError> {
            let partnership = tables.partnership_mut(partnership_id)?;
            execute(partnership, expected, &command)?;
            Ok(partnership.clone())
        })
    }
}

fn ensure_no_open_inquiry(
    tables: &Tables,
    sender: AccountId,
    receiver: AccountId,
) -> Result<(), DomainError> {
    match tables.live_partnership_between(sender, receiver) {
        Some(existing) => Err(DomainError::already_exists(
            "partnership",
            format!(
                "inquiry {} from {sender} to {receiver} is still open",
                existing.id_typed()
            ),
        )),
        None => Ok(()),
    }
}
