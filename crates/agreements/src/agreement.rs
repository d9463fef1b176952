use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use allyflow_core::{
    AccountId, Aggregate, AggregateRoot, AgreementId, DateRange, DomainError, Event, ListingId,
    PartnershipId, ValueObject, has_text,
};

const ENTITY: &str = "agreement";

/// Agreement status lifecycle. Strictly forward-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgreementStatus {
    Draft,
    Generated,
    SignedSender,
    Sent,
    SignedReceiver,
    SignedAll,
    Approved,
}

impl AgreementStatus {
    pub const ALL: [AgreementStatus; 7] = [
        AgreementStatus::Draft,
        AgreementStatus::Generated,
        AgreementStatus::SignedSender,
        AgreementStatus::Sent,
        AgreementStatus::SignedReceiver,
        AgreementStatus::SignedAll,
        AgreementStatus::Approved,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AgreementStatus::Draft => "DRAFT",
            AgreementStatus::Generated => "GENERATED",
            AgreementStatus::SignedSender => "SIGNED_SENDER",
            AgreementStatus::Sent => "SENT",
            AgreementStatus::SignedReceiver => "SIGNED_RECEIVER",
            AgreementStatus::SignedAll => "SIGNED_ALL",
            AgreementStatus::Approved => "APPROVED",
        }
    }
}

impl core::fmt::Display for AgreementStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which recorded party a transition must be performed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signer {
    Sender,
    Receiver,
}

/// Status-advancing transitions. The single source of truth for which status
/// each transition requires and produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Generate,
    SignAsSender,
    SendToReceiver,
    SignAsReceiver,
    MarkAllSigned,
    Approve,
}

impl Transition {
    pub const ALL: [Transition; 6] = [
        Transition::Generate,
        Transition::SignAsSender,
        Transition::SendToReceiver,
        Transition::SignAsReceiver,
        Transition::MarkAllSigned,
        Transition::Approve,
    ];

    /// Status the agreement must be in.
    pub fn required(self) -> AgreementStatus {
        match self {
            Transition::Generate => AgreementStatus::Draft,
            Transition::SignAsSender => AgreementStatus::Generated,
            Transition::SendToReceiver => AgreementStatus::SignedSender,
            Transition::SignAsReceiver => AgreementStatus::Sent,
            Transition::MarkAllSigned => AgreementStatus::SignedReceiver,
            Transition::Approve => AgreementStatus::SignedAll,
        }
    }

    /// Status the agreement moves to.
    pub fn target(self) -> AgreementStatus {
        match self {
            Transition::Generate => AgreementStatus::Generated,
            Transition::SignAsSender => AgreementStatus::SignedSender,
            Transition::SendToReceiver => AgreementStatus::Sent,
            Transition::SignAsReceiver => AgreementStatus::SignedReceiver,
            Transition::MarkAllSigned => AgreementStatus::SignedAll,
            Transition::Approve => AgreementStatus::Approved,
        }
    }

    pub fn signer(self) -> Option<Signer> {
        match self {
            Transition::SignAsSender => Some(Signer::Sender),
            Transition::SignAsReceiver => Some(Signer::Receiver),
            _ => None,
        }
    }
}

/// The six free-text clause fields of an agreement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgreementClauses {
    pub purpose: String,
    pub target_period: String,
    pub benefit_condition: String,
    pub role: String,
    pub effect: String,
    pub etc: String,
}

impl ValueObject for AgreementClauses {}

impl AgreementClauses {
    fn trimmed(&self) -> Self {
        Self {
            purpose: self.purpose.trim().to_string(),
            target_period: self.target_period.trim().to_string(),
            benefit_condition: self.benefit_condition.trim().to_string(),
            role: self.role.trim().to_string(),
            effect: self.effect.trim().to_string(),
            etc: self.etc.trim().to_string(),
        }
    }
}

/// Aggregate root: Agreement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agreement {
    id: AgreementId,
    partnership: Option<PartnershipId>,
    listing: Option<ListingId>,
    sender: Option<AccountId>,
    receiver: Option<AccountId>,
    sender_name: String,
    receiver_name: String,
    clauses: AgreementClauses,
    content: String,
    period: Option<DateRange>,
    status: AgreementStatus,
    version: u64,
    created: bool,
}

impl Agreement {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: AgreementId) -> Self {
        Self {
            id,
            partnership: None,
            listing: None,
            sender: None,
            receiver: None,
            sender_name: String::new(),
            receiver_name: String::new(),
            clauses: AgreementClauses::default(),
            content: String::new(),
            period: None,
            status: AgreementStatus::Draft,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> AgreementId {
        self.id
    }

    pub fn partnership(&self) -> Option<PartnershipId> {
        self.partnership
    }

    pub fn listing(&self) -> Option<ListingId> {
        self.listing
    }

    pub fn sender(&self) -> Option<AccountId> {
        self.sender
    }

    pub fn receiver(&self) -> Option<AccountId> {
        self.receiver
    }

    /// Sender display name as snapshotted at creation.
    pub fn sender_name(&self) -> &str {
        &self.sender_name
    }

    /// Receiver display name as snapshotted at creation.
    pub fn receiver_name(&self) -> &str {
        &self.receiver_name
    }

    pub fn clauses(&self) -> &AgreementClauses {
        &self.clauses
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn period(&self) -> Option<DateRange> {
        self.period
    }

    pub fn status(&self) -> AgreementStatus {
        self.status
    }

    pub fn is_created(&self) -> bool {
        self.created
    }

    pub fn is_modifiable(&self) -> bool {
        matches!(self.status, AgreementStatus::Draft)
    }

    pub fn involves(&self, account: AccountId) -> bool {
        self.sender == Some(account) || self.receiver == Some(account)
    }

    /// Approved and its date range touches the given calendar month.
    pub fn is_active_in_month(&self, year: i32, month: u32) -> bool {
        self.status == AgreementStatus::Approved
            && self.period.is_some_and(|p| p.overlaps_month(year, month))
    }
}

impl AggregateRoot for Agreement {
    type Id = AgreementId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreateAgreement (DRAFT, dates fixed from here on).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAgreement {
    pub agreement_id: AgreementId,
    pub partnership_id: PartnershipId,
    pub listing: Option<ListingId>,
    pub sender: AccountId,
    pub receiver: AccountId,
    pub sender_name: String,
    pub receiver_name: String,
    pub clauses: AgreementClauses,
    pub content: String,
    pub period: Option<DateRange>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateDraft (DRAFT only; dates are not touched).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateDraft {
    pub agreement_id: AgreementId,
    pub clauses: AgreementClauses,
    pub content: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: advance the status by one [`Transition`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceAgreement {
    pub agreement_id: AgreementId,
    pub transition: Transition,
    /// Acting account; checked for the signature transitions.
    pub caller: AccountId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgreementCommand {
    CreateAgreement(CreateAgreement),
    UpdateDraft(UpdateDraft),
    Advance(AdvanceAgreement),
}

/// Event: AgreementCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgreementCreated {
    pub agreement_id: AgreementId,
    pub partnership_id: PartnershipId,
    pub listing: Option<ListingId>,
    pub sender: AccountId,
    pub receiver: AccountId,
    pub sender_name: String,
    pub receiver_name: String,
    pub clauses: AgreementClauses,
    pub content: String,
    pub period: Option<DateRange>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: AgreementDraftUpdated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgreementDraftUpdated {
    pub agreement_id: AgreementId,
    pub clauses: AgreementClauses,
    pub content: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: StatusAdvanced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusAdvanced {
    pub agreement_id: AgreementId,
    pub transition: Transition,
    pub status: AgreementStatus,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgreementEvent {
    AgreementCreated(AgreementCreated),
    AgreementDraftUpdated(AgreementDraftUpdated),
    StatusAdvanced(StatusAdvanced),
}

impl Event for AgreementEvent {
    fn event_type(&self) -> &'static str {
        match self {
            AgreementEvent::AgreementCreated(_) => "agreement.created",
            AgreementEvent::AgreementDraftUpdated(_) => "agreement.draft_updated",
            AgreementEvent::StatusAdvanced(e) => match e.transition {
                Transition::Generate => "agreement.generated",
                Transition::SignAsSender => "agreement.sender_signed",
                Transition::SendToReceiver => "agreement.sent",
                Transition::SignAsReceiver => "agreement.receiver_signed",
                Transition::MarkAllSigned => "agreement.all_signed",
                Transition::Approve => "agreement.approved",
            },
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            AgreementEvent::AgreementCreated(e) => e.occurred_at,
            AgreementEvent::AgreementDraftUpdated(e) => e.occurred_at,
            AgreementEvent::StatusAdvanced(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Agreement {
    type Command = AgreementCommand;
    type Event = AgreementEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            AgreementEvent::AgreementCreated(e) => {
                self.id = e.agreement_id;
                self.partnership = Some(e.partnership_id);
                self.listing = e.listing;
                self.sender = Some(e.sender);
                self.receiver = Some(e.receiver);
                self.sender_name = e.sender_name.clone();
                self.receiver_name = e.receiver_name.clone();
                self.clauses = e.clauses.clone();
                self.content = e.content.clone();
                self.period = e.period;
                self.status = AgreementStatus::Draft;
                self.created = true;
            }
            AgreementEvent::AgreementDraftUpdated(e) => {
                self.clauses = e.clauses.clone();
                self.content = e.content.clone();
            }
            AgreementEvent::StatusAdvanced(e) => {
                self.status = e.status;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            AgreementCommand::CreateAgreement(cmd) => self.handle_create(cmd),
            AgreementCommand::UpdateDraft(cmd) => self.handle_update_draft(cmd),
            AgreementCommand::Advance(cmd) => self.handle_advance(cmd),
        }
    }
}

impl Agreement {
    fn ensure_exists(&self, agreement_id: AgreementId) -> Result<(), DomainError> {
        if !self.created || self.id != agreement_id {
            return Err(DomainError::not_found(ENTITY, agreement_id));
        }
        Ok(())
    }

    fn ensure_status(&self, required: AgreementStatus) -> Result<(), DomainError> {
        if self.status != required {
            return Err(DomainError::invalid_state(ENTITY, required, self.status));
        }
        Ok(())
    }

    fn handle_create(&self, cmd: &CreateAgreement) -> Result<Vec<AgreementEvent>, DomainError> {
        if self.created {
            return Err(DomainError::already_exists(ENTITY, cmd.agreement_id.to_string()));
        }
        if cmd.sender == cmd.receiver {
            return Err(DomainError::validation(
                "receiver",
                "sender and receiver must be different accounts",
            ));
        }

        Ok(vec![AgreementEvent::AgreementCreated(AgreementCreated {
            agreement_id: cmd.agreement_id,
            partnership_id: cmd.partnership_id,
            listing: cmd.listing,
            sender: cmd.sender,
            receiver: cmd.receiver,
            sender_name: cmd.sender_name.clone(),
            receiver_name: cmd.receiver_name.clone(),
            clauses: cmd.clauses.trimmed(),
            content: cmd.content.trim().to_string(),
            period: cmd.period,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update_draft(&self, cmd: &UpdateDraft) -> Result<Vec<AgreementEvent>, DomainError> {
        self.ensure_exists(cmd.agreement_id)?;
        self.ensure_status(AgreementStatus::Draft)?;

        Ok(vec![AgreementEvent::AgreementDraftUpdated(AgreementDraftUpdated {
            agreement_id: cmd.agreement_id,
            clauses: cmd.clauses.trimmed(),
            content: cmd.content.trim().to_string(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_advance(&self, cmd: &AdvanceAgreement) -> Result<Vec<AgreementEvent>, DomainError> {
        self.ensure_exists(cmd.agreement_id)?;
        self.ensure_status(cmd.transition.required())?;

        match cmd.transition.signer() {
            Some(Signer::Sender) if self.sender != Some(cmd.caller) => {
                return Err(DomainError::identity_mismatch(ENTITY, "sender"));
            }
            Some(Signer::Receiver) if self.receiver != Some(cmd.caller) => {
                return Err(DomainError::identity_mismatch(ENTITY, "receiver"));
            }
            _ => {}
        }

        if cmd.transition == Transition::Generate && !has_text(Some(self.content.as_str())) {
            return Err(DomainError::missing("content"));
        }

        Ok(vec![AgreementEvent::StatusAdvanced(StatusAdvanced {
            agreement_id: cmd.agreement_id,
            transition: cmd.transition,
            status: cmd.transition.target(),
            occurred_at: cmd.occurred_at,
        })])
    }
}
