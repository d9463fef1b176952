use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use allyflow_core::{
    AccountId, Aggregate, AggregateRoot, DomainError, Event, ListingId, PartnershipId, has_text,
};

use crate::descriptor::{Keywords, OrganizationDescriptor, PeriodDescriptor};

const ENTITY: &str = "partnership";

/// Whether the inquiry has been sent to the receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SendStatus {
    Draft,
    Sent,
}

/// The receiver's answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AcceptedStatus {
    Waiting,
    Accepted,
    Declined,
}

impl core::fmt::Display for SendStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            SendStatus::Draft => "DRAFT",
            SendStatus::Sent => "SENT",
        })
    }
}

impl core::fmt::Display for AcceptedStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            AcceptedStatus::Waiting => "WAITING",
            AcceptedStatus::Accepted => "ACCEPTED",
            AcceptedStatus::Declined => "DECLINED",
        })
    }
}

/// Aggregate root: Partnership (an inquiry between two accounts).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partnership {
    id: PartnershipId,
    sender: Option<AccountId>,
    receiver: Option<AccountId>,
    listing: Option<ListingId>,
    sender_display_name: String,
    receiver_display_name: String,
    purpose: String,
    period: Option<PeriodDescriptor>,
    organization: Option<OrganizationDescriptor>,
    detail: String,
    content: String,
    keywords: Keywords,
    send_status: SendStatus,
    accepted_status: AcceptedStatus,
    version: u64,
    created: bool,
    deleted: bool,
}

impl Partnership {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: PartnershipId) -> Self {
        Self {
            id,
            sender: None,
            receiver: None,
            listing: None,
            sender_display_name: String::new(),
            receiver_display_name: String::new(),
            purpose: String::new(),
            period: None,
            organization: None,
            detail: String::new(),
            content: String::new(),
            keywords: Keywords::default(),
            send_status: SendStatus::Draft,
            accepted_status: AcceptedStatus::Waiting,
            version: 0,
            created: false,
            deleted: false,
        }
    }

    pub fn id_typed(&self) -> PartnershipId {
        self.id
    }

    pub fn sender(&self) -> Option<AccountId> {
        self.sender
    }

    pub fn receiver(&self) -> Option<AccountId> {
        self.receiver
    }

    pub fn listing(&self) -> Option<ListingId> {
        self.listing
    }

    pub fn sender_display_name(&self) -> &str {
        &self.sender_display_name
    }

    pub fn receiver_display_name(&self) -> &str {
        &self.receiver_display_name
    }

    pub fn purpose(&self) -> &str {
        &self.purpose
    }

    pub fn period(&self) -> Option<&PeriodDescriptor> {
        self.period.as_ref()
    }

    pub fn organization(&self) -> Option<&OrganizationDescriptor> {
        self.organization.as_ref()
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn keywords(&self) -> &Keywords {
        &self.keywords
    }

    pub fn send_status(&self) -> SendStatus {
        self.send_status
    }

    pub fn accepted_status(&self) -> AcceptedStatus {
        self.accepted_status
    }

    pub fn is_created(&self) -> bool {
        self.created
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Counts against the one-live-inquiry-per-pair guard.
    pub fn is_live(&self) -> bool {
        self.created && !self.deleted && self.accepted_status != AcceptedStatus::Declined
    }

    pub fn is_editable(&self) -> bool {
        matches!(self.send_status, SendStatus::Draft)
    }

    pub fn is_deletable(&self) -> bool {
        self.send_status == SendStatus::Draft || self.accepted_status == AcceptedStatus::Declined
    }

    /// Whether `account` is on either side of this inquiry.
    pub fn involves(&self, account: AccountId) -> bool {
        self.sender == Some(account) || self.receiver == Some(account)
    }
}

impl AggregateRoot for Partnership {
    type Id = PartnershipId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreatePartnership (a new DRAFT inquiry with its drafted message).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePartnership {
    pub partnership_id: PartnershipId,
    pub sender: AccountId,
    pub receiver: AccountId,
    pub listing: ListingId,
    pub sender_display_name: String,
    pub receiver_display_name: String,
    pub purpose: String,
    pub period: PeriodDescriptor,
    pub organization: OrganizationDescriptor,
    pub detail: String,
    pub keywords: Keywords,
    pub content: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: EditContent (DRAFT only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditContent {
    pub partnership_id: PartnershipId,
    pub content: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SubmitInquiry (DRAFT -> SENT), optionally replacing the content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitInquiry {
    pub partnership_id: PartnershipId,
    pub content: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AcceptInquiry (receiver only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptInquiry {
    pub partnership_id: PartnershipId,
    pub caller: AccountId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: DeclineInquiry (receiver only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclineInquiry {
    pub partnership_id: PartnershipId,
    pub caller: AccountId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: DeletePartnership (unsent drafts and declined inquiries).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletePartnership {
    pub partnership_id: PartnershipId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartnershipCommand {
    CreatePartnership(CreatePartnership),
    EditContent(EditContent),
    SubmitInquiry(SubmitInquiry),
    AcceptInquiry(AcceptInquiry),
    DeclineInquiry(DeclineInquiry),
    DeletePartnership(DeletePartnership),
}

/// Event: PartnershipCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnershipCreated {
    pub partnership_id: PartnershipId,
    pub sender: AccountId,
    pub receiver: AccountId,
    pub listing: ListingId,
    pub sender_display_name: String,
    pub receiver_display_name: String,
    pub purpose: String,
    pub period: PeriodDescriptor,
    pub organization: OrganizationDescriptor,
    pub detail: String,
    pub keywords: Keywords,
    pub content: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PartnershipContentEdited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnershipContentEdited {
    pub partnership_id: PartnershipId,
    pub content: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: InquirySubmitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InquirySubmitted {
    pub partnership_id: PartnershipId,
    pub content: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: InquiryAccepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InquiryAccepted {
    pub partnership_id: PartnershipId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: InquiryDeclined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InquiryDeclined {
    pub partnership_id: PartnershipId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PartnershipDeleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnershipDeleted {
    pub partnership_id: PartnershipId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartnershipEvent {
    PartnershipCreated(PartnershipCreated),
    PartnershipContentEdited(PartnershipContentEdited),
    InquirySubmitted(InquirySubmitted),
    InquiryAccepted(InquiryAccepted),
    InquiryDeclined(InquiryDeclined),
    PartnershipDeleted(PartnershipDeleted),
}

impl Event for PartnershipEvent {
    fn event_type(&self) -> &'static str {
        match self {
            PartnershipEvent::PartnershipCreated(_) => "partnership.created",
            PartnershipEvent::PartnershipContentEdited(_) => "partnership.content_edited",
            PartnershipEvent::InquirySubmitted(_) => "partnership.submitted",
            PartnershipEvent::InquiryAccepted(_) => "partnership.accepted",
            PartnershipEvent::InquiryDeclined(_) => "partnership.declined",
            PartnershipEvent::PartnershipDeleted(_) => "partnership.deleted",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            PartnershipEvent::PartnershipCreated(e) => e.occurred_at,
            PartnershipEvent::PartnershipContentEdited(e) => e.occurred_at,
            PartnershipEvent::InquirySubmitted(e) => e.occurred_at,
            PartnershipEvent::InquiryAccepted(e) => e.occurred_at,
            PartnershipEvent::InquiryDeclined(e) => e.occurred_at,
            PartnershipEvent::PartnershipDeleted(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Partnership {
    type Command = PartnershipCommand;
    type Event = PartnershipEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            PartnershipEvent::PartnershipCreated(e) => {
                self.id = e.partnership_id;
                self.sender = Some(e.sender);
                self.receiver = Some(e.receiver);
                self.listing = Some(e.listing);
                self.sender_display_name = e.sender_display_name.clone();
                self.receiver_display_name = e.receiver_display_name.clone();
                self.purpose = e.purpose.clone();
                self.period = Some(e.period.clone());
                self.organization = Some(e.organization.clone());
                self.detail = e.detail.clone();
                self.keywords = e.keywords.clone();
                self.content = e.content.clone();
                self.send_status = SendStatus::Draft;
                self.accepted_status = AcceptedStatus::Waiting;
                self.created = true;
            }
            PartnershipEvent::PartnershipContentEdited(e) => {
                self.content = e.content.clone();
            }
            PartnershipEvent::InquirySubmitted(e) => {
                self.content = e.content.clone();
                self.send_status = SendStatus::Sent;
            }
            PartnershipEvent::InquiryAccepted(_) => {
                self.accepted_status = AcceptedStatus::Accepted;
            }
            PartnershipEvent::InquiryDeclined(_) => {
                self.accepted_status = AcceptedStatus::Declined;
            }
            PartnershipEvent::PartnershipDeleted(_) => {
                self.deleted = true;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            PartnershipCommand::CreatePartnership(cmd) => self.handle_create(cmd),
            PartnershipCommand::EditContent(cmd) => self.handle_edit_content(cmd),
            PartnershipCommand::SubmitInquiry(cmd) => self.handle_submit(cmd),
            PartnershipCommand::AcceptInquiry(cmd) => self.handle_accept(cmd),
            PartnershipCommand::DeclineInquiry(cmd) => self.handle_decline(cmd),
            PartnershipCommand::DeletePartnership(cmd) => self.handle_delete(cmd),
        }
    }
}

impl Partnership {
    fn ensure_exists(&self, partnership_id: PartnershipId) -> Result<(), DomainError> {
        if !self.created || self.deleted || self.id != partnership_id {
            return Err(DomainError::not_found(ENTITY, partnership_id));
        }
        Ok(())
    }

    fn ensure_draft(&self) -> Result<(), DomainError> {
        if self.send_status != SendStatus::Draft {
            return Err(DomainError::invalid_state(ENTITY, SendStatus::Draft, self.send_status));
        }
        Ok(())
    }

    /// Receiver-only decision on a sent, unanswered inquiry.
    fn ensure_answerable(&self, caller: AccountId) -> Result<(), DomainError> {
        if self.send_status != SendStatus::Sent {
            return Err(DomainError::invalid_state(ENTITY, SendStatus::Sent, self.send_status));
        }
        if self.accepted_status != AcceptedStatus::Waiting {
            return Err(DomainError::invalid_state(
                ENTITY,
                AcceptedStatus::Waiting,
                self.accepted_status,
            ));
        }
        if self.receiver != Some(caller) {
            return Err(DomainError::identity_mismatch(ENTITY, "receiver"));
        }
        Ok(())
    }

    fn handle_create(
        &self,
        cmd: &CreatePartnership,
    ) -> Result<Vec<PartnershipEvent>, DomainError> {
        if self.created {
            return Err(DomainError::already_exists(ENTITY, cmd.partnership_id.to_string()));
        }
        if cmd.sender == cmd.receiver {
            return Err(DomainError::validation(
                "receiver",
                "an inquiry cannot be sent to the sender's own account",
            ));
        }
        if !has_text(Some(cmd.purpose.as_str())) {
            return Err(DomainError::missing("purpose"));
        }
        if !has_text(Some(cmd.detail.as_str())) {
            return Err(DomainError::missing("detail"));
        }
        if !has_text(Some(cmd.period.value.as_str())) {
            return Err(DomainError::missing("period_value"));
        }
        if !has_text(Some(cmd.content.as_str())) {
            return Err(DomainError::missing("content"));
        }

        Ok(vec![PartnershipEvent::PartnershipCreated(PartnershipCreated {
            partnership_id: cmd.partnership_id,
            sender: cmd.sender,
            receiver: cmd.receiver,
            listing: cmd.listing,
            sender_display_name: cmd.sender_display_name.clone(),
            receiver_display_name: cmd.receiver_display_name.clone(),
            purpose: cmd.purpose.trim().to_string(),
            period: cmd.period.clone(),
            organization: cmd.organization.clone(),
            detail: cmd.detail.trim().to_string(),
            keywords: cmd.keywords.clone(),
            content: cmd.content.trim().to_string(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_edit_content(
        &self,
        cmd: &EditContent,
    ) -> Result<Vec<PartnershipEvent>, DomainError> {
        self.ensure_exists(cmd.partnership_id)?;
        self.ensure_draft()?;
        if !has_text(Some(cmd.content.as_str())) {
            return Err(DomainError::missing("content"));
        }

        Ok(vec![PartnershipEvent::PartnershipContentEdited(
            PartnershipContentEdited {
                partnership_id: cmd.partnership_id,
                content: cmd.content.trim().to_string(),
                occurred_at: cmd.occurred_at,
            },
        )])
    }

    fn handle_submit(&self, cmd: &SubmitInquiry) -> Result<Vec<PartnershipEvent>, DomainError> {
        self.ensure_exists(cmd.partnership_id)?;
        self.ensure_draft()?;

        let content = match cmd.content.as_deref() {
            Some(text) if has_text(Some(text)) => text.trim().to_string(),
            Some(_) => return Err(DomainError::missing("content")),
            None => self.content.clone(),
        };

        Ok(vec![PartnershipEvent::InquirySubmitted(InquirySubmitted {
            partnership_id: cmd.partnership_id,
            content,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_accept(&self, cmd: &AcceptInquiry) -> Result<Vec<PartnershipEvent>, DomainError> {
        self.ensure_exists(cmd.partnership_id)?;
        self.ensure_answerable(cmd.caller)?;

        Ok(vec![PartnershipEvent::InquiryAccepted(InquiryAccepted {
            partnership_id: cmd.partnership_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_decline(&self, cmd: &DeclineInquiry) -> Result<Vec<PartnershipEvent>, DomainError> {
        self.ensure_exists(cmd.partnership_id)?;
        self.ensure_answerable(cmd.caller)?;

        Ok(vec![PartnershipEvent::InquiryDeclined(InquiryDeclined {
            partnership_id: cmd.partnership_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_delete(
        &self,
        cmd: &DeletePartnership,
    ) -> Result<Vec<PartnershipEvent>, DomainError> {
        self.ensure_exists(cmd.partnership_id)?;
        if !self.is_deletable() {
            // Sent inquiries are deletable only once declined.
            return Err(DomainError::invalid_state(
                ENTITY,
                AcceptedStatus::Declined,
                self.accepted_status,
            ));
        }

        Ok(vec![PartnershipEvent::PartnershipDeleted(PartnershipDeleted {
            partnership_id: cmd.partnership_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{OrgKind, PeriodKind};

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    struct Fixture {
        partnership: Partnership,
        id: PartnershipId,
        sender: AccountId,
        receiver: AccountId,
    }

    fn create_cmd(id: PartnershipId, sender: AccountId, receiver: AccountId) -> CreatePartnership {
        CreatePartnership {
            partnership_id: id,
            sender,
            receiver,
            listing: ListingId::new(),
            sender_display_name: "총학생회".to_string(),
            receiver_display_name: "카페 모카".to_string(),
            purpose: "축제 기간 학생 할인".to_string(),
            period: PeriodDescriptor::new(PeriodKind::Weeks, "2주"),
            organization: OrganizationDescriptor::new(OrgKind::StudentCouncil, "총학생회"),
            detail: "음료 10% 할인".to_string(),
            keywords: Keywords::parse(["친절함"]).unwrap(),
            content: "안녕하세요, 제휴를 제안드립니다.".to_string(),
            occurred_at: test_time(),
        }
    }

    fn created() -> Fixture {
        let id = PartnershipId::new();
        let (sender, receiver) = (AccountId::new(), AccountId::new());
        let mut partnership = Partnership::empty(id);
        partnership
            .execute(&PartnershipCommand::CreatePartnership(create_cmd(id, sender, receiver)))
            .unwrap();
        Fixture {
            partnership,
            id,
            sender,
            receiver,
        }
    }

    fn submitted() -> Fixture {
        let mut f = created();
        f.partnership
            .execute(&PartnershipCommand::SubmitInquiry(SubmitInquiry {
                partnership_id: f.id,
                content: None,
                occurred_at: test_time(),
            }))
            .unwrap();
        f
    }

    fn accept(f: &Fixture, caller: AccountId) -> PartnershipCommand {
        PartnershipCommand::AcceptInquiry(AcceptInquiry {
            partnership_id: f.id,
            caller,
            occurred_at: test_time(),
        })
    }

    fn decline(f: &Fixture, caller: AccountId) -> PartnershipCommand {
        PartnershipCommand::DeclineInquiry(DeclineInquiry {
            partnership_id: f.id,
            caller,
            occurred_at: test_time(),
        })
    }

    #[test]
    fn create_starts_in_draft_waiting_with_snapshot_names() {
        let f = created();
        assert_eq!(f.partnership.send_status(), SendStatus::Draft);
        assert_eq!(f.partnership.accepted_status(), AcceptedStatus::Waiting);
        assert_eq!(f.partnership.sender_display_name(), "총학생회");
        assert_eq!(f.partnership.version(), 1);
        assert!(f.partnership.is_live());
    }

    #[test]
    fn create_rejects_missing_fields_and_self_inquiry() {
        let id = PartnershipId::new();
        let account = AccountId::new();
        let partnership = Partnership::empty(id);

        let err = partnership
            .handle(&PartnershipCommand::CreatePartnership(create_cmd(id, account, account)))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "receiver", .. }));

        let mut cmd = create_cmd(id, account, AccountId::new());
        cmd.detail = "   ".to_string();
        let err = partnership
            .handle(&PartnershipCommand::CreatePartnership(cmd))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "detail", .. }));
    }

    #[test]
    fn create_twice_is_rejected() {
        let f = created();
        let err = f
            .partnership
            .handle(&PartnershipCommand::CreatePartnership(create_cmd(
                f.id, f.sender, f.receiver,
            )))
            .unwrap_err();
        assert!(matches!(err, DomainError::AlreadyExists { .. }));
    }

    #[test]
    fn edit_content_only_in_draft() {
        let mut f = created();
        f.partnership
            .execute(&PartnershipCommand::EditContent(EditContent {
                partnership_id: f.id,
                content: "수정된 문의".to_string(),
                occurred_at: test_time(),
            }))
            .unwrap();
        assert_eq!(f.partnership.content(), "수정된 문의");

        let f = submitted();
        let err = f
            .partnership
            .handle(&PartnershipCommand::EditContent(EditContent {
                partnership_id: f.id,
                content: "too late".to_string(),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert_eq!(err, DomainError::invalid_state("partnership", "DRAFT", "SENT"));
    }

    #[test]
    fn submit_replaces_content_and_happens_once() {
        let mut f = created();
        f.partnership
            .execute(&PartnershipCommand::SubmitInquiry(SubmitInquiry {
                partnership_id: f.id,
                content: Some("최종 문의".to_string()),
                occurred_at: test_time(),
            }))
            .unwrap();
        assert_eq!(f.partnership.send_status(), SendStatus::Sent);
        assert_eq!(f.partnership.content(), "최종 문의");

        let err = f
            .partnership
            .handle(&PartnershipCommand::SubmitInquiry(SubmitInquiry {
                partnership_id: f.id,
                content: None,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidState { .. }));
    }

    #[test]
    fn accept_requires_sent() {
        let f = created();
        let err = f.partnership.handle(&accept(&f, f.receiver)).unwrap_err();
        assert_eq!(err, DomainError::invalid_state("partnership", "SENT", "DRAFT"));
    }

    #[test]
    fn only_receiver_may_answer() {
        let f = submitted();
        let err = f.partnership.handle(&decline(&f, f.sender)).unwrap_err();
        assert_eq!(err, DomainError::identity_mismatch("partnership", "receiver"));
    }

    #[test]
    fn answer_is_terminal() {
        let mut f = submitted();
        f.partnership.execute(&accept(&f, f.receiver)).unwrap();
        assert_eq!(f.partnership.accepted_status(), AcceptedStatus::Accepted);

        for cmd in [accept(&f, f.receiver), decline(&f, f.receiver)] {
            let err = f.partnership.handle(&cmd).unwrap_err();
            assert_eq!(err, DomainError::invalid_state("partnership", "WAITING", "ACCEPTED"));
        }
    }

    #[test]
    fn declined_inquiries_leave_the_pair_guard_and_are_deletable() {
        let mut f = submitted();
        f.partnership.execute(&decline(&f, f.receiver)).unwrap();
        assert!(!f.partnership.is_live());

        f.partnership
            .execute(&PartnershipCommand::DeletePartnership(DeletePartnership {
                partnership_id: f.id,
                occurred_at: test_time(),
            }))
            .unwrap();
        assert!(f.partnership.is_deleted());

        let err = f.partnership.handle(&decline(&f, f.receiver)).unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[test]
    fn accepted_and_waiting_inquiries_are_not_deletable() {
        let delete = |f: &Fixture| {
            PartnershipCommand::DeletePartnership(DeletePartnership {
                partnership_id: f.id,
                occurred_at: test_time(),
            })
        };

        let f = submitted();
        assert!(f.partnership.handle(&delete(&f)).is_err());

        let mut f = submitted();
        f.partnership.execute(&accept(&f, f.receiver)).unwrap();
        let err = f.partnership.handle(&delete(&f)).unwrap_err();
        assert_eq!(err, DomainError::invalid_state("partnership", "DECLINED", "ACCEPTED"));

        let f = created();
        assert!(f.partnership.handle(&delete(&f)).is_ok());
    }

    #[test]
    fn failed_command_leaves_state_untouched() {
        let mut f = created();
        let before = f.partnership.clone();
        assert!(f.partnership.execute(&accept(&f, f.receiver)).is_err());
        assert_eq!(f.partnership, before);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn command(f: &Fixture, op: u8) -> PartnershipCommand {
            let occurred_at = test_time();
            match op {
                0 => PartnershipCommand::EditContent(EditContent {
                    partnership_id: f.id,
                    content: "수정된 제안".to_string(),
                    occurred_at,
                }),
                1 => PartnershipCommand::SubmitInquiry(SubmitInquiry {
                    partnership_id: f.id,
                    content: None,
                    occurred_at,
                }),
                2 => accept(f, f.receiver),
                3 => accept(f, f.sender),
                4 => decline(f, f.receiver),
                _ => PartnershipCommand::DeletePartnership(DeletePartnership {
                    partnership_id: f.id,
                    occurred_at,
                }),
            }
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 1000,
                ..ProptestConfig::default()
            })]

            /// Property: sending and answering happen at most once, never roll
            /// back, and every accepted command advances the version by one.
            #[test]
            fn transitions_are_monotonic(ops in proptest::collection::vec(0u8..6, 0..12)) {
                let mut f = created();
                let mut applied = 1;
                for op in ops {
                    let before = f.partnership.clone();
                    let cmd = command(&f, op);
                    match f.partnership.execute(&cmd) {
                        Ok(events) => {
                            prop_assert_eq!(events.len(), 1);
                            applied += 1;
                        }
                        Err(_) => prop_assert_eq!(&f.partnership, &before),
                    }
                    prop_assert_eq!(f.partnership.version(), applied);

                    if before.send_status() == SendStatus::Sent {
                        prop_assert_eq!(f.partnership.send_status(), SendStatus::Sent);
                    }
                    if before.accepted_status() != AcceptedStatus::Waiting {
                        prop_assert_eq!(f.partnership.accepted_status(), before.accepted_status());
                    }
                    if f.partnership.accepted_status() != AcceptedStatus::Waiting {
                        prop_assert_eq!(f.partnership.send_status(), SendStatus::Sent);
                    }
                }
            }
        }
    }
}
