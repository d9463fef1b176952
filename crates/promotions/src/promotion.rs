use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use allyflow_core::{
    AccountId, Aggregate, AggregateRoot, AgreementId, DomainError, Event, PromotionId, ValueObject,
    has_text, period::check_optional_range,
};

const ENTITY: &str = "promotion";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PromotionStatus {
    Draft,
    Published,
    Deleted,
}

impl PromotionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PromotionStatus::Draft => "DRAFT",
            PromotionStatus::Published => "PUBLISHED",
            PromotionStatus::Deleted => "DELETED",
        }
    }
}

impl core::fmt::Display for PromotionStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Editable copy of a promotion. Empty strings and `None` mean "not written yet".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionContent {
    pub title: String,
    pub target: String,
    pub benefit: String,
    pub condition: String,
    pub body: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub exposure_end: Option<NaiveDate>,
    pub expose_sender: bool,
    pub expose_receiver: bool,
    pub image_url: Option<String>,
}

impl ValueObject for PromotionContent {}

impl PromotionContent {
    /// Apply a partial patch; absent fields keep their prior values.
    pub fn patched(&self, patch: &PromotionPatch) -> Self {
        fn text(current: &str, update: &Option<String>) -> String {
            match update {
                Some(v) if has_text(Some(v.as_str())) => v.trim().to_string(),
                _ => current.to_string(),
            }
        }

        Self {
            title: text(&self.title, &patch.title),
            target: text(&self.target, &patch.target),
            benefit: text(&self.benefit, &patch.benefit),
            condition: text(&self.condition, &patch.condition),
            body: text(&self.body, &patch.body),
            start_date: patch.start_date.or(self.start_date),
            end_date: patch.end_date.or(self.end_date),
            exposure_end: patch.exposure_end.or(self.exposure_end),
            expose_sender: patch.expose_sender.unwrap_or(self.expose_sender),
            expose_receiver: patch.expose_receiver.unwrap_or(self.expose_receiver),
            image_url: match &patch.image_url {
                Some(url) if has_text(Some(url.as_str())) => Some(url.trim().to_string()),
                _ => self.image_url.clone(),
            },
        }
    }

    /// Every copy field and both dates present, end not before start.
    pub fn validate_for_publish(&self) -> Result<(), DomainError> {
        let required = [
            ("title", &self.title),
            ("target", &self.target),
            ("benefit", &self.benefit),
            ("condition", &self.condition),
            ("body", &self.body),
        ];
        for (field, value) in required {
            if !has_text(Some(value.as_str())) {
                return Err(DomainError::missing(field));
            }
        }
        let (Some(start), Some(end)) = (self.start_date, self.end_date) else {
            return Err(DomainError::missing(if self.start_date.is_none() {
                "start_date"
            } else {
                "end_date"
            }));
        };
        check_optional_range(Some(start), Some(end))
    }

    fn check_dates(&self) -> Result<(), DomainError> {
        check_optional_range(self.start_date, self.end_date)
    }
}

/// Partial update. `None` and blank text leave the current value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionPatch {
    pub title: Option<String>,
    pub target: Option<String>,
    pub benefit: Option<String>,
    pub condition: Option<String>,
    pub body: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub exposure_end: Option<NaiveDate>,
    pub expose_sender: Option<bool>,
    pub expose_receiver: Option<bool>,
    pub image_url: Option<String>,
}

impl PromotionPatch {
    /// At least one field carries a value. A flag only counts when it is `true`.
    pub fn has_any_field(&self) -> bool {
        [
            &self.title,
            &self.target,
            &self.benefit,
            &self.condition,
            &self.body,
            &self.image_url,
        ]
        .into_iter()
        .any(|v| has_text(v.as_deref()))
            || self.start_date.is_some()
            || self.end_date.is_some()
            || self.exposure_end.is_some()
            || self.expose_sender == Some(true)
            || self.expose_receiver == Some(true)
    }

    /// A patch that writes every field of `content`.
    pub fn full(content: &PromotionContent) -> Self {
        fn text(v: &str) -> Option<String> {
            has_text(Some(v)).then(|| v.to_string())
        }

        Self {
            title: text(&content.title),
            target: text(&content.target),
            benefit: text(&content.benefit),
            condition: text(&content.condition),
            body: text(&content.body),
            start_date: content.start_date,
            end_date: content.end_date,
            exposure_end: content.exposure_end,
            expose_sender: Some(content.expose_sender),
            expose_receiver: Some(content.expose_receiver),
            image_url: content.image_url.clone(),
        }
    }
}

/// Aggregate root: Promotion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Promotion {
    id: PromotionId,
    agreement: Option<AgreementId>,
    sender: Option<AccountId>,
    receiver: Option<AccountId>,
    content: PromotionContent,
    status: PromotionStatus,
    published_at: Option<DateTime<Utc>>,
    version: u64,
    created: bool,
}

impl Promotion {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: PromotionId) -> Self {
        Self {
            id,
            agreement: None,
            sender: None,
            receiver: None,
            content: PromotionContent::default(),
            status: PromotionStatus::Draft,
            published_at: None,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> PromotionId {
        self.id
    }

    pub fn agreement(&self) -> Option<AgreementId> {
        self.agreement
    }

    pub fn sender(&self) -> Option<AccountId> {
        self.sender
    }

    pub fn receiver(&self) -> Option<AccountId> {
        self.receiver
    }

    pub fn content(&self) -> &PromotionContent {
        &self.content
    }

    pub fn status(&self) -> PromotionStatus {
        self.status
    }

    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.published_at
    }

    pub fn is_created(&self) -> bool {
        self.created
    }

    pub fn is_deleted(&self) -> bool {
        self.status == PromotionStatus::Deleted
    }
}

impl AggregateRoot for Promotion {
    type Id = PromotionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreatePromotion.
///
/// With `publish` unset the record starts as DRAFT and needs at least one
/// field; with `publish` set it starts as PUBLISHED and must pass full
/// validation, image included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePromotion {
    pub promotion_id: PromotionId,
    pub agreement_id: AgreementId,
    pub sender: AccountId,
    pub receiver: AccountId,
    pub patch: PromotionPatch,
    pub publish: bool,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SaveDraft (DRAFT only, partial patch).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveDraft {
    pub promotion_id: PromotionId,
    pub patch: PromotionPatch,
    pub occurred_at: DateTime<Utc>,
}

/// Command: PublishPromotion (DRAFT -> PUBLISHED).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishPromotion {
    pub promotion_id: PromotionId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RepublishPromotion (edit a PUBLISHED promotion in place).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepublishPromotion {
    pub promotion_id: PromotionId,
    pub patch: PromotionPatch,
    pub occurred_at: DateTime<Utc>,
}

/// Command: DeletePromotion (PUBLISHED -> DELETED).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletePromotion {
    pub promotion_id: PromotionId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PromotionCommand {
    CreatePromotion(CreatePromotion),
    SaveDraft(SaveDraft),
    Publish(PublishPromotion),
    Republish(RepublishPromotion),
    Delete(DeletePromotion),
}

/// Event: PromotionCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionCreated {
    pub promotion_id: PromotionId,
    pub agreement_id: AgreementId,
    pub sender: AccountId,
    pub receiver: AccountId,
    pub content: PromotionContent,
    pub status: PromotionStatus,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PromotionDraftSaved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionDraftSaved {
    pub promotion_id: PromotionId,
    pub content: PromotionContent,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PromotionPublished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionPublished {
    pub promotion_id: PromotionId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PromotionRepublished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionRepublished {
    pub promotion_id: PromotionId,
    pub content: PromotionContent,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PromotionDeleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionDeleted {
    pub promotion_id: PromotionId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PromotionEvent {
    PromotionCreated(PromotionCreated),
    PromotionDraftSaved(PromotionDraftSaved),
    PromotionPublished(PromotionPublished),
    PromotionRepublished(PromotionRepublished),
    PromotionDeleted(PromotionDeleted),
}

impl Event for PromotionEvent {
    fn event_type(&self) -> &'static str {
        match self {
            PromotionEvent::PromotionCreated(_) => "promotion.created",
            PromotionEvent::PromotionDraftSaved(_) => "promotion.draft_saved",
            PromotionEvent::PromotionPublished(_) => "promotion.published",
            PromotionEvent::PromotionRepublished(_) => "promotion.republished",
            PromotionEvent::PromotionDeleted(_) => "promotion.deleted",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            PromotionEvent::PromotionCreated(e) => e.occurred_at,
            PromotionEvent::PromotionDraftSaved(e) => e.occurred_at,
            PromotionEvent::PromotionPublished(e) => e.occurred_at,
            PromotionEvent::PromotionRepublished(e) => e.occurred_at,
            PromotionEvent::PromotionDeleted(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Promotion {
    type Command = PromotionCommand;
    type Event = PromotionEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            PromotionEvent::PromotionCreated(e) => {
                self.id = e.promotion_id;
                self.agreement = Some(e.agreement_id);
                self.sender = Some(e.sender);
                self.receiver = Some(e.receiver);
                self.content = e.content.clone();
                self.status = e.status;
                self.published_at =
                    (e.status == PromotionStatus::Published).then_some(e.occurred_at);
                self.created = true;
            }
            PromotionEvent::PromotionDraftSaved(e) => {
                self.content = e.content.clone();
            }
            PromotionEvent::PromotionPublished(e) => {
                self.status = PromotionStatus::Published;
                self.published_at = Some(e.occurred_at);
            }
            PromotionEvent::PromotionRepublished(e) => {
                self.content = e.content.clone();
                self.published_at = Some(e.occurred_at);
            }
            PromotionEvent::PromotionDeleted(_) => {
                self.status = PromotionStatus::Deleted;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            PromotionCommand::CreatePromotion(cmd) => self.handle_create(cmd),
            PromotionCommand::SaveDraft(cmd) => self.handle_save_draft(cmd),
            PromotionCommand::Publish(cmd) => self.handle_publish(cmd),
            PromotionCommand::Republish(cmd) => self.handle_republish(cmd),
            PromotionCommand::Delete(cmd) => self.handle_delete(cmd),
        }
    }
}

impl Promotion {
    fn ensure_exists(&self, promotion_id: PromotionId) -> Result<(), DomainError> {
        if !self.created || self.id != promotion_id {
            return Err(DomainError::not_found(ENTITY, promotion_id));
        }
        Ok(())
    }

    fn ensure_status(&self, required: PromotionStatus) -> Result<(), DomainError> {
        if self.status != required {
            return Err(DomainError::invalid_state(ENTITY, required, self.status));
        }
        Ok(())
    }

    fn handle_create(&self, cmd: &CreatePromotion) -> Result<Vec<PromotionEvent>, DomainError> {
        if self.created {
            return Err(DomainError::already_exists(ENTITY, cmd.promotion_id.to_string()));
        }

        let content = PromotionContent::default().patched(&cmd.patch);
        let status = if cmd.publish {
            content.validate_for_publish()?;
            if !has_text(content.image_url.as_deref()) {
                return Err(DomainError::missing("image"));
            }
            PromotionStatus::Published
        } else {
            if !cmd.patch.has_any_field() {
                return Err(DomainError::validation(
                    "patch",
                    "a draft needs at least one written field",
                ));
            }
            content.check_dates()?;
            PromotionStatus::Draft
        };

        Ok(vec![PromotionEvent::PromotionCreated(PromotionCreated {
            promotion_id: cmd.promotion_id,
            agreement_id: cmd.agreement_id,
            sender: cmd.sender,
            receiver: cmd.receiver,
            content,
            status,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_save_draft(&self, cmd: &SaveDraft) -> Result<Vec<PromotionEvent>, DomainError> {
        self.ensure_exists(cmd.promotion_id)?;
        self.ensure_status(PromotionStatus::Draft)?;

        let content = self.content.patched(&cmd.patch);
        content.check_dates()?;

        Ok(vec![PromotionEvent::PromotionDraftSaved(PromotionDraftSaved {
            promotion_id: cmd.promotion_id,
            content,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_publish(&self, cmd: &PublishPromotion) -> Result<Vec<PromotionEvent>, DomainError> {
        self.ensure_exists(cmd.promotion_id)?;
        self.ensure_status(PromotionStatus::Draft)?;
        self.content.validate_for_publish()?;

        Ok(vec![PromotionEvent::PromotionPublished(PromotionPublished {
            promotion_id: cmd.promotion_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_republish(
        &self,
        cmd: &RepublishPromotion,
    ) -> Result<Vec<PromotionEvent>, DomainError> {
        self.ensure_exists(cmd.promotion_id)?;
        self.ensure_status(PromotionStatus::Published)?;

        let content = self.content.patched(&cmd.patch);
        content.validate_for_publish()?;

        Ok(vec![PromotionEvent::PromotionRepublished(PromotionRepublished {
            promotion_id: cmd.promotion_id,
            content,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_delete(&self, cmd: &DeletePromotion) -> Result<Vec<PromotionEvent>, DomainError> {
        self.ensure_exists(cmd.promotion_id)?;
        self.ensure_status(PromotionStatus::Published)?;

        Ok(vec![PromotionEvent::PromotionDeleted(PromotionDeleted {
            promotion_id: cmd.promotion_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}
