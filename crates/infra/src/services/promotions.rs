use allyflow_agreements::{Agreement, AgreementStatus};
use allyflow_ai::{Drafted, TextGenerator};
use allyflow_core::{AgreementId, DomainError, ExpectedVersion, PromotionId};
use allyflow_promotions::{
    CreatePromotion, DeletePromotion, Promotion, PromotionCommand, PromotionContent,
    PromotionPatch, PromotionStatus, PublishPromotion, RepublishPromotion, SaveDraft,
};
use chrono::{DateTime, Utc};
use tracing::info;

use super::{Workflow, execute};
use crate::collaborators::ImageUpload;
use crate::drafting::{BenefitDraftKind, BenefitInput, PromotionDraftKind, PromotionInput};
use crate::error::WorkflowError;
use crate::store::{Tables, WorkflowStore};

pub struct PromotionService<'a, S, G> {
    wf: &'a Workflow<S, G>,
}

impl<'a, S: WorkflowStore, G: TextGenerator> PromotionService<'a, S, G> {
    pub(super) fn new(wf: &'a Workflow<S, G>) -> Self {
        Self { wf }
    }

    /// Generate copy for an approved agreement and save it as a DRAFT.
    ///
    /// Both visibility flags start on and exposure ends with the promotion.
    pub async fn create_generated(
        &self,
        agreement_id: AgreementId,
    ) -> Result<Promotion, WorkflowError> {
        let agreement = self
            .wf
            .store
            .read(|t| ensure_can_promote(t, agreement_id).cloned())??;

        let listing = self.wf.listing_snapshot(agreement.listing()).await?;
        let input = PromotionInput::new(&agreement, listing);
        let drafted = self
            .wf
            .pipeline
            .draft(&PromotionDraftKind, &input, self.wf.clock.today())
            .await?;

        let (start_date, end_date) = match drafted.period {
            Some(range) => (Some(range.start()), Some(range.end())),
            None => (None, None),
        };
        let clauses = input.clauses;
        let patch = PromotionPatch {
            title: Some(drafted.output.title),
            target: Some(clauses.target),
            benefit: Some(clauses.benefit),
            condition: Some(clauses.condition),
            body: Some(drafted.output.content),
            start_date,
            end_date,
            exposure_end: end_date,
            expose_sender: Some(true),
            expose_receiver: Some(true),
            image_url: None,
        };

        let now = self.wf.clock.now();
        let promotion = self.wf.store.transaction(|tables| -> Result<_, WorkflowError> {
            create_in(tables, agreement_id, patch, false, now)
        })?;

        info!(
            promotion_id = %promotion.id_typed(),
            source = ?drafted.source,
            "promotion drafted"
        );
        Ok(promotion)
    }

    /// Body copy for a store's own benefit post. Nothing is stored; the
    /// caller publishes the copy through its own channel.
    pub async fn draft_benefit(&self, input: &BenefitInput) -> Result<Drafted<String>, WorkflowError> {
        let drafted = self
            .wf
            .pipeline
            .draft(&BenefitDraftKind, input, self.wf.clock.today())
            .await?;
        info!(source = ?drafted.source, school = input.school(), "benefit copy drafted");
        Ok(drafted)
    }

    /// Start a new DRAFT for the agreement from whatever fields are filled in.
    pub async fn save_new_draft(
        &self,
        agreement_id: AgreementId,
        patch: PromotionPatch,
        image: Option<ImageUpload>,
    ) -> Result<Promotion, WorkflowError> {
        let image = image.filter(|i| !i.is_empty());
        if !patch.has_any_field() && image.is_none() {
            return Err(DomainError::validation("patch", "a draft needs at least one written field").into());
        }
        self.wf
            .store
            .read(|t| ensure_can_promote(t, agreement_id).map(|_| ()))??;

        let now = self.wf.clock.now();
        self.with_image(image, patch, |patch| {
            self.wf.store.transaction(|tables| -> Result<_, WorkflowError> {
                Ok((create_in(tables, agreement_id, patch, false, now)?, None))
            })
        })
        .await
    }

    /// Patch an existing DRAFT, optionally replacing its image.
    pub async fn save_draft(
        &self,
        promotion_id: PromotionId,
        expected: ExpectedVersion,
        patch: PromotionPatch,
        image: Option<ImageUpload>,
    ) -> Result<Promotion, WorkflowError> {
        self.ensure_status(promotion_id, PromotionStatus::Draft)?;
        let now = self.wf.clock.now();
        self.with_image(image.filter(|i| !i.is_empty()), patch, |patch| {
            self.replace(
                promotion_id,
                expected,
                PromotionCommand::SaveDraft(SaveDraft {
                    promotion_id,
                    patch,
                    occurred_at: now,
                }),
            )
        })
        .await
    }

    /// DRAFT -> PUBLISHED once every field is present.
    pub fn publish(
        &self,
        promotion_id: PromotionId,
        expected: ExpectedVersion,
    ) -> Result<Promotion, WorkflowError> {
        let command = PromotionCommand::Publish(PublishPromotion {
            promotion_id,
            occurred_at: self.wf.clock.now(),
        });
        Ok(self.replace(promotion_id, expected, command)?.0)
    }

    /// Create a promotion directly in PUBLISHED. The image is mandatory.
    pub async fn publish_manual(
        &self,
        agreement_id: AgreementId,
        patch: PromotionPatch,
        image: ImageUpload,
    ) -> Result<Promotion, WorkflowError> {
        PromotionContent::default()
            .patched(&patch)
            .validate_for_publish()?;
        if image.is_empty() {
            return Err(DomainError::missing("image").into());
        }
        self.wf
            .store
            .read(|t| ensure_can_promote(t, agreement_id).map(|_| ()))??;

        let now = self.wf.clock.now();
        self.with_image(Some(image), patch, |patch| {
            self.wf.store.transaction(|tables| -> Result<_, WorkflowError> {
                Ok((create_in(tables, agreement_id, patch, true, now)?, None))
            })
        })
        .await
    }

    /// Edit a PUBLISHED promotion; the merged copy must still be complete.
    pub async fn republish(
        &self,
        promotion_id: PromotionId,
        expected: ExpectedVersion,
        patch: PromotionPatch,
        image: Option<ImageUpload>,
    ) -> Result<Promotion, WorkflowError> {
        self.ensure_status(promotion_id, PromotionStatus::Published)?;
        let now = self.wf.clock.now();
        self.with_image(image.filter(|i| !i.is_empty()), patch, |patch| {
            self.replace(
                promotion_id,
                expected,
                PromotionCommand::Republish(RepublishPromotion {
                    promotion_id,
                    patch,
                    occurred_at: now,
                }),
            )
        })
        .await
    }

    /// PUBLISHED -> DELETED. The record is kept and still blocks a new
    /// promotion for the same agreement.
    pub fn delete(
        &self,
        promotion_id: PromotionId,
        expected: ExpectedVersion,
    ) -> Result<Promotion, WorkflowError> {
        let command = PromotionCommand::Delete(DeletePromotion {
            promotion_id,
            occurred_at: self.wf.clock.now(),
        });
        Ok(self.replace(promotion_id, expected, command)?.0)
    }

    pub fn get(&self, promotion_id: PromotionId) -> Result<Promotion, WorkflowError> {
        Ok(self.wf.store.read(|t| t.promotion(promotion_id).cloned())??)
    }

    /// Upload first, commit second. A failed commit removes the fresh upload;
    /// a successful one removes the image it superseded.
    async fn with_image<F>(
        &self,
        image: Option<ImageUpload>,
        mut patch: PromotionPatch,
        commit: F,
    ) -> Result<Promotion, WorkflowError>
    where
        F: FnOnce(PromotionPatch) -> Result<(Promotion, Option<String>), WorkflowError>,
    {
        let uploaded = match image {
            Some(image) => Some(self.wf.files.upload(&image).await?),
            None => None,
        };
        if let Some(url) = &uploaded {
            patch.image_url = Some(url.clone());
        }

        match commit(patch) {
            Ok((promotion, previous)) => {
                if let (Some(new), Some(old)) = (&uploaded, previous) {
                    if *new != old {
                        self.wf.discard_image(&old).await;
                    }
                }
                Ok(promotion)
            }
            Err(e) => {
                if let Some(url) = uploaded {
                    self.wf.discard_image(&url).await;
                }
                Err(e)
            }
        }
    }

    /// Run a command on an existing promotion. Also returns the image URL it
    /// carried before the command.
    fn replace(
        &self,
        promotion_id: PromotionId,
        expected: ExpectedVersion,
        command: PromotionCommand,
    ) -> Result<(Promotion, Option<String>), WorkflowError> {
        self.wf.store.transaction(|tables| -> Result<_, WorkflowError> {
            let promotion = tables.promotion_mut(promotion_id)?;
            let previous = promotion.content().image_url.clone();
            execute(promotion, expected, &command)?;
            Ok((promotion.clone(), previous))
        })
    }

    /// Status pre-check so a doomed edit never uploads an image.
    fn ensure_status(
        &self,
        promotion_id: PromotionId,
        required: PromotionStatus,
    ) -> Result<(), WorkflowError> {
        let status = self
            .wf
            .store
            .read(|t| t.promotion(promotion_id).map(Promotion::status))??;
        if status != required {
            return Err(DomainError::invalid_state("promotion", required, status).into());
        }
        Ok(())
    }
}

fn ensure_can_promote(tables: &Tables, agreement_id: AgreementId) -> Result<&Agreement, DomainError> {
    let agreement = tables.agreement(agreement_id)?;
    if agreement.status() != AgreementStatus::Approved {
        return Err(DomainError::invalid_state(
            "agreement",
            AgreementStatus::Approved,
            agreement.status(),
        ));
    }
    if let Some(existing) = tables.promotion_for_agreement(agreement_id) {
        return Err(DomainError::already_exists(
            "promotion",
            format!(
                "agreement {agreement_id} already has promotion {}",
                existing.id_typed()
            ),
        ));
    }
    Ok(agreement)
}

fn create_in(
    tables: &mut Tables,
    agreement_id: AgreementId,
    patch: PromotionPatch,
    publish: bool,
    occurred_at: DateTime<Utc>,
) -> Result<Promotion, WorkflowError> {
    let agreement = ensure_can_promote(tables, agreement_id)?;
    let (sender, receiver) = match (agreement.sender(), agreement.receiver()) {
        (Some(s), Some(r)) => (s, r),
        _ => return Err(DomainError::not_found("agreement", agreement_id).into()),
    };

    let promotion_id = PromotionId::new();
    let command = PromotionCommand::CreatePromotion(CreatePromotion {
        promotion_id,
        agreement_id,
        sender,
        receiver,
        patch,
        publish,
        occurred_at,
    });
    let mut promotion = Promotion::empty(promotion_id);
    execute(&mut promotion, ExpectedVersion::Exact(0), &command)?;
    tables.insert_promotion(promotion.clone());
    Ok(promotion)
}
