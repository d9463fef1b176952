//! Async workflow services.
//!
//! Every lifecycle operation follows the same shape:
//!
//! ```text
//! 1. Cheap guards against a read snapshot (fail before any collaborator call)
//!   ↓
//! 2. Collaborator calls (directories, text generation, image upload)
//!   ↓
//! 3. One store transaction: re-check guards, check the expected version,
//!    run the aggregate command, write the record
//!   ↓
//! 4. Best-effort side effects (superseded image cleanup), logged on failure
//! ```
//!
//! Generated text from step 2 is discarded if step 3 fails.

mod agreements;
mod partnerships;
mod promotions;

pub use agreements::{AgreementService, ManualAgreement};
pub use partnerships::{InquiryRequest, PartnershipService};
pub use promotions::PromotionService;

use std::fmt::Display;
use std::sync::Arc;

use allyflow_ai::{DraftingPipeline, TextGenerator};
use allyflow_core::{Aggregate, DomainError, Event, ExpectedVersion, ListingId};
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::collaborators::{
    AccountDirectory, DirectoryError, FileStore, ListingDirectory, ListingSnapshot,
};
use crate::error::WorkflowError;
use crate::store::WorkflowStore;

/// Shared wiring for the three lifecycle services.
pub struct Workflow<S, G> {
    store: S,
    pipeline: DraftingPipeline<G>,
    accounts: Arc<dyn AccountDirectory>,
    listings: Arc<dyn ListingDirectory>,
    files: Arc<dyn FileStore>,
    clock: Arc<dyn Clock>,
}

impl<S: WorkflowStore, G: TextGenerator> Workflow<S, G> {
    pub fn new(
        store: S,
        generator: G,
        accounts: Arc<dyn AccountDirectory>,
        listings: Arc<dyn ListingDirectory>,
        files: Arc<dyn FileStore>,
    ) -> Self {
        Self {
            store,
            pipeline: DraftingPipeline::new(generator),
            accounts,
            listings,
            files,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn generator(&self) -> &G {
        self.pipeline.generator()
    }

    pub fn partnerships(&self) -> PartnershipService<'_, S, G> {
        PartnershipService::new(self)
    }

    pub fn agreements(&self) -> AgreementService<'_, S, G> {
        AgreementService::new(self)
    }

    pub fn promotions(&self) -> PromotionService<'_, S, G> {
        PromotionService::new(self)
    }

    /// Listing copy for prompts and date fallback. A listing the directory
    /// no longer knows is treated as absent.
    async fn listing_snapshot(
        &self,
        listing: Option<ListingId>,
    ) -> Result<Option<ListingSnapshot>, WorkflowError> {
        let Some(listing) = listing else {
            return Ok(None);
        };
        match self.listings.find(listing).await {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(DirectoryError::NotFound { .. }) => {
                debug!(%listing, "listing not found, drafting without it");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Best-effort image removal; failures are logged and swallowed.
    async fn discard_image(&self, url: &str) {
        if let Err(e) = self.files.delete(url).await {
            warn!(url, error = %e, "failed to delete stored image");
        }
    }
}

/// Check the caller's expected version, then run the command on the record.
pub(crate) fn execute<A>(
    record: &mut A,
    expected: ExpectedVersion,
    command: &A::Command,
) -> Result<(), DomainError>
where
    A: Aggregate<Error = DomainError>,
    A::Event: Event,
    A::Id: Display,
{
    expected.check(record.version())?;
    let events = record.execute(command)?;
    for event in &events {
        info!(
            record = %record.id(),
            event = event.event_type(),
            version = record.version(),
            "transition applied"
        );
    }
    Ok(())
}
