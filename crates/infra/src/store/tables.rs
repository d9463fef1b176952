use std::collections::HashMap;

use allyflow_agreements::Agreement;
use allyflow_core::{
    AccountId, AgreementId, AggregateRoot, DomainError, PartnershipId, PromotionId,
};
use allyflow_partnerships::Partnership;
use allyflow_promotions::Promotion;

/// The three record tables plus back-reference lookups.
///
/// Agreement owns its partnership reference and promotion owns its agreement
/// reference; the reverse direction is answered by scanning.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    partnerships: HashMap<PartnershipId, Partnership>,
    agreements: HashMap<AgreementId, Agreement>,
    promotions: HashMap<PromotionId, Promotion>,
}

impl Tables {
    /// A live record. Deleted partnerships read as absent.
    pub fn partnership(&self, id: PartnershipId) -> Result<&Partnership, DomainError> {
        self.partnerships
            .get(&id)
            .filter(|p| !p.is_deleted())
            .ok_or_else(|| DomainError::not_found("partnership", id))
    }

    pub fn partnership_mut(&mut self, id: PartnershipId) -> Result<&mut Partnership, DomainError> {
        self.partnerships
            .get_mut(&id)
            .filter(|p| !p.is_deleted())
            .ok_or_else(|| DomainError::not_found("partnership", id))
    }

    pub fn agreement(&self, id: AgreementId) -> Result<&Agreement, DomainError> {
        self.agreements
            .get(&id)
            .ok_or_else(|| DomainError::not_found("agreement", id))
    }

    pub fn agreement_mut(&mut self, id: AgreementId) -> Result<&mut Agreement, DomainError> {
        self.agreements
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("agreement", id))
    }

    pub fn promotion(&self, id: PromotionId) -> Result<&Promotion, DomainError> {
        self.promotions
            .get(&id)
            .ok_or_else(|| DomainError::not_found("promotion", id))
    }

    pub fn promotion_mut(&mut self, id: PromotionId) -> Result<&mut Promotion, DomainError> {
        self.promotions
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("promotion", id))
    }

    pub fn insert_partnership(&mut self, partnership: Partnership) {
        self.partnerships.insert(*partnership.id(), partnership);
    }

    pub fn insert_agreement(&mut self, agreement: Agreement) {
        self.agreements.insert(*agreement.id(), agreement);
    }

    pub fn insert_promotion(&mut self, promotion: Promotion) {
        self.promotions.insert(*promotion.id(), promotion);
    }

    pub fn partnerships(&self) -> impl Iterator<Item = &Partnership> {
        self.partnerships.values()
    }

    pub fn agreements(&self) -> impl Iterator<Item = &Agreement> {
        self.agreements.values()
    }

    pub fn promotions(&self) -> impl Iterator<Item = &Promotion> {
        self.promotions.values()
    }

    /// The non-declined, non-deleted partnership from `sender` to `receiver`.
    pub fn live_partnership_between(
        &self,
        sender: AccountId,
        receiver: AccountId,
    ) -> Option<&Partnership> {
        self.partnerships.values().find(|p| {
            p.is_live() && p.sender() == Some(sender) && p.receiver() == Some(receiver)
        })
    }

    pub fn agreement_for_partnership(&self, partnership: PartnershipId) -> Option<&Agreement> {
        self.agreements
            .values()
            .find(|a| a.partnership() == Some(partnership))
    }

    /// Any promotion referencing the agreement, deleted ones included.
    pub fn promotion_for_agreement(&self, agreement: AgreementId) -> Option<&Promotion> {
        self.promotions
            .values()
            .find(|p| p.agreement() == Some(agreement))
    }

    /// Approved agreements involving `account` whose range touches the month,
    /// ordered by start date.
    pub fn approved_in_month(&self, account: AccountId, year: i32, month: u32) -> Vec<&Agreement> {
        let mut found: Vec<&Agreement> = self
            .agreements
            .values()
            .filter(|a| a.involves(account) && a.is_active_in_month(year, month))
            .collect();
        found.sort_by_key(|a| a.period().map(|p| p.start()));
        found
    }
}
