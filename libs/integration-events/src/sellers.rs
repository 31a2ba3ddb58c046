use chrono::{DateTime, Utc};
use modkit_bus::IntegrationEvent;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identity::AccountId;

/// Fact: a seller finished onboarding and owns `account_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerRegistered {
    pub seller_id: Uuid,
    pub account_id: AccountId,
    pub registered_at: DateTime<Utc>,
}

impl IntegrationEvent for SellerRegistered {
    const NAME: &'static str = "sellers.seller_registered";
}
