use chrono::{DateTime, Utc};
use integration_events::identity::AccountId;
use uuid::Uuid;

/// Seller aggregate. Exists only once identity has issued its account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seller {
    pub id: Uuid,
    pub account_id: AccountId,
    pub shop_name: String,
    pub registered_at: DateTime<Utc>,
}

/// Data for onboarding a new seller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSeller {
    pub email: String,
    pub display_name: String,
    pub shop_name: String,
}
