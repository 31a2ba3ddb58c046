use chrono::{DateTime, Utc};
use modkit_bus::IntegrationEvent;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fact: a product was removed from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDeleted {
    pub product_id: Uuid,
    pub seller_id: Uuid,
    pub deleted_at: DateTime<Utc>,
}

impl IntegrationEvent for ProductDeleted {
    const NAME: &'static str = "catalog.product_deleted";
}
