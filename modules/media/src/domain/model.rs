use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaAsset {
    pub id: Uuid,
    pub product_id: Uuid,
    pub url: String,
    pub content_type: String,
    pub attached_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMediaAsset {
    pub product_id: Uuid,
    pub url: String,
    pub content_type: String,
}
