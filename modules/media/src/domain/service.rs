use std::sync::Arc;

use chrono::Utc;
use modkit::bus::Outcome;
use uuid::Uuid;

use super::cache::MediaCache;
use super::error::DomainError;
use super::model::{MediaAsset, NewMediaAsset};
use crate::config::MediaConfig;

#[derive(Clone)]
pub struct MediaService {
    cache: Arc<MediaCache>,
    config: Arc<MediaConfig>,
}

impl MediaService {
    pub fn new(cache: Arc<MediaCache>, config: Arc<MediaConfig>) -> Self {
        Self { cache, config }
    }

    pub fn attach(&self, new_asset: NewMediaAsset) -> Outcome<MediaAsset> {
        let url = new_asset.url.trim();
        if url.is_empty() {
            return DomainError::EmptyUrl.into_outcome();
        }
        let asset = MediaAsset {
            id: Uuid::new_v4(),
            product_id: new_asset.product_id,
            url: url.to_owned(),
            content_type: new_asset.content_type,
            attached_at: Utc::now(),
        };
        match self
            .cache
            .attach(asset.clone(), self.config.max_assets_per_product)
        {
            Ok(()) => {
                tracing::debug!(product_id = %asset.product_id, asset_id = %asset.id, "media attached");
                Outcome::created(asset)
            }
            Err(e) => e.into_outcome(),
        }
    }

    pub fn assets(&self, product_id: Uuid) -> Vec<MediaAsset> {
        self.cache.assets(product_id)
    }
}
