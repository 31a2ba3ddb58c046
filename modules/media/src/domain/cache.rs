use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use super::error::DomainError;
use super::model::MediaAsset;

/// Product id → cached assets, in attach order.
#[derive(Default)]
pub struct MediaCache {
    by_product: DashMap<Uuid, Vec<MediaAsset>>,
}

impl MediaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The per-product limit is checked under the entry lock.
    /// Rejected attaches leave no entry behind.
    pub fn attach(&self, asset: MediaAsset, max: usize) -> Result<(), DomainError> {
        let too_many = DomainError::TooManyAssets {
            product_id: asset.product_id,
            max,
        };
        match self.by_product.entry(asset.product_id) {
            Entry::Occupied(mut e) => {
                if e.get().len() >= max {
                    return Err(too_many);
                }
                e.get_mut().push(asset);
            }
            Entry::Vacant(e) => {
                if max == 0 {
                    return Err(too_many);
                }
                e.insert(vec![asset]);
            }
        }
        Ok(())
    }

    pub fn assets(&self, product_id: Uuid) -> Vec<MediaAsset> {
        self.by_product
            .get(&product_id)
            .map(|a| a.clone())
            .unwrap_or_default()
    }

    /// Returns how many assets were dropped.
    pub fn purge(&self, product_id: Uuid) -> usize {
        self.by_product
            .remove(&product_id)
            .map_or(0, |(_, assets)| assets.len())
    }

    /// Number of products with cached media.
    pub fn len(&self) -> usize {
        self.by_product.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_product.is_empty()
    }
}
