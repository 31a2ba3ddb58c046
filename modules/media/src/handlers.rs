use std::sync::Arc;

use async_trait::async_trait;
use integration_events::catalog::ProductDeleted;
use modkit::bus::{CancellationToken, EventHandler, HandlerResult, Outcome};

use crate::domain::cache::MediaCache;
use crate::domain::error::DomainError;

/// Purges cached media of a deleted product.
pub struct PurgeProductMedia {
    cache: Arc<MediaCache>,
    strict: bool,
}

impl PurgeProductMedia {
    pub fn new(cache: Arc<MediaCache>, strict: bool) -> Self {
        Self { cache, strict }
    }
}

#[async_trait]
impl EventHandler<ProductDeleted> for PurgeProductMedia {
    async fn handle(&self, event: &ProductDeleted, _cancel: &CancellationToken) -> HandlerResult<()> {
        let purged = self.cache.purge(event.product_id);
        if purged == 0 && self.strict {
            return Ok(DomainError::NothingCached {
                product_id: event.product_id,
            }
            .into_outcome());
        }
        tracing::debug!(product_id = %event.product_id, purged, "product media purged");
        Ok(Outcome::ok())
    }
}
