use std::sync::Arc;

use async_trait::async_trait;
use integration_events::catalog::ProductDeleted;
use modkit::bus::{CancellationToken, EventHandler, HandlerResult, Outcome};

use crate::domain::search::SearchIndex;

/// Drops deleted products from the search index.
pub struct RemoveFromSearchIndex {
    index: Arc<SearchIndex>,
}

impl RemoveFromSearchIndex {
    pub fn new(index: Arc<SearchIndex>) -> Self {
        Self { index }
    }
}

#[async_trait]
impl EventHandler<ProductDeleted> for RemoveFromSearchIndex {
    async fn handle(&self, event: &ProductDeleted, _cancel: &CancellationToken) -> HandlerResult<()> {
        let was_indexed = self.index.remove(event.product_id);
        tracing::debug!(product_id = %event.product_id, was_indexed, "search index updated");
        Ok(Outcome::ok())
    }
}
