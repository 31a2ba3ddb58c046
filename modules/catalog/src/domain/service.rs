use std::sync::Arc;

use chrono::Utc;
use integration_events::catalog::ProductDeleted;
use modkit::bus::{BusError, CancellationToken, EventBus, Outcome, VoidOutcome};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::model::{NewProduct, Product};
use crate::domain::repo::ProductRepository;
use crate::domain::search::SearchIndex;

pub struct CatalogService {
    bus: EventBus,
    products: Arc<ProductRepository>,
    search: Arc<SearchIndex>,
}

impl CatalogService {
    pub fn new(bus: EventBus, products: Arc<ProductRepository>, search: Arc<SearchIndex>) -> Self {
        Self {
            bus,
            products,
            search,
        }
    }

    pub fn add_product(&self, new_product: NewProduct) -> Outcome<Product> {
        let title = new_product.title.trim();
        if title.is_empty() {
            return DomainError::EmptyTitle.into_outcome();
        }
        let product = Product {
            id: Uuid::new_v4(),
            seller_id: new_product.seller_id,
            title: title.to_owned(),
            created_at: Utc::now(),
        };
        self.products.insert(product.clone());
        self.search.index(product.id, &product.title);
        tracing::debug!(product_id = %product.id, "product added");
        Outcome::created(product)
    }

    /// Remove a product and announce it. The returned outcome is the
    /// broadcast's aggregate; the product is gone either way.
    #[tracing::instrument(skip(self, cancel))]
    pub async fn delete_product(
        &self,
        product_id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<VoidOutcome, BusError> {
        let Some(product) = self.products.remove(product_id) else {
            return Ok(DomainError::ProductNotFound { id: product_id }.into_outcome());
        };
        tracing::info!(seller_id = %product.seller_id, "product deleted");

        self.bus
            .publish_broadcast(
                ProductDeleted {
                    product_id,
                    seller_id: product.seller_id,
                    deleted_at: Utc::now(),
                },
                cancel,
            )
            .await
    }

    pub fn get(&self, id: Uuid) -> Option<Product> {
        self.products.get(id)
    }

    pub fn search(&self, term: &str) -> Vec<Product> {
        self.search
            .search(term)
            .into_iter()
            .filter_map(|id| self.products.get(id))
            .collect()
    }
}
