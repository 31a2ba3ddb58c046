use dashmap::DashMap;
use uuid::Uuid;

use crate::domain::model::Product;

#[derive(Default)]
pub struct ProductRepository {
    products: DashMap<Uuid, Product>,
}

impl ProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, product: Product) {
        self.products.insert(product.id, product);
    }

    pub fn get(&self, id: Uuid) -> Option<Product> {
        self.products.get(&id).map(|p| p.value().clone())
    }

    pub fn remove(&self, id: Uuid) -> Option<Product> {
        self.products.remove(&id).map(|(_, p)| p)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
