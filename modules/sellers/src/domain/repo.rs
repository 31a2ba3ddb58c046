use dashmap::DashMap;
use uuid::Uuid;

use crate::domain::model::Seller;

#[derive(Default)]
pub struct SellerRepository {
    sellers: DashMap<Uuid, Seller>,
}

impl SellerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, seller: Seller) {
        self.sellers.insert(seller.id, seller);
    }

    pub fn get(&self, id: Uuid) -> Option<Seller> {
        self.sellers.get(&id).map(|s| s.value().clone())
    }

    pub fn len(&self) -> usize {
        self.sellers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sellers.is_empty()
    }
}
