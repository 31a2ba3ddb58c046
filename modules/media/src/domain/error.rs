use modkit::bus::{FailureKind, Outcome};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("media url must not be empty")]
    EmptyUrl,

    #[error("product {product_id} already has {max} media assets")]
    TooManyAssets { product_id: Uuid, max: usize },

    #[error("no media cached for product {product_id}")]
    NothingCached { product_id: Uuid },
}

impl DomainError {
    pub fn kind(&self) -> FailureKind {
        match self {
            DomainError::EmptyUrl => FailureKind::BadRequest,
            DomainError::TooManyAssets { .. } => FailureKind::Conflict,
            DomainError::NothingCached { .. } => FailureKind::NotFound,
        }
    }

    pub fn into_outcome<T>(self) -> Outcome<T> {
        Outcome::failure(self.kind(), self.to_string())
    }
}
