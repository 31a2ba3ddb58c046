use modkit::bus::{FailureKind, Outcome};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("product not found: {id}")]
    ProductNotFound { id: Uuid },

    #[error("product title cannot be empty")]
    EmptyTitle,
}

impl DomainError {
    pub fn into_outcome<T>(self) -> Outcome<T> {
        let kind = match self {
            DomainError::ProductNotFound { .. } => FailureKind::NotFound,
            DomainError::EmptyTitle => FailureKind::BadRequest,
        };
        Outcome::failure(kind, self.to_string())
    }
}
