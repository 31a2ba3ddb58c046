use integration_events::identity::AccountId;
use modkit::bus::{FailureKind, Outcome};
use thiserror::Error;

/// Domain-specific errors using thiserror
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("account not found: {id}")]
    AccountNotFound { id: AccountId },

    #[error("email taken")]
    EmailAlreadyExists { email: String },

    #[error("email is required")]
    EmptyEmail,

    #[error("invalid email format: '{email}'")]
    InvalidEmail { email: String },

    #[error("display name cannot be empty")]
    EmptyDisplayName,

    #[error("display name too long: {len} characters (max: {max})")]
    DisplayNameTooLong { len: usize, max: usize },
}

impl DomainError {
    pub fn kind(&self) -> FailureKind {
        match self {
            DomainError::AccountNotFound { .. } => FailureKind::NotFound,
            DomainError::EmailAlreadyExists { .. } => FailureKind::Conflict,
            DomainError::EmptyEmail
            | DomainError::InvalidEmail { .. }
            | DomainError::EmptyDisplayName
            | DomainError::DisplayNameTooLong { .. } => FailureKind::BadRequest,
        }
    }

    pub fn into_outcome<T>(self) -> Outcome<T> {
        Outcome::failure(self.kind(), self.to_string())
    }
}
