use std::fmt;

use modkit_bus::IntegrationEvent;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of an identity account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub Uuid);

impl AccountId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountRole {
    Customer,
    Seller,
    Support,
}

/// Query: create an account and answer with its [`AccountId`].
///
/// Handled by identity; `Conflict` when the email is taken, `BadRequest` for
/// invalid input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAccount {
    pub email: String,
    pub display_name: String,
    pub role: AccountRole,
}

impl IntegrationEvent for CreateAccount {
    const NAME: &'static str = "identity.create_account";
}
