use integration_events::identity::{AccountId, AccountRole};

use crate::domain::error::DomainError;
use crate::domain::model::Account;

/// A write staged by a unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountChange {
    Insert(Account),
    /// Merged into the stored roles at apply time, so concurrent grants
    /// for one account all survive.
    GrantRole { id: AccountId, role: AccountRole },
}

/// Account storage. Email uniqueness is enforced here so that two units of
/// work racing on the same address cannot both commit.
pub trait AccountRepository: Send + Sync {
    fn get(&self, id: AccountId) -> Option<Account>;
    fn find_by_email(&self, email: &str) -> Option<Account>;
    /// Apply every change or none of them.
    fn apply(&self, changes: Vec<AccountChange>) -> Result<(), DomainError>;
    fn count(&self) -> usize;
}
