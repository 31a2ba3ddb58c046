use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use integration_events::identity::{AccountId, AccountRole};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    /// Normalized: trimmed, lowercase.
    pub email: String,
    pub display_name: String,
    pub roles: BTreeSet<AccountRole>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn has_role(&self, role: AccountRole) -> bool {
        self.roles.contains(&role)
    }
}
