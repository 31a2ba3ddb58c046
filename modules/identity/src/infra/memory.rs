use std::collections::{HashMap, HashSet};

use integration_events::identity::AccountId;
use parking_lot::RwLock;

use crate::domain::error::DomainError;
use crate::domain::model::Account;
use crate::domain::repo::{AccountChange, AccountRepository};

#[derive(Default)]
struct Inner {
    by_id: HashMap<AccountId, Account>,
    by_email: HashMap<String, AccountId>,
}

/// Process-local account store.
#[derive(Default)]
pub struct InMemoryAccountRepository {
    inner: RwLock<Inner>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccountRepository for InMemoryAccountRepository {
    fn get(&self, id: AccountId) -> Option<Account> {
        self.inner.read().by_id.get(&id).cloned()
    }

    fn find_by_email(&self, email: &str) -> Option<Account> {
        let inner = self.inner.read();
        inner
            .by_email
            .get(email)
            .and_then(|id| inner.by_id.get(id))
            .cloned()
    }

    fn apply(&self, changes: Vec<AccountChange>) -> Result<(), DomainError> {
        let mut inner = self.inner.write();

        // Validate the whole batch under the write lock before touching anything.
        {
            let mut new_emails = HashSet::new();
            let mut new_ids = HashSet::new();
            for change in &changes {
                match change {
                    AccountChange::Insert(a) => {
                        if inner.by_email.contains_key(&a.email) || !new_emails.insert(a.email.as_str()) {
                            return Err(DomainError::EmailAlreadyExists {
                                email: a.email.clone(),
                            });
                        }
                        new_ids.insert(a.id);
                    }
                    AccountChange::GrantRole { id, .. } => {
                        if !inner.by_id.contains_key(id) && !new_ids.contains(id) {
                            return Err(DomainError::AccountNotFound { id: *id });
                        }
                    }
                }
            }
        }

        for change in changes {
            match change {
                AccountChange::Insert(a) => {
                    inner.by_email.insert(a.email.clone(), a.id);
                    inner.by_id.insert(a.id, a);
                }
                AccountChange::GrantRole { id, role } => {
                    if let Some(account) = inner.by_id.get_mut(&id) {
                        account.roles.insert(role);
                    }
                }
            }
        }
        Ok(())
    }

    fn count(&self) -> usize {
        self.inner.read().by_id.len()
    }
}
