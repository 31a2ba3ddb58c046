use std::sync::Arc;

use integration_events::identity::{AccountId, AccountRole};
use parking_lot::Mutex;

use crate::domain::error::DomainError;
use crate::domain::model::Account;
use crate::domain::repo::{AccountChange, AccountRepository};

/// Stages account writes for one bus call.
///
/// Lives in the call's resolution scope. Reads see staged changes first;
/// nothing reaches the repository until [`commit`](Self::commit), which
/// applies the whole batch or nothing. Dropping an uncommitted unit discards
/// its changes.
pub struct UnitOfWork {
    repo: Arc<dyn AccountRepository>,
    staged: Mutex<Vec<AccountChange>>,
}

impl UnitOfWork {
    pub fn new(repo: Arc<dyn AccountRepository>) -> Self {
        Self {
            repo,
            staged: Mutex::new(Vec::new()),
        }
    }

    pub fn get(&self, id: AccountId) -> Option<Account> {
        self.staged_insert(|a| a.id == id)
            .or_else(|| self.repo.get(id))
            .map(|a| self.with_staged_grants(a))
    }

    pub fn find_by_email(&self, email: &str) -> Option<Account> {
        self.staged_insert(|a| a.email == email)
            .or_else(|| self.repo.find_by_email(email))
            .map(|a| self.with_staged_grants(a))
    }

    pub fn insert(&self, account: Account) {
        self.staged.lock().push(AccountChange::Insert(account));
    }

    pub fn grant_role(&self, id: AccountId, role: AccountRole) {
        self.staged.lock().push(AccountChange::GrantRole { id, role });
    }

    pub fn pending(&self) -> usize {
        self.staged.lock().len()
    }

    /// Apply all staged changes atomically. A rejected batch is discarded.
    pub fn commit(&self) -> Result<usize, DomainError> {
        let changes = std::mem::take(&mut *self.staged.lock());
        let n = changes.len();
        self.repo.apply(changes)?;
        tracing::debug!(changes = n, "unit of work committed");
        Ok(n)
    }

    fn staged_insert(&self, pred: impl Fn(&Account) -> bool) -> Option<Account> {
        self.staged.lock().iter().rev().find_map(|c| match c {
            AccountChange::Insert(a) if pred(a) => Some(a.clone()),
            _ => None,
        })
    }

    fn with_staged_grants(&self, mut account: Account) -> Account {
        for change in self.staged.lock().iter() {
            if let AccountChange::GrantRole { id, role } = change {
                if *id == account.id {
                    account.roles.insert(*role);
                }
            }
        }
        account
    }
}

impl Drop for UnitOfWork {
    fn drop(&mut self) {
        let pending = self.staged.get_mut().len();
        if pending > 0 {
            tracing::debug!(pending, "unit of work discarded without commit");
        }
    }
}
