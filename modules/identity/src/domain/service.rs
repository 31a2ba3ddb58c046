use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use integration_events::identity::{AccountId, AccountRole, CreateAccount};

use crate::config::IdentityConfig;
use crate::domain::error::DomainError;
use crate::domain::model::Account;
use crate::infra::uow::UnitOfWork;

/// Account use cases, bound to one unit of work.
pub struct AccountService {
    uow: Arc<UnitOfWork>,
    config: Arc<IdentityConfig>,
}

impl AccountService {
    pub fn new(uow: Arc<UnitOfWork>, config: Arc<IdentityConfig>) -> Self {
        Self { uow, config }
    }

    /// Validate and stage a new account. The caller commits.
    pub fn create_account(&self, req: &CreateAccount) -> Result<Account, DomainError> {
        let email = normalize_email(&req.email)?;
        let display_name = self.validate_display_name(&req.display_name)?;

        if self.uow.find_by_email(&email).is_some() {
            return Err(DomainError::EmailAlreadyExists { email });
        }

        let account = Account {
            id: AccountId::new(),
            email,
            display_name,
            roles: BTreeSet::from([req.role]),
            created_at: Utc::now(),
        };
        self.uow.insert(account.clone());
        Ok(account)
    }

    /// Stage a role grant. Granting a role the account already has is a no-op.
    pub fn grant_role(&self, id: AccountId, role: AccountRole) -> Result<Account, DomainError> {
        let mut account = self
            .uow
            .get(id)
            .ok_or(DomainError::AccountNotFound { id })?;
        if account.roles.insert(role) {
            self.uow.grant_role(id, role);
        }
        Ok(account)
    }

    fn validate_display_name(&self, raw: &str) -> Result<String, DomainError> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(DomainError::EmptyDisplayName);
        }
        let len = name.chars().count();
        let max = self.config.max_display_name_length;
        if len > max {
            return Err(DomainError::DisplayNameTooLong { len, max });
        }
        Ok(name.to_owned())
    }
}

/// Trim + lowercase, then check for a `local@domain.tld` shape.
pub fn normalize_email(raw: &str) -> Result<String, DomainError> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() {
        return Err(DomainError::EmptyEmail);
    }
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(DomainError::InvalidEmail { email });
    }
    Ok(email)
}
