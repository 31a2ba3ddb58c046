//! Bus handlers. Each one is built per publish call from the call's scope.

use std::sync::Arc;

use async_trait::async_trait;
use integration_events::identity::{AccountId, AccountRole, CreateAccount};
use integration_events::sellers::SellerRegistered;
use modkit::bus::{
    CancellationToken, EventHandler, HandlerResult, Outcome, RequestHandler,
};

use crate::domain::service::AccountService;
use crate::infra::uow::UnitOfWork;

pub struct CreateAccountHandler {
    service: AccountService,
    uow: Arc<UnitOfWork>,
}

impl CreateAccountHandler {
    pub fn new(service: AccountService, uow: Arc<UnitOfWork>) -> Self {
        Self { service, uow }
    }
}

#[async_trait]
impl RequestHandler<CreateAccount, AccountId> for CreateAccountHandler {
    #[tracing::instrument(skip_all, fields(role = ?event.role))]
    async fn handle(&self, event: &CreateAccount, _cancel: &CancellationToken) -> HandlerResult<AccountId> {
        let account = match self.service.create_account(event) {
            Ok(account) => account,
            Err(e) => {
                tracing::debug!(error = %e, "account rejected");
                return Ok(e.into_outcome());
            }
        };
        // A concurrent call may have committed the same email first.
        if let Err(e) = self.uow.commit() {
            return Ok(e.into_outcome());
        }
        tracing::info!(account_id = %account.id, "account created");
        Ok(Outcome::created(account.id))
    }
}

pub struct GrantSellerRoleHandler {
    service: AccountService,
    uow: Arc<UnitOfWork>,
}

impl GrantSellerRoleHandler {
    pub fn new(service: AccountService, uow: Arc<UnitOfWork>) -> Self {
        Self { service, uow }
    }
}

#[async_trait]
impl EventHandler<SellerRegistered> for GrantSellerRoleHandler {
    async fn handle(&self, event: &SellerRegistered, _cancel: &CancellationToken) -> HandlerResult<()> {
        if let Err(e) = self
            .service
            .grant_role(event.account_id, AccountRole::Seller)
            .and_then(|_| self.uow.commit())
        {
            tracing::warn!(account_id = %event.account_id, error = %e, "seller role not granted");
            return Ok(e.into_outcome());
        }
        tracing::info!(account_id = %event.account_id, seller_id = %event.seller_id, "seller role granted");
        Ok(Outcome::ok())
    }
}
