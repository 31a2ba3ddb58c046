use std::sync::Arc;

use async_trait::async_trait;
use arc_swap::ArcSwap;
use integration_events::identity::{AccountId, CreateAccount};
use integration_events::sellers::SellerRegistered;
use modkit::bus::Registrar;
use modkit::{Module, ModuleCtx, Registrator};

use crate::config::IdentityConfig;
use crate::domain::repo::AccountRepository;
use crate::domain::service::AccountService;
use crate::handlers::{CreateAccountHandler, GrantSellerRoleHandler};
use crate::infra::memory::InMemoryAccountRepository;
use crate::infra::uow::UnitOfWork;

pub struct IdentityModule {
    accounts: Arc<InMemoryAccountRepository>,
    config: ArcSwap<IdentityConfig>,
}

impl Default for IdentityModule {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityModule {
    pub const NAME: &'static str = "identity";

    pub fn new() -> Self {
        Self {
            accounts: Arc::new(InMemoryAccountRepository::new()),
            config: ArcSwap::from_pointee(IdentityConfig::default()),
        }
    }

    /// Read access to committed accounts.
    pub fn accounts(&self) -> Arc<dyn AccountRepository> {
        self.accounts.clone()
    }

    pub fn config(&self) -> Arc<IdentityConfig> {
        self.config.load_full()
    }
}

#[async_trait]
impl Module for IdentityModule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn register(&self, ctx: &ModuleCtx, registrar: &mut Registrar<'_>) -> anyhow::Result<()> {
        self.config.store(Arc::new(ctx.module_config::<IdentityConfig>()));
        let config = self.config.load_full();
        let grant_config = config.clone();

        registrar
            .provide_singleton::<dyn AccountRepository>(self.accounts.clone())
            .provide_scoped::<UnitOfWork, _>(|scope| {
                let repo = scope.resolve::<dyn AccountRepository>()?;
                Ok(Arc::new(UnitOfWork::new(repo)))
            })
            .on_request::<CreateAccount, AccountId, _, _>(move |scope| {
                let uow = scope.resolve::<UnitOfWork>()?;
                let service = AccountService::new(uow.clone(), config.clone());
                Ok(CreateAccountHandler::new(service, uow))
            })
            .on_event::<SellerRegistered, _, _>(move |scope| {
                let uow = scope.resolve::<UnitOfWork>()?;
                let service = AccountService::new(uow.clone(), grant_config.clone());
                Ok(GrantSellerRoleHandler::new(service, uow))
            });
        Ok(())
    }

    async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()> {
        ctx.bus()?;
        tracing::info!(
            max_display_name_length = self.config.load().max_display_name_length,
            "identity module initialized"
        );
        Ok(())
    }
}

fn registrator() -> Arc<dyn Module> {
    Arc::new(IdentityModule::new())
}

inventory::submit! {
    Registrator(registrator)
}
