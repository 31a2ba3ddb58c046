use std::sync::Arc;

use async_trait::async_trait;
use arc_swap::ArcSwapOption;
use modkit::bus::Registrar;
use modkit::{Module, ModuleCtx, Registrator};

use crate::config::SellersConfig;
use crate::domain::repo::SellerRepository;
use crate::domain::service::SellerService;

/// Publishes only; registers no handlers.
#[derive(Default)]
pub struct SellersModule {
    sellers: Arc<SellerRepository>,
    service: ArcSwapOption<SellerService>,
}

impl SellersModule {
    pub const NAME: &'static str = "sellers";

    pub fn new() -> Self {
        Self::default()
    }

    /// Available after init.
    pub fn service(&self) -> anyhow::Result<Arc<SellerService>> {
        self.service
            .load_full()
            .ok_or_else(|| anyhow::anyhow!("sellers module is not initialized"))
    }

    pub fn sellers(&self) -> &SellerRepository {
        &self.sellers
    }
}

#[async_trait]
impl Module for SellersModule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn register(&self, _ctx: &ModuleCtx, _registrar: &mut Registrar<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()> {
        let cfg: SellersConfig = ctx.module_config();
        let bus = ctx.bus()?;
        let mode = cfg.announce_mode.unwrap_or(bus.config().broadcast_mode);
        self.service.store(Some(Arc::new(SellerService::new(
            bus,
            self.sellers.clone(),
            mode,
        ))));
        tracing::info!(announce_mode = ?mode, "sellers module initialized");
        Ok(())
    }
}

fn registrator() -> Arc<dyn Module> {
    Arc::new(SellersModule::new())
}

inventory::submit! {
    Registrator(registrator)
}
