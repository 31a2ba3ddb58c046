use std::sync::Arc;

use async_trait::async_trait;
use arc_swap::ArcSwapOption;
use integration_events::catalog::ProductDeleted;
use modkit::bus::Registrar;
use modkit::{Module, ModuleCtx, Registrator};

use crate::domain::repo::ProductRepository;
use crate::domain::search::SearchIndex;
use crate::domain::service::CatalogService;
use crate::handlers::RemoveFromSearchIndex;

#[derive(Default)]
pub struct CatalogModule {
    products: Arc<ProductRepository>,
    search: Arc<SearchIndex>,
    service: ArcSwapOption<CatalogService>,
}

impl CatalogModule {
    pub const NAME: &'static str = "catalog";

    pub fn new() -> Self {
        Self::default()
    }

    /// Available after init.
    pub fn service(&self) -> anyhow::Result<Arc<CatalogService>> {
        self.service
            .load_full()
            .ok_or_else(|| anyhow::anyhow!("catalog module is not initialized"))
    }

    pub fn search_index(&self) -> &SearchIndex {
        &self.search
    }
}

#[async_trait]
impl Module for CatalogModule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn register(&self, _ctx: &ModuleCtx, registrar: &mut Registrar<'_>) -> anyhow::Result<()> {
        registrar
            .provide_singleton::<SearchIndex>(self.search.clone())
            .on_event::<ProductDeleted, _, _>(|scope| {
                Ok(RemoveFromSearchIndex::new(scope.resolve::<SearchIndex>()?))
            });
        Ok(())
    }

    async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()> {
        let service = CatalogService::new(ctx.bus()?, self.products.clone(), self.search.clone());
        self.service.store(Some(Arc::new(service)));
        tracing::info!("catalog module initialized");
        Ok(())
    }
}

fn registrator() -> Arc<dyn Module> {
    Arc::new(CatalogModule::new())
}

inventory::submit! {
    Registrator(registrator)
}
