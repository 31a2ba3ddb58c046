use std::sync::Arc;

use async_trait::async_trait;
use arc_swap::ArcSwap;
use integration_events::catalog::ProductDeleted;
use modkit::bus::Registrar;
use modkit::{Module, ModuleCtx, Registrator};

use crate::config::MediaConfig;
use crate::domain::cache::MediaCache;
use crate::domain::service::MediaService;
use crate::handlers::PurgeProductMedia;

pub struct MediaModule {
    cache: Arc<MediaCache>,
    config: ArcSwap<MediaConfig>,
}

impl Default for MediaModule {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaModule {
    pub const NAME: &'static str = "media";

    pub fn new() -> Self {
        Self {
            cache: Arc::new(MediaCache::new()),
            config: ArcSwap::from_pointee(MediaConfig::default()),
        }
    }

    pub fn service(&self) -> MediaService {
        MediaService::new(self.cache.clone(), self.config.load_full())
    }

    pub fn cache(&self) -> &MediaCache {
        &self.cache
    }
}

#[async_trait]
impl Module for MediaModule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn register(&self, ctx: &ModuleCtx, registrar: &mut Registrar<'_>) -> anyhow::Result<()> {
        let cfg = ctx.module_config::<MediaConfig>();
        let strict = cfg.strict_purge;
        self.config.store(Arc::new(cfg));

        registrar
            .provide_singleton::<MediaCache>(self.cache.clone())
            .on_event::<ProductDeleted, _, _>(move |scope| {
                Ok(PurgeProductMedia::new(scope.resolve::<MediaCache>()?, strict))
            });
        Ok(())
    }

    async fn init(&self, _ctx: &ModuleCtx) -> anyhow::Result<()> {
        let cfg = self.config.load();
        tracing::info!(
            max_assets_per_product = cfg.max_assets_per_product,
            strict_purge = cfg.strict_purge,
            "media module initialized"
        );
        Ok(())
    }
}

fn registrator() -> Arc<dyn Module> {
    Arc::new(MediaModule::new())
}

inventory::submit! {
    Registrator(registrator)
}
