use async_trait::async_trait;
use modkit_bus::Registrar;

use crate::context::ModuleCtx;

/// A bounded-context module.
///
/// Modules never reference each other; they exchange integration events
/// through the bus handed out by the host.
#[async_trait]
pub trait Module: Send + Sync + 'static {
    /// Unique module name, also the key of its configuration section.
    fn name(&self) -> &'static str;

    /// Pure wiring; must be sync. Runs BEFORE the bus is sealed, so
    /// `ctx.bus()` is not available yet.
    fn register(&self, ctx: &ModuleCtx, registrar: &mut Registrar<'_>) -> anyhow::Result<()>;

    /// Runs AFTER every module registered and the bus exists.
    async fn init(&self, _ctx: &ModuleCtx) -> anyhow::Result<()> {
        Ok(())
    }
}
