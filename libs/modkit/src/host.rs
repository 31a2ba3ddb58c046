//! Module host: registration phase, bus sealing, init phase.

use std::collections::HashSet;
use std::sync::Arc;

use modkit_bus::{BusConfig, EventBus, HandlerDescriptor, HandlerRegistry, RegistryError};
use thiserror::Error;

use crate::context::ModuleCtx;
use crate::contracts::Module;

/// The function type submitted via `inventory::submit!`.
pub struct Registrator(pub fn() -> Arc<dyn Module>);

inventory::collect!(Registrator);

/// Collects modules before the bus exists.
#[derive(Default)]
pub struct ModuleHostBuilder {
    modules: Vec<Arc<dyn Module>>,
    errors: Vec<String>,
}

impl ModuleHostBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a module explicitly. Registration runs in insertion order.
    pub fn with_module(mut self, module: Arc<dyn Module>) -> Self {
        self.push(module);
        self
    }

    /// Add every module linked into the binary, sorted by name.
    pub fn discover(mut self) -> Self {
        let mut found: Vec<Arc<dyn Module>> =
            ::inventory::iter::<Registrator>.into_iter().map(|r| r.0()).collect();
        found.sort_by_key(|m| m.name());
        for module in found {
            self.push(module);
        }
        self
    }

    fn push(&mut self, module: Arc<dyn Module>) {
        let name = module.name();
        if self.modules.iter().any(|m| m.name() == name) {
            self.errors
                .push(format!("Module '{name}' is already registered"));
            return;
        }
        self.modules.push(module);
    }

    /// Register every module, seal the bus, then init every module.
    pub async fn build(self, base_ctx: &ModuleCtx, config: &BusConfig) -> Result<ModuleHost, HostError> {
        if !self.errors.is_empty() {
            return Err(HostError::InvalidModules {
                errors: self.errors,
            });
        }

        tracing::info!("Phase: register");
        let mut handlers = HandlerRegistry::builder();
        for m in &self.modules {
            let ctx = base_ctx.clone().for_module(m.name());
            let mut registrar = handlers.registrar(m.name());
            m.register(&ctx, &mut registrar)
                .map_err(|source| HostError::Register {
                    module: m.name(),
                    source,
                })?;
        }
        let registry = handlers.build(config)?;
        let bus = EventBus::new(registry, config.clone());

        tracing::info!("Phase: init");
        let bus_ctx = base_ctx.clone().with_bus(bus.clone());
        for m in &self.modules {
            let ctx = bus_ctx.clone().for_module(m.name());
            m.init(&ctx).await.map_err(|source| HostError::Init {
                module: m.name(),
                source,
            })?;
        }

        tracing::info!(
            modules = ?self.modules.iter().map(|m| m.name()).collect::<Vec<_>>(),
            handlers = bus.registry().catalog().len(),
            "module host ready"
        );
        Ok(ModuleHost {
            modules: self.modules,
            bus,
        })
    }
}

/// Modules plus the bus they were wired into.
pub struct ModuleHost {
    modules: Vec<Arc<dyn Module>>,
    bus: EventBus,
}

impl std::fmt::Debug for ModuleHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&'static str> = self.modules.iter().map(|m| m.name()).collect();
        f.debug_struct("ModuleHost")
            .field("modules", &names)
            .field("bus", &self.bus)
            .finish()
    }
}

impl ModuleHost {
    pub fn builder() -> ModuleHostBuilder {
        ModuleHostBuilder::new()
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Module names in registration order.
    pub fn modules(&self) -> Vec<&'static str> {
        self.modules.iter().map(|m| m.name()).collect()
    }

    pub fn catalog(&self) -> &[HandlerDescriptor] {
        self.bus.registry().catalog()
    }
}

/// Structured errors for the module host.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("invalid module set:\n{errors:#?}")]
    InvalidModules { errors: Vec<String> },

    #[error("registration failed for module '{module}'")]
    Register {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to seal the integration bus")]
    Bus(#[from] RegistryError),

    #[error("initialization failed for module '{module}'")]
    Init {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
}
