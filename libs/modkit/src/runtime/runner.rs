//! ModKit runtime runner.
//!
//! - We build **one stable ModuleCtx** (`base_ctx`) and reuse it for the
//!   register and init phases; the host hands modules a copy carrying the bus.
//! - Shutdown can be driven by OS signals, an external `CancellationToken`,
//!   or an arbitrary future.

use std::{future::Future, pin::Pin, sync::Arc};

use modkit_bus::BusConfig;
use tokio_util::sync::CancellationToken;

use crate::context::{ConfigProvider, ModuleCtxBuilder};
use crate::host::ModuleHostBuilder;
use crate::runtime::shutdown;

/// How the runtime should decide when to stop.
pub enum ShutdownOptions {
    /// Listen for OS signals (Ctrl+C / SIGTERM).
    Signals,
    /// An external `CancellationToken` controls the lifecycle.
    Token(CancellationToken),
    /// An arbitrary future; when it completes, we initiate shutdown.
    Future(Pin<Box<dyn Future<Output = ()> + Send>>),
}

/// Options for running the ModKit runner.
pub struct RunOptions {
    /// Provider of module config sections (raw JSON by module name).
    pub modules_cfg: Arc<dyn ConfigProvider>,
    /// Integration bus settings.
    pub bus: BusConfig,
    /// Shutdown strategy.
    pub shutdown: ShutdownOptions,
}

/// Full cycle: discover → register → init → wait → stop.
pub async fn run(opts: RunOptions) -> anyhow::Result<()> {
    let cancel = match &opts.shutdown {
        ShutdownOptions::Token(t) => t.clone(),
        _ => CancellationToken::new(),
    };

    // Spawn the shutdown waiter according to the chosen strategy.
    match opts.shutdown {
        ShutdownOptions::Signals => {
            let c = cancel.clone();
            tokio::spawn(async move {
                match shutdown::wait_for_shutdown().await {
                    Ok(()) => {
                        tracing::info!("shutdown: signal received");
                    }
                    Err(e) => {
                        tracing::warn!(
                            error = %e,
                            "shutdown: primary waiter failed; falling back to ctrl_c()"
                        );
                        // Cross-platform fallback.
                        let _ = tokio::signal::ctrl_c().await;
                    }
                }
                c.cancel();
            });
        }
        ShutdownOptions::Future(waiter) => {
            let c = cancel.clone();
            tokio::spawn(async move {
                waiter.await;
                tracing::info!("shutdown: external future completed");
                c.cancel();
            });
        }
        ShutdownOptions::Token(_) => {
            tracing::info!("shutdown: external token will control lifecycle");
        }
    }

    let base_ctx = ModuleCtxBuilder::new(cancel.clone())
        .with_config_provider(opts.modules_cfg.clone())
        .build();

    let host = ModuleHostBuilder::new()
        .discover()
        .build(&base_ctx, &opts.bus)
        .await?;
    tracing::info!(
        modules = ?host.modules(),
        broadcast_mode = ?opts.bus.broadcast_mode,
        "modules running"
    );

    // WAIT
    cancel.cancelled().await;

    tracing::info!("Phase: stop");
    drop(host);
    Ok(())
}
