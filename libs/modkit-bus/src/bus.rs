//! Bus facade: the only entry point publishing modules use.

use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, Instrument};

use crate::config::{BroadcastMode, BusConfig};
use crate::dispatcher::Dispatcher;
use crate::error::BusError;
use crate::event::IntegrationEvent;
use crate::outcome::{Outcome, VoidOutcome};
use crate::registry::HandlerRegistry;

/// Cheap-to-clone handle around the sealed registry.
///
/// Each publish call opens its own [`Scope`](crate::scope::Scope), resolves
/// handlers inside it, dispatches, and drops the scope before returning,
/// whatever the result. Outcomes are returned exactly as handlers (or the
/// broadcast aggregation rule) produced them.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

struct BusInner {
    registry: HandlerRegistry,
    dispatcher: Dispatcher,
    config: BusConfig,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("registry", &self.inner.registry)
            .field("config", &self.inner.config)
            .finish()
    }
}

impl EventBus {
    pub fn new(registry: HandlerRegistry, config: BusConfig) -> Self {
        let dispatcher = Dispatcher::new(&config);
        Self {
            inner: Arc::new(BusInner {
                registry,
                dispatcher,
                config,
            }),
        }
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.inner.registry
    }

    pub fn config(&self) -> &BusConfig {
        &self.inner.config
    }

    /// Announce a fact using the configured default [`BroadcastMode`].
    pub async fn publish_broadcast<E: IntegrationEvent>(
        &self,
        event: E,
        cancel: &CancellationToken,
    ) -> Result<VoidOutcome, BusError> {
        self.publish_broadcast_with(event, self.inner.config.broadcast_mode, cancel)
            .await
    }

    /// Announce a fact with an explicit mode. Zero handlers is a success.
    pub async fn publish_broadcast_with<E: IntegrationEvent>(
        &self,
        event: E,
        mode: BroadcastMode,
        cancel: &CancellationToken,
    ) -> Result<VoidOutcome, BusError> {
        let inner = &self.inner;
        let scope = inner.registry.open_scope::<E>(cancel);
        let span = tracing::debug_span!(
            "bus.publish",
            event = E::NAME,
            ?mode,
            scope_id = %scope.id()
        );

        let result = async {
            let handlers = inner.registry.resolve_broadcast::<E>(&scope)?;
            debug!(handlers = handlers.len(), "dispatching broadcast");
            let outcome = match mode {
                BroadcastMode::Sequential => {
                    inner
                        .dispatcher
                        .broadcast_sequential(&event, &handlers, cancel)
                        .await?
                }
                BroadcastMode::Parallel => {
                    inner
                        .dispatcher
                        .broadcast_parallel(&event, &handlers, cancel)
                        .await?
                }
            };
            debug!(status = ?outcome.status_kind(), "broadcast finished");
            Ok::<_, BusError>(outcome)
        }
        .instrument(span)
        .await;

        drop(scope);
        result
    }

    /// Ask exactly one other module a question and get its typed answer.
    ///
    /// Zero or several registered handlers for `(E, T)` is a configuration
    /// fault, raised before any handler runs.
    pub async fn publish_for_answer<E, T>(
        &self,
        event: E,
        cancel: &CancellationToken,
    ) -> Result<Outcome<T>, BusError>
    where
        E: IntegrationEvent,
        T: Send + 'static,
    {
        let inner = &self.inner;
        let scope = inner.registry.open_scope::<E>(cancel);
        let span = tracing::debug_span!(
            "bus.request",
            event = E::NAME,
            answer = std::any::type_name::<T>(),
            scope_id = %scope.id()
        );

        let result = async {
            let handler = match inner.registry.resolve_request::<E, T>(&scope) {
                Ok(handler) => handler,
                Err(err) => {
                    if let Some(fault) = err.as_configuration_fault() {
                        error!(%fault, "integration bus configuration fault");
                    }
                    return Err(err);
                }
            };
            let outcome = inner.dispatcher.request(&event, &handler, cancel).await?;
            debug!(handler = handler.name, status = ?outcome.status_kind(), "request answered");
            Ok::<_, BusError>(outcome)
        }
        .instrument(span)
        .await;

        drop(scope);
        result
    }
}
