//! Handler capabilities. A handler type implements exactly one of them per
//! event it reacts to.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::event::IntegrationEvent;
use crate::outcome::Outcome;

/// What a handler returns: `Ok(outcome)` for any business result, `Err(_)` for
/// an unexpected fault (storage down, invariant broken). The bus propagates
/// faults as faults and never folds them into an [`Outcome`].
pub type HandlerResult<T> = anyhow::Result<Outcome<T>>;

/// Broadcast capability: zero or more per event type, no answer value.
#[async_trait]
pub trait EventHandler<E: IntegrationEvent>: Send + Sync {
    async fn handle(&self, event: &E, cancel: &CancellationToken) -> HandlerResult<()>;
}

/// Single-result capability: at most one per `(E, T)` pair.
#[async_trait]
pub trait RequestHandler<E: IntegrationEvent, T: Send + 'static>: Send + Sync {
    async fn handle(&self, event: &E, cancel: &CancellationToken) -> HandlerResult<T>;
}
