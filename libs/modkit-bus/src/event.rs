//! Integration event contract.

/// An immutable payload announcing a fact or posing a question across module
/// boundaries. Carries data only.
///
/// The Rust type is the dispatch key; [`IntegrationEvent::NAME`] is the stable,
/// human-readable label that shows up in logs, spans and fault messages.
///
/// Whether an event is a fact or a query is decided by how it is handled:
/// facts get [`EventHandler`](crate::handler::EventHandler)s and are
/// broadcast, queries get exactly one
/// [`RequestHandler`](crate::handler::RequestHandler) per answer type.
pub trait IntegrationEvent: Send + Sync + 'static {
    const NAME: &'static str;
}
