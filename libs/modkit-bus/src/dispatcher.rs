//! Dispatch protocols: sequential broadcast, parallel broadcast, single result.

use std::future::Future;
use std::time::{Duration, Instant};

use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::config::BusConfig;
use crate::error::BusError;
use crate::event::IntegrationEvent;
use crate::handler::{EventHandler, RequestHandler};
use crate::outcome::{Outcome, VoidOutcome};
use crate::registry::Resolved;

pub(crate) struct Dispatcher {
    slow_threshold: Option<Duration>,
}

impl Dispatcher {
    pub(crate) fn new(config: &BusConfig) -> Self {
        Self {
            slow_threshold: config.slow_handler_threshold_ms.map(Duration::from_millis),
        }
    }

    /// Registration order, one handler at a time. Stops at the first failing
    /// outcome (returned as is), the first fault, or when `cancel` fires
    /// between two handlers.
    pub(crate) async fn broadcast_sequential<E: IntegrationEvent>(
        &self,
        event: &E,
        handlers: &[Resolved<dyn EventHandler<E>>],
        cancel: &CancellationToken,
    ) -> Result<VoidOutcome, BusError> {
        let total = handlers.len();
        for (completed, h) in handlers.iter().enumerate() {
            if cancel.is_cancelled() {
                debug!(completed, total, "broadcast cancelled; remaining handlers skipped");
                return Err(BusError::Cancelled {
                    event: E::NAME,
                    completed,
                    total,
                });
            }

            let outcome = self
                .timed(h.name, h.handler.handle(event, cancel))
                .await
                .map_err(|source| fault::<E>(h.name, source))?;

            if outcome.is_failure() {
                debug!(
                    handler = h.name,
                    status = ?outcome.status_kind(),
                    skipped = total - completed - 1,
                    "broadcast stopped at first failure"
                );
                return Ok(outcome);
            }
        }
        Ok(Outcome::ok())
    }

    /// All handlers polled concurrently; returns only after every one has
    /// finished. Faults win over failures; among either, the earliest
    /// registered handler wins.
    pub(crate) async fn broadcast_parallel<E: IntegrationEvent>(
        &self,
        event: &E,
        handlers: &[Resolved<dyn EventHandler<E>>],
        cancel: &CancellationToken,
    ) -> Result<VoidOutcome, BusError> {
        let results = join_all(
            handlers
                .iter()
                .map(|h| self.timed(h.name, h.handler.handle(event, cancel))),
        )
        .await;

        let mut first_fault: Option<BusError> = None;
        let mut first_failure: Option<VoidOutcome> = None;
        let mut failed = 0usize;

        for (h, result) in handlers.iter().zip(results) {
            match result {
                Err(source) => {
                    let err = fault::<E>(h.name, source);
                    if first_fault.is_none() {
                        first_fault = Some(err);
                    }
                }
                Ok(outcome) if outcome.is_failure() => {
                    failed += 1;
                    if first_failure.is_none() {
                        first_failure = Some(outcome);
                    }
                }
                Ok(_) => {}
            }
        }

        if let Some(err) = first_fault {
            return Err(err);
        }
        if failed > 0 {
            debug!(failed, total = handlers.len(), "parallel broadcast completed with failures");
        }
        Ok(first_failure.unwrap_or_else(Outcome::ok))
    }

    /// Exactly one invocation; the outcome is returned verbatim.
    pub(crate) async fn request<E: IntegrationEvent, T: Send + 'static>(
        &self,
        event: &E,
        handler: &Resolved<dyn RequestHandler<E, T>>,
        cancel: &CancellationToken,
    ) -> Result<Outcome<T>, BusError> {
        self.timed(handler.name, handler.handler.handle(event, cancel))
            .await
            .map_err(|source| fault::<E>(handler.name, source))
    }

    async fn timed<F: Future>(&self, handler: &'static str, fut: F) -> F::Output {
        let started = Instant::now();
        let out = fut.await;
        let elapsed = started.elapsed();
        match self.slow_threshold {
            Some(limit) if elapsed > limit => warn!(
                handler,
                elapsed_ms = elapsed.as_millis() as u64,
                threshold_ms = limit.as_millis() as u64,
                "slow integration event handler"
            ),
            _ => debug!(handler, elapsed_us = elapsed.as_micros() as u64, "handler finished"),
        }
        out
    }
}

fn fault<E: IntegrationEvent>(handler: &'static str, source: anyhow::Error) -> BusError {
    error!(event = E::NAME, handler, error = %format!("{source:#}"), "integration event handler faulted");
    BusError::Handler {
        event: E::NAME,
        handler,
        source,
    }
}
