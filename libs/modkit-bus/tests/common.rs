#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use modkit_bus::{
    async_trait, BusConfig, CancellationToken, EventBus, EventHandler, HandlerRegistry,
    HandlerRegistryBuilder, HandlerResult, IntegrationEvent, Outcome, VoidOutcome,
};

/// Shared, ordered record of handler activity.
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

#[derive(Debug, Clone)]
pub struct ProductDeleted {
    pub product_id: u64,
}

impl IntegrationEvent for ProductDeleted {
    const NAME: &'static str = "catalog.product_deleted";
}

/// Broadcast handler that records `<name>:start` / `<name>:end`, optionally
/// sleeps in between, and returns a canned outcome.
pub struct Scripted {
    pub name: &'static str,
    pub log: CallLog,
    pub delay: Duration,
    pub outcome: VoidOutcome,
}

impl Scripted {
    pub fn ok(name: &'static str, log: &CallLog) -> Self {
        Self {
            name,
            log: log.clone(),
            delay: Duration::ZERO,
            outcome: Outcome::ok(),
        }
    }

    pub fn failing(name: &'static str, log: &CallLog, outcome: VoidOutcome) -> Self {
        Self {
            outcome,
            ..Self::ok(name, log)
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl EventHandler<ProductDeleted> for Scripted {
    async fn handle(&self, _event: &ProductDeleted, _cancel: &CancellationToken) -> HandlerResult<()> {
        self.log.lock().unwrap().push(format!("{}:start", self.name));
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.log.lock().unwrap().push(format!("{}:end", self.name));
        Ok(self.outcome.clone())
    }
}

/// Broadcast handler that raises an unexpected fault.
pub struct Faulty {
    pub name: &'static str,
    pub log: CallLog,
}

#[async_trait]
impl EventHandler<ProductDeleted> for Faulty {
    async fn handle(&self, _event: &ProductDeleted, _cancel: &CancellationToken) -> HandlerResult<()> {
        self.log.lock().unwrap().push(format!("{}:start", self.name));
        Err(anyhow::anyhow!("search index unreachable"))
    }
}

pub fn bus_with(config: BusConfig, wire: impl FnOnce(&mut HandlerRegistryBuilder)) -> EventBus {
    let mut builder = HandlerRegistry::builder();
    wire(&mut builder);
    let registry = builder.build(&config).expect("registry should build");
    EventBus::new(registry, config)
}
