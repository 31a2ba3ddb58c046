//! # ModKit Bus - in-process integration event bus
//!
//! Lets modules announce facts and ask questions of each other without
//! compile-time references, while keeping explicit success/failure outcomes.
//!
//! - **Broadcast**: zero or more [`EventHandler`]s per event, run sequentially
//!   (fail-fast) or in parallel (all complete, first failure wins).
//! - **Request**: exactly one [`RequestHandler`] per `(event, answer)` pair;
//!   its [`Outcome`] is returned unchanged.
//! - Every publish call gets a fresh [`Scope`] that owns the handler instances
//!   and their scoped services, and is dropped before the call returns.
//!
//! ## Example
//!
//! ```rust,ignore
//! use modkit_bus::{BusConfig, EventBus, HandlerRegistry, Outcome};
//!
//! let mut builder = HandlerRegistry::builder();
//! builder
//!     .registrar("identity")
//!     .on_request::<CreateAccount, AccountId, _, _>(|scope| {
//!         Ok(CreateAccountHandler::new(scope.resolve::<dyn AccountStore>()?))
//!     });
//! let bus = EventBus::new(builder.build(&BusConfig::default())?, BusConfig::default());
//!
//! let answer = bus.publish_for_answer::<_, AccountId>(create, &cancel).await?;
//! ```

pub use async_trait::async_trait;
pub use tokio_util::sync::CancellationToken;

pub mod bus;
pub mod config;
mod dispatcher;
pub mod error;
pub mod event;
pub mod handler;
pub mod outcome;
pub mod registry;
pub mod scope;
pub mod services;
mod type_key;

pub use bus::EventBus;
pub use config::{BroadcastMode, BusConfig};
pub use error::{BusError, ConfigurationFault, RegistryError};
pub use event::IntegrationEvent;
pub use handler::{EventHandler, HandlerResult, RequestHandler};
pub use outcome::{Failure, FailureKind, Outcome, StatusKind, SuccessKind, VoidOutcome};
pub use registry::{Capability, HandlerDescriptor, HandlerRegistry, HandlerRegistryBuilder, Registrar};
pub use scope::Scope;
pub use services::{Lifetime, ServiceCollection, ServiceError};
