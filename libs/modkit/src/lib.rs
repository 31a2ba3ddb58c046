//! # ModKit - module system around the integration bus
//!
//! Modules are plain structs implementing [`Module`]. The [`ModuleHost`] runs
//! two ordered phases:
//!
//! - **register**: every module wires its handlers and services into the bus
//!   through a [`Registrar`](modkit_bus::Registrar) tagged with its name;
//! - **init**: the bus is sealed and every module gets a context carrying it.
//!
//! Modules linked into the binary are discovered with `inventory`:
//!
//! ```rust,ignore
//! modkit::inventory::submit! {
//!     modkit::Registrator(|| std::sync::Arc::new(CatalogModule::default()))
//! }
//! ```

pub use anyhow::Result;
pub use async_trait::async_trait;

// Re-export inventory for user convenience
pub use inventory;

// Re-export the bus so modules only need one dependency for wiring
pub use modkit_bus as bus;

pub mod context;
pub use context::{ConfigProvider, ModuleCtx, ModuleCtxBuilder};

pub mod contracts;
pub use contracts::Module;

pub mod host;
pub use host::{HostError, ModuleHost, ModuleHostBuilder, Registrator};

pub mod runtime;
pub use runtime::{run, RunOptions, ShutdownOptions};
