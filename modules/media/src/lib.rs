//! Media module: caches product media and purges it when a product is deleted.

pub mod config;
pub mod domain;
pub mod handlers;
pub mod module;

pub use config::MediaConfig;
pub use domain::cache::MediaCache;
pub use domain::model::{MediaAsset, NewMediaAsset};
pub use domain::service::MediaService;
pub use module::MediaModule;
