//! Catalog module: products and their search index.

pub mod domain;
pub mod handlers;
pub mod module;

pub use domain::model::{NewProduct, Product};
pub use domain::search::SearchIndex;
pub use domain::service::CatalogService;
pub use module::CatalogModule;
