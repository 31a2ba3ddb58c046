//! Sellers module: onboarding of sellers.
//!
//! Registration asks identity for an account over the bus and announces
//! [`SellerRegistered`](integration_events::sellers::SellerRegistered) once
//! the seller is stored.

pub mod config;
pub mod domain;
pub mod module;

pub use domain::model::{NewSeller, Seller};
pub use domain::service::SellerService;
pub use module::SellersModule;
