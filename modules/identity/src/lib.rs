//! Identity module: owns accounts and their roles.
//!
//! Answers [`CreateAccount`](integration_events::identity::CreateAccount)
//! requests and reacts to
//! [`SellerRegistered`](integration_events::sellers::SellerRegistered) by
//! granting the seller role.

pub mod config;
pub mod domain;
pub mod handlers;
pub mod infra;
pub mod module;

pub use module::IdentityModule;
