pub mod cache;
pub mod error;
pub mod model;
pub mod service;
