pub mod error;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;
