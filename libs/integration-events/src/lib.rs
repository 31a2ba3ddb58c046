//! Integration event contracts shared between modules.
//!
//! Modules depend on this crate instead of on each other. Each submodule is
//! owned by the context that *handles* (queries) or *announces* (facts) the
//! events it declares.

pub mod catalog;
pub mod identity;
pub mod sellers;
