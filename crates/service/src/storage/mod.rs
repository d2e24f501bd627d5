//! Storage abstractions for service layer
//!
//! Contains the generic file-backed record store and the trait the HTTP
//! layer depends on.

pub mod record_store;
pub mod repository;
