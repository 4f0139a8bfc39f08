//! Infrastructure layer for external integrations.
//!
//! Concrete implementations of the storage seams defined by the domain layer.
//!
//! # Modules
//!
//! - [`cache`] - Resolution cache backends (Redis, in-memory, no-op)
//! - [`persistence`] - PostgreSQL and in-memory repository implementations

pub mod cache;
pub mod persistence;
