//! Repository implementations.
//!
//! PostgreSQL repositories use SQLx runtime queries mapped through `FromRow`
//! row structs. [`MemoryStore`] implements the link and click repositories in
//! process memory for the test harness.
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] - Transactional link storage
//! - [`PgClickRepository`] - Click recording and aggregation
//! - [`PgTokenRepository`] - API token storage and validation
//! - [`MemoryStore`] - In-process link and click storage

pub mod memory;
pub mod pg_click_repository;
pub mod pg_link_repository;
pub mod pg_token_repository;

pub use memory::MemoryStore;
pub use pg_click_repository::PgClickRepository;
pub use pg_link_repository::PgLinkRepository;
pub use pg_token_repository::PgTokenRepository;
