//! Repository trait definitions for the domain layer.
//!
//! These traits are the seams between business logic and storage. Concrete
//! implementations live in `crate::infrastructure::persistence`; services hold
//! them as `Arc<dyn Trait>` so tests can substitute in-process or mocked
//! implementations.
//!
//! # Available Repositories
//!
//! - [`LinkRepository`] / [`LinkTransaction`] - Transactional link storage
//! - [`ClickRepository`] - Click recording and aggregation
//! - [`TokenRepository`] - API token authentication

pub mod click_repository;
pub mod link_repository;
pub mod token_repository;

pub use click_repository::{ClickRepository, LinkStats, StatsFilter};
pub use link_repository::{LinkRepository, LinkTransaction};
pub use token_repository::{ApiToken, TokenRepository};

#[cfg(test)]
pub use click_repository::MockClickRepository;
#[cfg(test)]
pub use link_repository::{MockLinkRepository, MockLinkTransaction};
#[cfg(test)]
pub use token_repository::MockTokenRepository;
