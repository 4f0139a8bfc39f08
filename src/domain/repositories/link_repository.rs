//! Repository traits for transactional link storage.

use crate::domain::entities::LinkRecord;
use crate::error::AppError;
use async_trait::async_trait;
use uuid::Uuid;

/// Entry point to the durable link store.
///
/// All reads and mutations on the resolution and creation paths run inside a
/// [`LinkTransaction`] obtained from [`LinkRepository::begin`]. The collision
/// check for a short code and the insert that follows it share one
/// transaction.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryStore`] - In-process implementation for tests
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Opens a new transaction.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the store is unreachable.
    async fn begin(&self) -> Result<Box<dyn LinkTransaction>, AppError>;

    /// Cheap connectivity probe used by the health endpoint.
    async fn ping(&self) -> Result<(), AppError>;
}

/// A unit of work against the link store.
///
/// A transaction that is dropped without [`commit`](LinkTransaction::commit)
/// is rolled back, so no partial record ever becomes visible.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkTransaction: Send {
    /// Point lookup of a live (non-deleted) link by short code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_code(&mut self, code: &str) -> Result<Option<LinkRecord>, AppError>;

    /// Inserts a fully prepared record.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if a live record already uses the short code.
    /// Returns [`AppError::Internal`] on database errors.
    async fn insert(&mut self, link: &LinkRecord) -> Result<(), AppError>;

    /// Soft-deletes the link only if both `id` and `owner_id` match.
    ///
    /// Returns `Ok(false)` when nothing matched; a missing link and a link owned
    /// by someone else are not distinguished.
    async fn soft_delete(&mut self, id: Uuid, owner_id: &str) -> Result<bool, AppError>;

    async fn commit(&mut self) -> Result<(), AppError>;

    async fn rollback(&mut self) -> Result<(), AppError>;
}
