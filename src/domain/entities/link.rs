//! Link entity representing a short code → long URL mapping.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::error::AppError;

/// Default lifetime of a link when the creator does not supply an expiry.
pub const DEFAULT_LINK_TTL_DAYS: i64 = 30;

/// A durable short link record.
///
/// `short_code` is unique among live (non-deleted) records; `long_url` and
/// `short_code` are never empty once the record exists.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkRecord {
    pub id: Uuid,
    pub owner_id: String,
    pub long_url: String,
    pub short_code: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl LinkRecord {
    /// Returns true if the link has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Returns true if `now` is strictly past the expiry timestamp.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Input data for creating a new link.
///
/// `id` and `expires_at` are optional; [`NewLink::into_record`] fills them in.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub id: Option<Uuid>,
    pub owner_id: String,
    pub long_url: String,
    pub short_code: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl NewLink {
    /// Validates required fields and materializes the record to insert.
    ///
    /// Assigns a fresh id when absent and `now + default_ttl` when no expiry was
    /// given.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `long_url` or `short_code` is empty.
    pub fn into_record(
        self,
        now: DateTime<Utc>,
        default_ttl: Duration,
    ) -> Result<LinkRecord, AppError> {
        if self.long_url.trim().is_empty() {
            return Err(AppError::bad_request(
                "long_url is required",
                json!({ "field": "long_url" }),
            ));
        }
        if self.short_code.is_empty() {
            return Err(AppError::bad_request(
                "short_code is required",
                json!({ "field": "short_code" }),
            ));
        }

        Ok(LinkRecord {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            owner_id: self.owner_id,
            long_url: self.long_url,
            short_code: self.short_code,
            created_at: now,
            expires_at: self.expires_at.unwrap_or(now + default_ttl),
            deleted_at: None,
        })
    }
}

/// Point-in-time projection of a [`LinkRecord`] stored in the resolution cache.
///
/// Carries exactly what a redirect needs. It is a copy, not a live reference,
/// and may go stale relative to the store until its cache TTL lapses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedLink {
    pub id: Uuid,
    pub long_url: String,
    pub short_code: String,
    pub expires_at: DateTime<Utc>,
}

impl CachedLink {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Serializes the entry into the cache payload format.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Parses a cache payload. Corrupted payloads surface as an error.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

impl From<&LinkRecord> for CachedLink {
    fn from(record: &LinkRecord) -> Self {
        Self {
            id: record.id,
            long_url: record.long_url.clone(),
            short_code: record.short_code.clone(),
            expires_at: record.expires_at,
        }
    }
}
