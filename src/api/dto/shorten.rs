//! DTOs for the link shortening endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::entities::LinkRecord;

/// Request to shorten a URL.
///
/// Field aliases accept the camel-case names older clients send.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// The long URL (absolute, HTTP or HTTPS).
    #[serde(alias = "long")]
    #[validate(length(min = 1, max = 2048, message = "URL is required"))]
    pub url: String,

    /// Optional custom short code (3-20 alphanumeric characters, not reserved).
    #[serde(default, alias = "customShort")]
    pub custom_code: Option<String>,

    /// Optional RFC 3339 expiry. Defaults to 30 days after creation.
    #[serde(default, alias = "expiry")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// A created or listed link.
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub id: Uuid,
    pub short_code: String,
    pub short_url: String,
    pub long_url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl LinkResponse {
    pub fn from_record(record: LinkRecord, base_url: &str) -> Self {
        Self {
            short_url: short_url(base_url, &record.short_code),
            id: record.id,
            short_code: record.short_code,
            long_url: record.long_url,
            created_at: record.created_at,
            expires_at: record.expires_at,
        }
    }
}

/// Joins the public base URL and a short code.
pub fn short_url(base_url: &str, code: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), code)
}
