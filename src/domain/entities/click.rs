//! Click entity representing a single redirect event.

use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::error::AppError;

/// A persisted access event for a short link.
///
/// Append-only: never updated, never read on the resolution path.
#[derive(Debug, Clone)]
pub struct Click {
    pub id: i64,
    pub link_id: Uuid,
    pub clicked_at: DateTime<Utc>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

/// Input data for recording a click.
#[derive(Debug, Clone)]
pub struct NewClick {
    pub link_id: Uuid,
    pub clicked_at: DateTime<Utc>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

impl NewClick {
    /// Rejects clicks that do not reference a link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] when `link_id` is the nil UUID.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.link_id.is_nil() {
            return Err(AppError::bad_request(
                "link_id is required",
                json!({ "field": "link_id" }),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_click_requires_link_id() {
        let click = NewClick {
            link_id: Uuid::nil(),
            clicked_at: Utc::now(),
            ip: Some("10.0.0.1".to_string()),
            user_agent: None,
            referer: None,
        };
        assert!(matches!(click.validate(), Err(AppError::Validation { .. })));
    }

    #[test]
    fn test_new_click_valid() {
        let click = NewClick {
            link_id: Uuid::new_v4(),
            clicked_at: Utc::now(),
            ip: None,
            user_agent: Some("Chrome/120".to_string()),
            referer: None,
        };
        assert!(click.validate().is_ok());
    }
}
