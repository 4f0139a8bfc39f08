//! Link creation and deletion service.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::services::with_store_timeout;
use crate::domain::entities::{DEFAULT_LINK_TTL_DAYS, LinkRecord, NewLink};
use crate::domain::repositories::{LinkRepository, LinkTransaction};
use crate::error::AppError;
use crate::utils::code_generator::{CodeGenerator, validate_custom_code};
use crate::utils::url_validator::validate_long_url;

/// Input for [`LinkService::create_link`].
#[derive(Debug, Clone)]
pub struct CreateLink {
    pub owner_id: String,
    pub long_url: String,
    /// Requested short code. `None` or an empty string means "generate one".
    pub custom_code: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Service for creating and deleting short links.
///
/// Every mutation runs in one store transaction that commits only on full
/// success, so no partial record is ever visible.
pub struct LinkService {
    links: Arc<dyn LinkRepository>,
    generator: CodeGenerator,
    default_ttl: chrono::Duration,
    store_timeout: Duration,
}

impl LinkService {
    pub fn new(
        links: Arc<dyn LinkRepository>,
        generator: CodeGenerator,
        default_ttl: chrono::Duration,
        store_timeout: Duration,
    ) -> Self {
        Self {
            links,
            generator,
            default_ttl,
            store_timeout,
        }
    }

    /// Service with the default retry budget, 30-day link lifetime and 2s store timeout.
    pub fn with_defaults(links: Arc<dyn LinkRepository>) -> Self {
        Self::new(
            links,
            CodeGenerator::default(),
            chrono::Duration::days(DEFAULT_LINK_TTL_DAYS),
            Duration::from_secs(2),
        )
    }

    /// Creates a short link.
    ///
    /// # Code Selection
    ///
    /// - A custom code is validated, then checked for a live duplicate inside
    ///   the creating transaction. A taken code is rejected outright.
    /// - Otherwise a random code is drawn by the [`CodeGenerator`] through the
    ///   same transaction, within its retry budget.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for a bad URL, custom code or past expiry.
    /// Returns [`AppError::Conflict`] if the custom code is taken, including by a
    /// concurrent creator that committed first.
    /// Returns [`AppError::Internal`] if the retry budget is exhausted or the
    /// store fails or times out.
    pub async fn create_link(&self, input: CreateLink) -> Result<LinkRecord, AppError> {
        let long_url = validate_long_url(&input.long_url)?;

        let custom_code = input.custom_code.filter(|c| !c.is_empty());
        if let Some(code) = &custom_code {
            validate_custom_code(code)?;
        }

        let now = Utc::now();
        if let Some(expires_at) = input.expires_at
            && expires_at <= now
        {
            return Err(AppError::bad_request(
                "Expiry must be in the future",
                json!({ "field": "expires_at", "expires_at": expires_at }),
            ));
        }

        let is_custom = custom_code.is_some();
        let new_link = NewLink {
            id: None,
            owner_id: input.owner_id,
            long_url,
            short_code: String::new(),
            expires_at: input.expires_at,
        };

        let record = with_store_timeout(
            self.store_timeout,
            "create_link",
            self.create_in_transaction(new_link, custom_code, now),
        )
        .await?;

        metrics::counter!(
            "links_created_total",
            "kind" => if is_custom { "custom" } else { "generated" }
        )
        .increment(1);
        info!(
            id = %record.id,
            code = %record.short_code,
            owner = %record.owner_id,
            expires_at = %record.expires_at,
            "Short link created"
        );

        Ok(record)
    }

    async fn create_in_transaction(
        &self,
        new_link: NewLink,
        custom_code: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<LinkRecord, AppError> {
        let mut tx = self.links.begin().await?;

        match self
            .insert_with_code(tx.as_mut(), new_link, custom_code, now)
            .await
        {
            Ok(record) => {
                tx.commit().await?;
                Ok(record)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed");
                }
                Err(e)
            }
        }
    }

    async fn insert_with_code(
        &self,
        tx: &mut dyn LinkTransaction,
        new_link: NewLink,
        custom_code: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<LinkRecord, AppError> {
        let short_code = match custom_code {
            Some(code) => {
                if tx.find_by_code(&code).await?.is_some() {
                    return Err(AppError::conflict(
                        "Custom short code is already taken",
                        json!({ "code": code }),
                    ));
                }
                code
            }
            None => self.generator.generate(tx).await?,
        };

        let record = NewLink {
            short_code,
            ..new_link
        }
        .into_record(now, self.default_ttl)?;

        tx.insert(&record).await?;
        Ok(record)
    }

    /// Soft-deletes a link owned by `owner_id`.
    ///
    /// Cached snapshots are left in place and expire on their own TTL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] when no live link matches both `id` and
    /// `owner_id`; a missing link and someone else's link look the same.
    pub async fn delete_link(&self, id: Uuid, owner_id: &str) -> Result<(), AppError> {
        let delete = async {
            let mut tx = self.links.begin().await?;

            match tx.soft_delete(id, owner_id).await {
                Ok(true) => tx.commit().await,
                Ok(false) => {
                    tx.rollback().await?;
                    Err(AppError::not_found("Link not found", json!({ "id": id })))
                }
                Err(e) => {
                    if let Err(rollback_err) = tx.rollback().await {
                        warn!(error = %rollback_err, "Rollback failed");
                    }
                    Err(e)
                }
            }
        };

        with_store_timeout(self.store_timeout, "delete_link", delete).await?;

        info!(%id, owner = owner_id, "Short link deleted");
        Ok(())
    }
}
