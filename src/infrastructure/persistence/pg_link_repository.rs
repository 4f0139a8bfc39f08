//! PostgreSQL implementation of the transactional link store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::LinkRecord;
use crate::domain::repositories::{LinkRepository, LinkTransaction};
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct LinkRow {
    id: Uuid,
    owner_id: String,
    long_url: String,
    short_code: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl From<LinkRow> for LinkRecord {
    fn from(r: LinkRow) -> Self {
        LinkRecord {
            id: r.id,
            owner_id: r.owner_id,
            long_url: r.long_url,
            short_code: r.short_code,
            created_at: r.created_at,
            expires_at: r.expires_at,
            deleted_at: r.deleted_at,
        }
    }
}

/// PostgreSQL repository for link storage.
///
/// Short code uniqueness among live rows is enforced by a partial unique
/// index, so a racing insert that slipped past the in-transaction check
/// fails with [`AppError::Conflict`].
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn begin(&self) -> Result<Box<dyn LinkTransaction>, AppError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgLinkTransaction { tx: Some(tx) }))
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }
}

/// An open PostgreSQL transaction.
///
/// Dropping it without committing rolls back (sqlx issues the ROLLBACK when the
/// connection returns to the pool).
pub struct PgLinkTransaction {
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgLinkTransaction {
    fn conn(&mut self) -> Result<&mut PgConnection, AppError> {
        self.tx
            .as_deref_mut()
            .ok_or_else(|| AppError::internal("Transaction already finished", json!({})))
    }
}

#[async_trait]
impl LinkTransaction for PgLinkTransaction {
    async fn find_by_code(&mut self, code: &str) -> Result<Option<LinkRecord>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, owner_id, long_url, short_code, created_at, expires_at, deleted_at
            FROM links
            WHERE short_code = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(code)
        .fetch_optional(self.conn()?)
        .await?;

        Ok(row.map(LinkRecord::from))
    }

    async fn insert(&mut self, link: &LinkRecord) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO links (id, owner_id, long_url, short_code, created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(link.id)
        .bind(&link.owner_id)
        .bind(&link.long_url)
        .bind(&link.short_code)
        .bind(link.created_at)
        .bind(link.expires_at)
        .execute(self.conn()?)
        .await?;

        Ok(())
    }

    async fn soft_delete(&mut self, id: Uuid, owner_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE links
            SET deleted_at = NOW()
            WHERE id = $1 AND owner_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .execute(self.conn()?)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn commit(&mut self) -> Result<(), AppError> {
        match self.tx.take() {
            Some(tx) => Ok(tx.commit().await?),
            None => Err(AppError::internal("Transaction already finished", json!({}))),
        }
    }

    async fn rollback(&mut self) -> Result<(), AppError> {
        if let Some(tx) = self.tx.take() {
            tx.rollback().await?;
        }
        Ok(())
    }
}
