//! PostgreSQL implementation of token repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::repositories::{ApiToken, TokenRepository};
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct TokenRow {
    id: i64,
    name: String,
    owner_id: String,
    token_hash: String,
    created_at: DateTime<Utc>,
    last_used_at: Option<DateTime<Utc>>,
    revoked_at: Option<DateTime<Utc>>,
}

impl From<TokenRow> for ApiToken {
    fn from(r: TokenRow) -> Self {
        ApiToken {
            id: r.id,
            name: r.name,
            owner_id: r.owner_id,
            token_hash: r.token_hash,
            created_at: r.created_at,
            last_used_at: r.last_used_at,
            revoked_at: r.revoked_at,
        }
    }
}

const TOKEN_COLUMNS: &str =
    "id, name, owner_id, token_hash, created_at, last_used_at, revoked_at";

/// PostgreSQL repository for API token storage and validation.
///
/// Stores HMAC hashes of tokens. Raw tokens are never persisted.
pub struct PgTokenRepository {
    pool: Arc<PgPool>,
}

impl PgTokenRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    async fn find_one(
        &self,
        filter: &str,
        bind: TokenKey<'_>,
    ) -> Result<Option<ApiToken>, AppError> {
        let sql = format!("SELECT {TOKEN_COLUMNS} FROM api_tokens WHERE {filter}");
        let query = sqlx::query_as::<_, TokenRow>(&sql);
        let query = match bind {
            TokenKey::Id(id) => query.bind(id),
            TokenKey::Text(value) => query.bind(value),
        };

        let row = query.fetch_optional(self.pool.as_ref()).await?;
        Ok(row.map(ApiToken::from))
    }
}

enum TokenKey<'a> {
    Id(i64),
    Text(&'a str),
}

#[async_trait]
impl TokenRepository for PgTokenRepository {
    async fn find_active(&self, token_hash: &str) -> Result<Option<ApiToken>, AppError> {
        self.find_one(
            "token_hash = $1 AND revoked_at IS NULL",
            TokenKey::Text(token_hash),
        )
        .await
    }

    async fn update_last_used(&self, token_hash: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE api_tokens
            SET last_used_at = NOW()
            WHERE token_hash = $1
              AND revoked_at IS NULL
            "#,
        )
        .bind(token_hash)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn create_token(
        &self,
        name: &str,
        owner_id: &str,
        token_hash: &str,
    ) -> Result<ApiToken, AppError> {
        let sql = format!(
            "INSERT INTO api_tokens (name, owner_id, token_hash) VALUES ($1, $2, $3) RETURNING {TOKEN_COLUMNS}"
        );
        let row = sqlx::query_as::<_, TokenRow>(&sql)
            .bind(name)
            .bind(owner_id)
            .bind(token_hash)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(row.into())
    }

    async fn list_tokens(&self) -> Result<Vec<ApiToken>, AppError> {
        let sql = format!("SELECT {TOKEN_COLUMNS} FROM api_tokens ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, TokenRow>(&sql)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(ApiToken::from).collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ApiToken>, AppError> {
        self.find_one("id = $1", TokenKey::Id(id)).await
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<ApiToken>, AppError> {
        self.find_one("name = $1", TokenKey::Text(name)).await
    }

    async fn revoke_token(&self, id: i64) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE api_tokens
            SET revoked_at = NOW()
            WHERE id = $1 AND revoked_at IS NULL
            "#,
        )
        .bind(id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }
}
