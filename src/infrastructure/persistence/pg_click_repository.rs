//! PostgreSQL implementation of click recording and aggregation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{Click, NewClick};
use crate::domain::repositories::{ClickRepository, LinkStats, StatsFilter};
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct ClickRow {
    id: i64,
    link_id: Uuid,
    clicked_at: DateTime<Utc>,
    ip: Option<String>,
    user_agent: Option<String>,
    referer: Option<String>,
}

#[derive(sqlx::FromRow)]
struct LinkStatsRow {
    link_id: Uuid,
    short_code: String,
    long_url: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    clicks: i64,
}

/// PostgreSQL repository for click events.
pub struct PgClickRepository {
    pool: Arc<PgPool>,
}

impl PgClickRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClickRepository for PgClickRepository {
    async fn record_click(&self, new_click: NewClick) -> Result<Click, AppError> {
        new_click.validate()?;

        let mut tx = self.pool.begin().await?;

        // A link_id without a matching link fails the foreign key and maps to Validation.
        let row = sqlx::query_as::<_, ClickRow>(
            r#"
            INSERT INTO link_clicks (link_id, clicked_at, ip, user_agent, referer)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, link_id, clicked_at, ip, user_agent, referer
            "#,
        )
        .bind(new_click.link_id)
        .bind(new_click.clicked_at)
        .bind(&new_click.ip)
        .bind(&new_click.user_agent)
        .bind(&new_click.referer)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Click {
            id: row.id,
            link_id: row.link_id,
            clicked_at: row.clicked_at,
            ip: row.ip,
            user_agent: row.user_agent,
            referer: row.referer,
        })
    }

    async fn count_clicks(&self, link_id: Uuid) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM link_clicks WHERE link_id = $1",
        )
        .bind(link_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(total)
    }

    async fn count_clicks_for_owner(
        &self,
        link_id: Uuid,
        owner_id: &str,
    ) -> Result<Option<i64>, AppError> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(c.id)
            FROM links l
            LEFT JOIN link_clicks c ON c.link_id = l.id
            WHERE l.id = $1 AND l.owner_id = $2 AND l.deleted_at IS NULL
            GROUP BY l.id
            "#,
        )
        .bind(link_id)
        .bind(owner_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(total)
    }

    async fn owner_link_stats(
        &self,
        owner_id: &str,
        filter: StatsFilter,
    ) -> Result<Vec<LinkStats>, AppError> {
        let rows = sqlx::query_as::<_, LinkStatsRow>(
            r#"
            SELECT
                l.id AS link_id,
                l.short_code,
                l.long_url,
                l.created_at,
                l.expires_at,
                COUNT(c.id) AS clicks
            FROM links l
            LEFT JOIN link_clicks c ON c.link_id = l.id
            WHERE l.owner_id = $1 AND l.deleted_at IS NULL
            GROUP BY l.id
            ORDER BY l.created_at DESC, l.id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(owner_id)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| LinkStats {
                link_id: r.link_id,
                short_code: r.short_code,
                long_url: r.long_url,
                created_at: r.created_at,
                expires_at: r.expires_at,
                clicks: r.clicks,
            })
            .collect())
    }

    async fn count_owner_links(&self, owner_id: &str) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM links WHERE owner_id = $1 AND deleted_at IS NULL",
        )
        .bind(owner_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(total)
    }
}
