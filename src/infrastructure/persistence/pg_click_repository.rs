//! PostgreSQL implementation of click storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Click, NewClick};
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct ClickRow {
    id: i64,
    hash: String,
    clicked_at: DateTime<Utc>,
    user_agent: Option<String>,
    referer: Option<String>,
    ip: Option<String>,
}

impl From<ClickRow> for Click {
    fn from(row: ClickRow) -> Self {
        Click {
            id: row.id,
            hash: row.hash,
            clicked_at: row.clicked_at,
            user_agent: row.user_agent,
            referer: row.referer,
            ip: row.ip,
        }
    }
}

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
    async fn record(&self, click: NewClick) -> Result<Click, AppError> {
        let row: ClickRow = sqlx::query_as(
            r#"
            INSERT INTO link_clicks (hash, clicked_at, user_agent, referer, ip)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, hash, clicked_at, user_agent, referer, ip
            "#,
        )
        .bind(click.hash)
        .bind(click.clicked_at)
        .bind(click.user_agent)
        .bind(click.referer)
        .bind(click.ip)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn list_for(&self, hash: &str, limit: i64) -> Result<Vec<Click>, AppError> {
        let rows: Vec<ClickRow> = sqlx::query_as(
            r#"
            SELECT id, hash, clicked_at, user_agent, referer, ip
            FROM link_clicks
            WHERE hash = $1
            ORDER BY clicked_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(hash)
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Click::from).collect())
    }

    async fn count_for(&self, hash: &str) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM link_clicks WHERE hash = $1")
            .bind(hash)
            .fetch_one(self.pool.as_ref())
            .await?;
        Ok(count)
    }

    async fn count_all(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM link_clicks")
            .fetch_one(self.pool.as_ref())
            .await?;
        Ok(count)
    }
}
