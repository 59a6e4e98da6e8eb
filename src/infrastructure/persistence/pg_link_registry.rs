//! PostgreSQL implementation of the link registry.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewShortLink, QrStatus, Reachability, ShortLink};
use crate::domain::repositories::LinkRegistry;
use crate::error::AppError;

const LINK_COLUMNS: &str = "hash, target, created_at, redirect_limit, reachability, qr_status";

#[derive(sqlx::FromRow)]
struct LinkRow {
    hash: String,
    target: String,
    created_at: DateTime<Utc>,
    redirect_limit: i64,
    reachability: String,
    qr_status: String,
}

impl TryFrom<LinkRow> for ShortLink {
    type Error = AppError;

    fn try_from(row: LinkRow) -> Result<Self, Self::Error> {
        let corrupt = |reason: String| {
            AppError::internal(
                "Corrupt link record",
                json!({ "hash": row.hash, "reason": reason }),
            )
        };

        let redirect_limit =
            u32::try_from(row.redirect_limit).map_err(|e| corrupt(e.to_string()))?;
        let reachability = row
            .reachability
            .parse::<Reachability>()
            .map_err(|e| corrupt(e.to_string()))?;
        let qr = row
            .qr_status
            .parse::<QrStatus>()
            .map_err(|e| corrupt(e.to_string()))?;

        Ok(ShortLink {
            hash: row.hash,
            target: row.target,
            created_at: row.created_at,
            redirect_limit,
            reachability,
            qr,
        })
    }
}

/// PostgreSQL registry for short links and their verification state.
///
/// Status updates are single conditional `UPDATE`s, so concurrent workers
/// cannot interleave a read and a write.
pub struct PgLinkRegistry {
    pool: Arc<PgPool>,
}

impl PgLinkRegistry {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Distinguishes a no-op update from an unknown hash.
    async fn ensure_exists(&self, hash: &str) -> Result<(), AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM short_links WHERE hash = $1)")
                .bind(hash)
                .fetch_one(self.pool.as_ref())
                .await?;

        if exists {
            Ok(())
        } else {
            Err(AppError::link_not_found(hash))
        }
    }

    async fn compare_and_write(
        &self,
        column: &'static str,
        hash: &str,
        next: &str,
        predecessors: Vec<String>,
    ) -> Result<bool, AppError> {
        let sql = format!(
            "UPDATE short_links SET {column} = $2 WHERE hash = $1 AND {column} = ANY($3)"
        );
        let result = sqlx::query(&sql)
            .bind(hash)
            .bind(next)
            .bind(predecessors)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }
        self.ensure_exists(hash).await?;
        Ok(false)
    }
}

#[async_trait]
impl LinkRegistry for PgLinkRegistry {
    async fn create(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
        let qr = if new_link.want_qr {
            QrStatus::Pending
        } else {
            QrStatus::NotRequested
        };

        let sql = format!(
            "INSERT INTO short_links (hash, target, redirect_limit, reachability, qr_status) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {LINK_COLUMNS}"
        );
        let row: LinkRow = sqlx::query_as(&sql)
            .bind(&new_link.hash)
            .bind(&new_link.target)
            .bind(i64::from(new_link.redirect_limit))
            .bind(Reachability::Pending.as_str())
            .bind(qr.as_str())
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(|e| match e.as_database_error() {
                Some(db) if db.is_unique_violation() => AppError::hash_taken(&new_link.hash),
                _ => AppError::from(e),
            })?;

        row.try_into()
    }

    async fn get(&self, hash: &str) -> Result<Option<ShortLink>, AppError> {
        let sql = format!("SELECT {LINK_COLUMNS} FROM short_links WHERE hash = $1");
        let row: Option<LinkRow> = sqlx::query_as(&sql)
            .bind(hash)
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.map(ShortLink::try_from).transpose()
    }

    async fn set_reachability(
        &self,
        hash: &str,
        verdict: Reachability,
    ) -> Result<bool, AppError> {
        let predecessors = Reachability::predecessors(verdict)
            .iter()
            .map(|s| s.as_str().to_string())
            .collect();
        self.compare_and_write("reachability", hash, verdict.as_str(), predecessors)
            .await
    }

    async fn set_qr_status(&self, hash: &str, status: QrStatus) -> Result<bool, AppError> {
        let predecessors = QrStatus::predecessors(status)
            .iter()
            .map(|s| s.as_str().to_string())
            .collect();
        self.compare_and_write("qr_status", hash, status.as_str(), predecessors)
            .await
    }

    async fn list_stale(
        &self,
        created_before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<ShortLink>, AppError> {
        let sql = format!(
            "SELECT {LINK_COLUMNS} FROM short_links \
             WHERE created_at < $1 AND (reachability = 'pending' OR qr_status = 'pending') \
             ORDER BY created_at, hash \
             LIMIT $2"
        );
        let rows: Vec<LinkRow> = sqlx::query_as(&sql)
            .bind(created_before)
            .bind(limit)
            .fetch_all(self.pool.as_ref())
            .await?;

        rows.into_iter().map(ShortLink::try_from).collect()
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .is_ok()
    }
}
