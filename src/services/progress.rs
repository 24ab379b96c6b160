// src/services/progress.rs

use chrono::Utc;
use sqlx::{Executor, Sqlite, SqlitePool};
use validator::Validate;

use crate::{
    error::AppError,
    models::progress::{ProgressEvent, ProgressRecord},
};

const PROGRESS_COLUMNS: &str =
    "id, user_id, item_id, item_type, status, score, possible_score, completed_at, updated_at";

/// Per-user, per-item mutable status records.
#[derive(Clone)]
pub struct ProgressLedger {
    pool: SqlitePool,
}

impl ProgressLedger {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates or overwrites the record for `(user_id, item_id, item_type)`.
    pub async fn record(
        &self,
        user_id: i64,
        event: &ProgressEvent,
    ) -> Result<ProgressRecord, AppError> {
        event.validate()?;

        let record = upsert(&self.pool, user_id, event)
            .await
            .map_err(AppError::from_owned_write)?;

        tracing::debug!(
            user_id,
            item_id = %record.item_id,
            item_type = record.item_type.as_str(),
            status = record.status.as_str(),
            "Progress recorded"
        );
        Ok(record)
    }

    /// Every record owned by the user, oldest first.
    pub async fn for_user(&self, user_id: i64) -> Result<Vec<ProgressRecord>, AppError> {
        let records = sqlx::query_as::<_, ProgressRecord>(&format!(
            "SELECT {PROGRESS_COLUMNS} FROM user_progress WHERE user_id = $1 ORDER BY id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}

/// Single-statement upsert keyed on the compound unique constraint.
///
/// Concurrent events for the same triple serialize in storage; the survivor is
/// exactly one of the submitted states. Also runs inside the scoring
/// transaction.
pub(crate) async fn upsert<'e, E>(
    executor: E,
    user_id: i64,
    event: &ProgressEvent,
) -> Result<ProgressRecord, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let now = Utc::now();
    let completed_at = event.status.is_terminal().then_some(now);

    sqlx::query_as::<_, ProgressRecord>(&format!(
        r#"
        INSERT INTO user_progress
            (user_id, item_id, item_type, status, score, possible_score, completed_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (user_id, item_id, item_type) DO UPDATE SET
            status = excluded.status,
            score = excluded.score,
            possible_score = excluded.possible_score,
            completed_at = excluded.completed_at,
            updated_at = excluded.updated_at
        RETURNING {PROGRESS_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(&event.item_id)
    .bind(event.item_type.as_str())
    .bind(event.status.as_str())
    .bind(event.score)
    .bind(event.possible_score)
    .bind(completed_at)
    .bind(now)
    .fetch_one(executor)
    .await
}
