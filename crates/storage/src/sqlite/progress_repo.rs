use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;

use exam_core::model::QuestionId;

use crate::codec;
use crate::repository::{ANSWERS_KEY, ProgressRepository, SavedProgress, StorageError, TIME_KEY};

use super::SqliteRepository;

impl SqliteRepository {
    async fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO session_progress (key, value, saved_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                saved_at = excluded.saved_at
            ",
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let row = sqlx::query("SELECT value FROM session_progress WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };
        row.try_get("value")
            .map(Some)
            .map_err(|err| StorageError::Serialization(err.to_string()))
    }
}

#[async_trait]
impl ProgressRepository for SqliteRepository {
    async fn save_answers(&self, answers: &[(QuestionId, usize)]) -> Result<(), StorageError> {
        let payload = codec::encode_answers(answers)?;
        self.put(ANSWERS_KEY, &payload).await
    }

    async fn save_time(&self, remaining_secs: u32) -> Result<(), StorageError> {
        self.put(TIME_KEY, &codec::encode_time(remaining_secs)).await
    }

    async fn load(&self) -> Result<Option<SavedProgress>, StorageError> {
        let answers = self
            .get(ANSWERS_KEY)
            .await?
            .and_then(|raw| codec::decode_answers(&raw));
        let remaining = self
            .get(TIME_KEY)
            .await?
            .and_then(|raw| codec::decode_time(&raw));

        // A half-written or corrupted pair counts as nothing saved.
        match (answers, remaining) {
            (Some(answers), Some(remaining_secs)) => Ok(Some(SavedProgress {
                answers,
                remaining_secs,
            })),
            _ => Ok(None),
        }
    }

    async fn clear(&self) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM session_progress WHERE key IN (?1, ?2)")
            .bind(ANSWERS_KEY)
            .bind(TIME_KEY)
            .execute(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }
}
