use chrono::{DateTime, Utc};
use exam_core::model::{SavedSession, SavedSessionId, SessionMode};
use sqlx::Row;

use super::{
    SqliteRepository,
    mapping::{conn, decode, encode, ser, uuid_from_text},
};
use crate::repository::{SavedSessionListItem, SavedSessionRepository, StorageError};

fn count_i64(len: usize) -> Result<i64, StorageError> {
    i64::try_from(len).map_err(|_| StorageError::Serialization("question_count overflow".into()))
}

#[async_trait::async_trait]
impl SavedSessionRepository for SqliteRepository {
    async fn create(
        &self,
        name: &str,
        session: &SavedSession,
        saved_at: DateTime<Utc>,
    ) -> Result<SavedSessionId, StorageError> {
        let id = SavedSessionId::generate();
        self.update(id, name, session, saved_at).await?;
        Ok(id)
    }

    async fn update(
        &self,
        id: SavedSessionId,
        name: &str,
        session: &SavedSession,
        saved_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let payload = encode(session)?;
        let mode = encode(&session.config.mode)?;

        sqlx::query(
            r"
                INSERT INTO saved_sessions (id, name, saved_at, question_count, mode, payload)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    saved_at = excluded.saved_at,
                    question_count = excluded.question_count,
                    mode = excluded.mode,
                    payload = excluded.payload
            ",
        )
        .bind(id.value().to_string())
        .bind(name)
        .bind(saved_at)
        .bind(count_i64(session.question_ids.len())?)
        .bind(mode)
        .bind(payload)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn take(&self, id: SavedSessionId) -> Result<SavedSession, StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;

        let row = sqlx::query("SELECT payload FROM saved_sessions WHERE id = ?1")
            .bind(id.value().to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(conn)?
            .ok_or(StorageError::NotFound)?;

        let payload: String = row.try_get("payload").map_err(ser)?;
        let session: SavedSession = decode(&payload)?;

        sqlx::query("DELETE FROM saved_sessions WHERE id = ?1")
            .bind(id.value().to_string())
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

        tx.commit().await.map_err(conn)?;
        Ok(session)
    }

    async fn list(&self) -> Result<Vec<SavedSessionListItem>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, name, saved_at, question_count, mode
                FROM saved_sessions
                ORDER BY saved_at DESC, id DESC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let raw_id: String = row.try_get("id").map_err(ser)?;
            let id = SavedSessionId::from_uuid(uuid_from_text("saved session id", &raw_id)?);
            let name: String = row.try_get("name").map_err(ser)?;
            let saved_at = row.try_get("saved_at").map_err(ser)?;
            let question_count: i64 = row.try_get("question_count").map_err(ser)?;
            let raw_mode: String = row.try_get("mode").map_err(ser)?;
            let mode: SessionMode = decode(&raw_mode)?;

            out.push(SavedSessionListItem {
                id,
                name,
                saved_at,
                question_count: usize::try_from(question_count).map_err(ser)?,
                mode,
            });
        }

        Ok(out)
    }
}
