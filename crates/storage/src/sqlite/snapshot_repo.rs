use exam_core::model::EphemeralSnapshot;
use sqlx::Row;

use super::{
    SqliteRepository,
    mapping::{conn, decode, encode, ser},
};
use crate::repository::{SnapshotStore, StorageError};

#[async_trait::async_trait]
impl SnapshotStore for SqliteRepository {
    async fn write(&self, key: &str, snapshot: &EphemeralSnapshot) -> Result<(), StorageError> {
        let payload = encode(snapshot)?;

        sqlx::query(
            r"
                INSERT INTO ephemeral_snapshots (slot_key, captured_at, payload)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(slot_key) DO UPDATE SET
                    captured_at = excluded.captured_at,
                    payload = excluded.payload
            ",
        )
        .bind(key)
        .bind(snapshot.captured_at)
        .bind(payload)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn take(&self, key: &str) -> Result<Option<EphemeralSnapshot>, StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;

        let row = sqlx::query("SELECT payload FROM ephemeral_snapshots WHERE slot_key = ?1")
            .bind(key)
            .fetch_optional(&mut *tx)
            .await
            .map_err(conn)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let payload: String = row.try_get("payload").map_err(ser)?;
        let snapshot: EphemeralSnapshot = decode(&payload)?;

        sqlx::query("DELETE FROM ephemeral_snapshots WHERE slot_key = ?1")
            .bind(key)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

        tx.commit().await.map_err(conn)?;
        Ok(Some(snapshot))
    }

    async fn clear(&self, key: &str) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM ephemeral_snapshots WHERE slot_key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        Ok(())
    }
}
