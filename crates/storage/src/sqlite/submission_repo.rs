use chrono::{DateTime, Utc};
use exam_core::model::AttemptId;
use exam_core::scoring::SubmissionRecord;

use super::{
    SqliteRepository,
    mapping::{conn, encode},
};
use crate::repository::{StorageError, SubmissionRepository};

#[async_trait::async_trait]
impl SubmissionRepository for SqliteRepository {
    async fn append(
        &self,
        record: &SubmissionRecord,
        submitted_at: DateTime<Utc>,
    ) -> Result<AttemptId, StorageError> {
        let id = AttemptId::generate();
        let payload = encode(record)?;

        sqlx::query(
            r"
                INSERT INTO submissions (id, submitted_at, score, total_questions, payload)
                VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(id.value().to_string())
        .bind(submitted_at)
        .bind(i64::from(record.score))
        .bind(i64::from(record.total_questions))
        .bind(payload)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(id)
    }
}
