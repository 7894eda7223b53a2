use async_trait::async_trait;

use exam_core::model::QuestionId;
use storage::repository::StorageError;

/// External bookmarking service boundary.
///
/// Bookmark scheduling (spaced repetition, review queues) lives outside the
/// engine; the session only raises flag changes into it. The controller
/// applies the flag optimistically and rolls back if this call fails.
#[async_trait]
pub trait BookmarkSink: Send + Sync {
    /// Record the bookmark flag for a question.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the remote service rejects the change.
    async fn set_bookmarked(
        &self,
        question_id: QuestionId,
        bookmarked: bool,
    ) -> Result<(), StorageError>;
}
