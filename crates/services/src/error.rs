//! Shared error types for the services crate.

use thiserror::Error;

use exam_core::model::QuestionSetError;
use exam_core::scoring::ScoringError;
use exam_core::store::StoreError;
use storage::repository::StorageError;

/// Errors emitted by `PersistenceGateway`.
///
/// Only durable-save and resume failures surface here; ephemeral snapshot
/// failures are logged and degraded to "no snapshot" inside the gateway.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PersistenceError {
    #[error(transparent)]
    Transport(#[from] StorageError),
    #[error(transparent)]
    QuestionSet(#[from] QuestionSetError),
}

/// Errors emitted by `SubmissionEngine`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SubmissionError {
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error(transparent)]
    Transport(#[from] StorageError),
}

/// Errors emitted by the session controller.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    QuestionSet(#[from] QuestionSetError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
}
