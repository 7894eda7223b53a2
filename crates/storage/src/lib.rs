#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    InMemorySessionStore, SavedSessionListItem, SavedSessionRepository, SnapshotStore, Storage,
    StorageError, SubmissionRepository,
};
pub use sqlite::{SqliteInitError, SqliteRepository};
