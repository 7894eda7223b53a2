use async_trait::async_trait;
use chrono::{DateTime, Utc};
use exam_core::model::{
    AttemptId, EphemeralSnapshot, SavedSession, SavedSessionId, SessionMode,
};
use exam_core::scoring::SubmissionRecord;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// One row of the resume picker: enough to describe a saved session without
/// deserializing its full payload.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedSessionListItem {
    pub id: SavedSessionId,
    pub name: String,
    pub saved_at: DateTime<Utc>,
    pub question_count: usize,
    pub mode: SessionMode,
}

//
// ─── REPOSITORY CONTRACTS ──────────────────────────────────────────────────────
//

/// Durable save-and-resume store for full session payloads.
///
/// A record is owned exclusively by the attempt that created it until it is
/// resumed; `take` deletes on read so a saved attempt can never be resumed
/// twice into divergent sessions.
#[async_trait]
pub trait SavedSessionRepository: Send + Sync {
    /// Create a new record and return its opaque id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn create(
        &self,
        name: &str,
        session: &SavedSession,
        saved_at: DateTime<Utc>,
    ) -> Result<SavedSessionId, StorageError>;

    /// Update the record with the given id. Upsert semantics keyed by id:
    /// storing the same payload twice yields the same stored state.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn update(
        &self,
        id: SavedSessionId,
        name: &str,
        session: &SavedSession,
        saved_at: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    /// Fetch a record and delete it in the same operation (one-shot resume).
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn take(&self, id: SavedSessionId) -> Result<SavedSession, StorageError>;

    /// List saved sessions, most recently saved first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn list(&self) -> Result<Vec<SavedSessionListItem>, StorageError>;
}

/// Ephemeral, single-use snapshot slots keyed by question-set fingerprint.
///
/// Callers degrade failures here to "no snapshot available"; nothing in this
/// store may block session initialization.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Write (or overwrite) the slot for the given key.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the slot cannot be written.
    async fn write(&self, key: &str, snapshot: &EphemeralSnapshot) -> Result<(), StorageError>;

    /// Read the slot and delete it; `None` when the slot is empty.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on read/delete failures.
    async fn take(&self, key: &str) -> Result<Option<EphemeralSnapshot>, StorageError>;

    /// Delete the slot without reading it.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on delete failures.
    async fn clear(&self, key: &str) -> Result<(), StorageError>;
}

/// Write-once sink for accepted submission attempts.
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    /// Store the record and return the attempt id used to reach the results
    /// view.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn append(
        &self,
        record: &SubmissionRecord,
        submitted_at: DateTime<Utc>,
    ) -> Result<AttemptId, StorageError>;
}

//
// ─── IN-MEMORY IMPLEMENTATION ──────────────────────────────────────────────────
//

#[derive(Debug, Clone)]
struct StoredSession {
    name: String,
    saved_at: DateTime<Utc>,
    session: SavedSession,
}

/// Simple in-memory implementation of all three contracts for testing and
/// prototyping.
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    saved: Arc<Mutex<HashMap<SavedSessionId, StoredSession>>>,
    snapshots: Arc<Mutex<HashMap<String, EphemeralSnapshot>>>,
    submissions: Arc<Mutex<Vec<(AttemptId, DateTime<Utc>, SubmissionRecord)>>>,
}

impl InMemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Submitted records in insertion order, for assertions in tests.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn submitted(&self) -> Vec<SubmissionRecord> {
        self.submissions
            .lock()
            .expect("submissions lock poisoned")
            .iter()
            .map(|(_, _, record)| record.clone())
            .collect()
    }
}

#[async_trait]
impl SavedSessionRepository for InMemorySessionStore {
    async fn create(
        &self,
        name: &str,
        session: &SavedSession,
        saved_at: DateTime<Utc>,
    ) -> Result<SavedSessionId, StorageError> {
        let id = SavedSessionId::generate();
        let mut guard = self
            .saved
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(
            id,
            StoredSession {
                name: name.to_owned(),
                saved_at,
                session: session.clone(),
            },
        );
        Ok(id)
    }

    async fn update(
        &self,
        id: SavedSessionId,
        name: &str,
        session: &SavedSession,
        saved_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .saved
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(
            id,
            StoredSession {
                name: name.to_owned(),
                saved_at,
                session: session.clone(),
            },
        );
        Ok(())
    }

    async fn take(&self, id: SavedSessionId) -> Result<SavedSession, StorageError> {
        let mut guard = self
            .saved
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard
            .remove(&id)
            .map(|stored| stored.session)
            .ok_or(StorageError::NotFound)
    }

    async fn list(&self) -> Result<Vec<SavedSessionListItem>, StorageError> {
        let guard = self
            .saved
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut items: Vec<SavedSessionListItem> = guard
            .iter()
            .map(|(id, stored)| SavedSessionListItem {
                id: *id,
                name: stored.name.clone(),
                saved_at: stored.saved_at,
                question_count: stored.session.question_ids.len(),
                mode: stored.session.config.mode,
            })
            .collect();
        items.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        Ok(items)
    }
}

#[async_trait]
impl SnapshotStore for InMemorySessionStore {
    async fn write(&self, key: &str, snapshot: &EphemeralSnapshot) -> Result<(), StorageError> {
        let mut guard = self
            .snapshots
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), snapshot.clone());
        Ok(())
    }

    async fn take(&self, key: &str) -> Result<Option<EphemeralSnapshot>, StorageError> {
        let mut guard = self
            .snapshots
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.remove(key))
    }

    async fn clear(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self
            .snapshots
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }
}

#[async_trait]
impl SubmissionRepository for InMemorySessionStore {
    async fn append(
        &self,
        record: &SubmissionRecord,
        submitted_at: DateTime<Utc>,
    ) -> Result<AttemptId, StorageError> {
        let id = AttemptId::generate();
        let mut guard = self
            .submissions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.push((id, submitted_at, record.clone()));
        Ok(id)
    }
}

//
// ─── STORAGE AGGREGATE ─────────────────────────────────────────────────────────
//

/// Aggregates the three repositories behind trait objects for easy backend
/// swapping.
#[derive(Clone)]
pub struct Storage {
    pub saved_sessions: Arc<dyn SavedSessionRepository>,
    pub snapshots: Arc<dyn SnapshotStore>,
    pub submissions: Arc<dyn SubmissionRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let store = InMemorySessionStore::new();
        Self::from_in_memory(store)
    }

    /// Build a `Storage` sharing the given in-memory store, keeping a handle
    /// to it for test assertions.
    #[must_use]
    pub fn from_in_memory(store: InMemorySessionStore) -> Self {
        let saved_sessions: Arc<dyn SavedSessionRepository> = Arc::new(store.clone());
        let snapshots: Arc<dyn SnapshotStore> = Arc::new(store.clone());
        let submissions: Arc<dyn SubmissionRepository> = Arc::new(store);
        Self {
            saved_sessions,
            snapshots,
            submissions,
        }
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::{
        Difficulty, Question, QuestionId, QuestionSet, SessionConfig, SessionEntry, TimerSnapshot,
    };
    use exam_core::time::fixed_now;

    fn build_saved(n: usize) -> SavedSession {
        let questions = (0..n)
            .map(|i| Question {
                id: QuestionId::new(format!("q{i}")),
                text: format!("Q{i}"),
                options: [("a".to_string(), "A".to_string())].into_iter().collect(),
                correct_option: "a".to_string(),
                difficulty: Difficulty::Easy,
                marks: None,
            })
            .collect();
        let set = QuestionSet::new(questions).unwrap();
        let entries = vec![SessionEntry::fresh(); n];
        SavedSession::capture(
            &set,
            &entries,
            0,
            TimerSnapshot::zero(),
            SessionConfig::practice(),
        )
    }

    #[tokio::test]
    async fn take_is_one_shot() {
        let store = InMemorySessionStore::new();
        let saved = build_saved(2);
        let id = store.create("Evening set", &saved, fixed_now()).await.unwrap();

        let fetched = SavedSessionRepository::take(&store, id).await.unwrap();
        assert_eq!(fetched, saved);

        let err = SavedSessionRepository::take(&store, id).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }

    #[tokio::test]
    async fn update_is_idempotent() {
        let store = InMemorySessionStore::new();
        let saved = build_saved(2);
        let id = store.create("First", &saved, fixed_now()).await.unwrap();

        store.update(id, "First", &saved, fixed_now()).await.unwrap();
        store.update(id, "First", &saved, fixed_now()).await.unwrap();

        let items = store.list().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(SavedSessionRepository::take(&store, id).await.unwrap(), saved);
    }

    #[tokio::test]
    async fn snapshot_slot_is_single_use() {
        let store = InMemorySessionStore::new();
        let snapshot = EphemeralSnapshot {
            current_index: 1,
            entries: vec![SessionEntry::fresh(); 3],
            captured_at: fixed_now(),
            config: SessionConfig::practice(),
        };

        store.write("slot-a", &snapshot).await.unwrap();
        assert_eq!(
            SnapshotStore::take(&store, "slot-a").await.unwrap(),
            Some(snapshot)
        );
        assert_eq!(SnapshotStore::take(&store, "slot-a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn snapshot_slots_do_not_collide() {
        let store = InMemorySessionStore::new();
        let snapshot = EphemeralSnapshot {
            current_index: 0,
            entries: vec![SessionEntry::fresh()],
            captured_at: fixed_now(),
            config: SessionConfig::practice(),
        };

        store.write("set-a", &snapshot).await.unwrap();
        assert_eq!(SnapshotStore::take(&store, "set-b").await.unwrap(), None);
        assert!(SnapshotStore::take(&store, "set-a").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn list_orders_by_most_recent_save() {
        let store = InMemorySessionStore::new();
        let saved = build_saved(1);
        let earlier = fixed_now();
        let later = earlier + chrono::Duration::hours(1);

        store.create("old", &saved, earlier).await.unwrap();
        store.create("new", &saved, later).await.unwrap();

        let items = store.list().await.unwrap();
        assert_eq!(items[0].name, "new");
        assert_eq!(items[1].name, "old");
    }
}
