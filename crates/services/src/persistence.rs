use chrono::{DateTime, Utc};

use exam_core::model::{
    EphemeralSnapshot, RestoreSource, SavedSession, SavedSessionId,
};
use storage::repository::{SavedSessionListItem, Storage};

use crate::error::PersistenceError;

/// Owns the two persistence mechanisms of a running attempt.
///
/// The ephemeral snapshot slot (keyed by question-set fingerprint) survives
/// incidental remounts and is always best-effort: failures are logged and
/// degraded to "no snapshot available". The durable saved-session record is
/// explicit, create-or-update keyed by the id remembered for this run, and
/// failures there surface to the caller.
pub struct PersistenceGateway {
    storage: Storage,
    saved_id: Option<SavedSessionId>,
}

impl PersistenceGateway {
    #[must_use]
    pub fn new(storage: Storage) -> Self {
        Self {
            storage,
            saved_id: None,
        }
    }

    /// Id of the durable record created for this run, if any.
    #[must_use]
    pub fn saved_session_id(&self) -> Option<SavedSessionId> {
        self.saved_id
    }

    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    // ─── Restore resolution ────────────────────────────────────────────────

    /// Resolve the single restore source for initialization.
    ///
    /// A durable payload supplied by the caller always wins. Otherwise, unless
    /// a fresh start was requested, the ephemeral slot is consumed (read once,
    /// then deleted). A failed or corrupted slot read fails open into a fresh
    /// session.
    pub async fn resolve_restore(
        &self,
        fingerprint: &str,
        durable: Option<SavedSession>,
        fresh_start: bool,
    ) -> RestoreSource {
        if let Some(saved) = durable {
            return RestoreSource::Durable(saved);
        }
        if fresh_start {
            return RestoreSource::Fresh;
        }
        match self.storage.snapshots.take(fingerprint).await {
            Ok(Some(snapshot)) => RestoreSource::Ephemeral(snapshot),
            Ok(None) => RestoreSource::Fresh,
            Err(err) => {
                tracing::warn!("ephemeral snapshot read failed, starting fresh: {err}");
                RestoreSource::Fresh
            }
        }
    }

    // ─── Ephemeral snapshot ────────────────────────────────────────────────

    /// Best-effort write of the tab-survival snapshot. Never fails the caller.
    pub async fn write_snapshot(&self, fingerprint: &str, snapshot: &EphemeralSnapshot) {
        if let Err(err) = self.storage.snapshots.write(fingerprint, snapshot).await {
            tracing::warn!("ephemeral snapshot write failed: {err}");
        }
    }

    /// Best-effort removal of the tab-survival snapshot.
    pub async fn discard_snapshot(&self, fingerprint: &str) {
        if let Err(err) = self.storage.snapshots.clear(fingerprint).await {
            tracing::warn!("ephemeral snapshot clear failed: {err}");
        }
    }

    // ─── Durable save / resume ─────────────────────────────────────────────

    /// Save the full session payload, creating a record on the first save of
    /// this run and updating that same record on every later save.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::Transport` on storage failure; the gateway
    /// state (including the remembered id) is unchanged in that case.
    pub async fn save(
        &mut self,
        name: &str,
        session: &SavedSession,
        now: DateTime<Utc>,
    ) -> Result<SavedSessionId, PersistenceError> {
        match self.saved_id {
            Some(id) => {
                self.storage
                    .saved_sessions
                    .update(id, name, session, now)
                    .await?;
                Ok(id)
            }
            None => {
                let id = self
                    .storage
                    .saved_sessions
                    .create(name, session, now)
                    .await?;
                self.saved_id = Some(id);
                Ok(id)
            }
        }
    }

    /// Fetch a saved session for resuming; the stored record is deleted as
    /// part of the fetch, so a saved attempt resumes exactly once.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::Transport` if the record is missing or the
    /// fetch fails.
    pub async fn resume(&self, id: SavedSessionId) -> Result<SavedSession, PersistenceError> {
        Ok(self.storage.saved_sessions.take(id).await?)
    }

    /// List saved sessions for a resume picker.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::Transport` on storage failure.
    pub async fn list_saved(&self) -> Result<Vec<SavedSessionListItem>, PersistenceError> {
        Ok(self.storage.saved_sessions.list().await?)
    }

    // ─── Attempt teardown ──────────────────────────────────────────────────

    /// Clear all persisted state for this attempt after its submission was
    /// accepted: the ephemeral slot and, if one exists, the durable record.
    /// Both deletions are best-effort; the submission already superseded them.
    pub async fn clear_attempt_state(&mut self, fingerprint: &str) {
        self.discard_snapshot(fingerprint).await;
        if let Some(id) = self.saved_id.take() {
            if let Err(err) = self.storage.saved_sessions.take(id).await {
                tracing::warn!("stale saved session cleanup failed: {err}");
            }
        }
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
