use std::sync::Arc;

use exam_core::model::{
    EphemeralSnapshot, Question, QuestionSet, RestoreSource, SavedSession, SavedSessionId,
    SessionConfig,
};
use exam_core::scoring::evaluate;
use exam_core::store::{Advance, SessionStateStore};
use exam_core::time::Clock;
use exam_core::timer::TimerEngine;
use storage::repository::Storage;

use crate::bookmarks::BookmarkSink;
use crate::error::{PersistenceError, SessionError};
use crate::persistence::PersistenceGateway;
use crate::session::intent::SessionIntent;
use crate::session::view::{ExitDialogView, SessionView};
use crate::submission::SubmissionEngine;
use crate::transaction::with_rollback;

/// State of the open save-and-exit dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ExitDialog {
    /// Whether opening the dialog is what paused the timer. Cancelling only
    /// resumes in that case; an explicit user pause stays paused.
    auto_paused: bool,
    error: Option<String>,
}

//
// ─── SESSION CONTROLLER ────────────────────────────────────────────────────────
//

/// Composition root of a running practice session.
///
/// Owns the state store, the timer engine, the persistence gateway and the
/// submission engine; all mutation flows through `dispatch`, one intent at a
/// time, so no interleaving of partial updates is observable.
pub struct SessionController {
    clock: Clock,
    config: SessionConfig,
    store: SessionStateStore,
    timer: TimerEngine,
    gateway: PersistenceGateway,
    submission: SubmissionEngine,
    exit_dialog: Option<ExitDialog>,
    bookmarks: Option<Arc<dyn BookmarkSink>>,
    /// Fingerprint of the question set; keys the ephemeral snapshot slot.
    slot_key: String,
}

impl SessionController {
    /// Start a session over the given questions, restoring from the ephemeral
    /// snapshot slot when one exists (unless `fresh_start`).
    ///
    /// An ephemeral restore rehydrates answers, statuses and the cursor; the
    /// timers always start from zero, since the snapshot carries no timer
    /// state.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the question set is invalid or a restored
    /// snapshot does not fit it.
    pub async fn start(
        questions: Vec<Question>,
        config: SessionConfig,
        storage: Storage,
        clock: Clock,
        fresh_start: bool,
    ) -> Result<Self, SessionError> {
        let question_set = QuestionSet::new(questions)?;
        let slot_key = question_set.fingerprint();
        let gateway = PersistenceGateway::new(storage.clone());

        let restore = gateway.resolve_restore(&slot_key, None, fresh_start).await;
        let store = SessionStateStore::new(question_set, restore)?;
        let timer = TimerEngine::start(config.mode, store.current_index(), clock.now());

        Ok(Self {
            clock,
            config,
            store,
            timer,
            gateway,
            submission: SubmissionEngine::new(storage.submissions),
            exit_dialog: None,
            bookmarks: None,
            slot_key,
        })
    }

    /// Resume a saved session by id; the stored record is consumed.
    ///
    /// Timers continue from the saved elapsed values.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the record is missing or its payload no
    /// longer forms a valid question set.
    pub async fn resume(
        storage: Storage,
        clock: Clock,
        id: SavedSessionId,
    ) -> Result<Self, SessionError> {
        let gateway = PersistenceGateway::new(storage.clone());
        let saved = gateway.resume(id).await?;

        let question_set = QuestionSet::new(saved.questions.clone())?;
        let slot_key = question_set.fingerprint();
        let config = saved.config.clone();
        let timer_snapshot = saved.timer.clone();
        let current_index = saved.current_index;

        let store = SessionStateStore::new(question_set, RestoreSource::Durable(saved))?;
        let timer = TimerEngine::restore(timer_snapshot, config.mode, current_index, clock.now());

        Ok(Self {
            clock,
            config,
            store,
            timer,
            gateway,
            submission: SubmissionEngine::new(storage.submissions),
            exit_dialog: None,
            bookmarks: None,
            slot_key,
        })
    }

    /// Attach the external bookmark service. Without one, bookmark toggles
    /// are local only.
    pub fn with_bookmark_sink(mut self, sink: Arc<dyn BookmarkSink>) -> Self {
        self.bookmarks = Some(sink);
        self
    }

    // ─── Accessors ─────────────────────────────────────────────────────────

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn saved_session_id(&self) -> Option<SavedSessionId> {
        self.gateway.saved_session_id()
    }

    /// Mutable clock handle, for driving fixed clocks in tests and tools.
    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    /// Read model for the presentation layer. Takes `&mut self` because the
    /// countdown display consumes its first-frame rounding latch.
    pub fn view(&mut self) -> SessionView {
        let now = self.clock.now();
        let index = self.store.current_index();
        SessionView {
            current_index: index,
            question: self.store.question_set().questions()[index].clone(),
            entry: self.store.entries()[index].clone(),
            palette: self.store.entries().iter().map(|e| e.status).collect(),
            timer: self.timer.display(now),
            is_paused: self.timer.is_paused(),
            submit_phase: self.submission.phase().clone(),
            exit_dialog: self.exit_dialog.as_ref().map(|d| ExitDialogView {
                error: d.error.clone(),
            }),
            counts: self.store.status_counts(),
        }
    }

    // ─── Dispatch ──────────────────────────────────────────────────────────

    /// Apply one intent. The single mutation entry point.
    ///
    /// Once a submission has completed the session is read-only and every
    /// intent is ignored.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` on precondition violations (bad navigation
    /// index) and on failures the user cannot resolve from a dialog.
    pub async fn dispatch(&mut self, intent: SessionIntent) -> Result<(), SessionError> {
        if self.submission.phase().is_completed() {
            return Ok(());
        }
        let now = self.clock.now();

        match intent {
            SessionIntent::SelectAnswer { option } => {
                self.store
                    .set_answer(self.store.current_index(), Some(option))?;
                self.snapshot_state().await;
            }
            SessionIntent::ClearAnswer => {
                self.store.clear_answer(self.store.current_index())?;
                self.snapshot_state().await;
            }
            SessionIntent::SaveAndNext => {
                let advance = self.store.commit_save_and_advance(self.store.current_index())?;
                if let Advance::Moved(next) = advance {
                    self.timer.switch_active_question(next, now);
                }
                self.snapshot_state().await;
            }
            SessionIntent::MarkAndNext => {
                let advance = self.store.commit_mark_and_advance(self.store.current_index())?;
                if let Advance::Moved(next) = advance {
                    self.timer.switch_active_question(next, now);
                }
                self.snapshot_state().await;
            }
            SessionIntent::Navigate { index } => {
                self.store.navigate_direct(index)?;
                self.timer.switch_active_question(index, now);
                self.snapshot_state().await;
            }
            SessionIntent::ToggleBookmark => {
                self.toggle_bookmark().await?;
                self.snapshot_state().await;
            }
            SessionIntent::Pause => self.timer.pause(now),
            SessionIntent::Resume => {
                // The exit dialog owns the pause while it is open.
                if self.exit_dialog.is_none() {
                    self.timer.resume(now);
                }
            }
            SessionIntent::OpenExitDialog => {
                if self.exit_dialog.is_none() {
                    let auto_paused = !self.timer.is_paused();
                    self.timer.pause(now);
                    self.exit_dialog = Some(ExitDialog {
                        auto_paused,
                        error: None,
                    });
                }
            }
            SessionIntent::CancelExit => {
                if let Some(dialog) = self.exit_dialog.take() {
                    if dialog.auto_paused {
                        self.timer.resume(now);
                    }
                }
            }
            SessionIntent::SaveAndExit { name } => self.save_and_exit(&name).await,
            SessionIntent::RequestSubmit => {
                self.submission.request_manual();
            }
            SessionIntent::ConfirmSubmit => self.perform_submit(false).await?,
            SessionIntent::CancelSubmit => self.submission.cancel(),
            SessionIntent::Tick => {
                if self.timer.poll_time_up(now) {
                    self.perform_submit(true).await?;
                }
            }
        }
        Ok(())
    }

    // ─── Intent handlers ───────────────────────────────────────────────────

    async fn toggle_bookmark(&mut self) -> Result<(), SessionError> {
        let index = self.store.current_index();
        let desired = !self.store.entry(index)?.is_bookmarked;

        let Some(sink) = self.bookmarks.clone() else {
            self.store.set_bookmarked(index, desired)?;
            return Ok(());
        };

        let question_id = self.store.question_set().questions()[index].id.clone();
        with_rollback(
            &mut self.store,
            // Index checked above; the entry exists.
            |store| {
                let _ = store.set_bookmarked(index, desired);
            },
            sink.set_bookmarked(question_id, desired),
        )
        .await
        .map_err(PersistenceError::from)?;
        Ok(())
    }

    /// Pause first, snapshot second: elapsed time must be frozen before it is
    /// captured, or the persisted value drifts from what the user saw.
    async fn save_and_exit(&mut self, name: &str) {
        let now = self.clock.now();
        // A save without an open dialog pauses here; remember that so a
        // later cancel can undo it.
        let pause_is_ours = self.exit_dialog.is_none() && !self.timer.is_paused();
        self.timer.pause(now);

        let saved = SavedSession::capture(
            self.store.question_set(),
            self.store.entries(),
            self.store.current_index(),
            self.timer.snapshot(now),
            self.config.clone(),
        );

        match self.gateway.save(name, &saved, now).await {
            Ok(_) => {
                // The durable record supersedes the crash-recovery slot.
                self.gateway.discard_snapshot(&self.slot_key).await;
                self.exit_dialog = None;
            }
            Err(err) => {
                if let Some(dialog) = self.exit_dialog.as_mut() {
                    dialog.error = Some(err.to_string());
                } else {
                    self.exit_dialog = Some(ExitDialog {
                        auto_paused: pause_is_ours,
                        error: Some(err.to_string()),
                    });
                }
            }
        }
    }

    /// Score the session and append the attempt. Single-flight: whichever of
    /// the manual confirm and the time-up auto path claims the slot first
    /// runs; the other becomes a no-op.
    async fn perform_submit(&mut self, auto: bool) -> Result<(), SessionError> {
        if !self.submission.try_begin(auto) {
            return Ok(());
        }
        let now = self.clock.now();
        self.timer.pause(now);

        let record = match evaluate(
            self.store.question_set(),
            self.store.entries(),
            &self.timer.question_time_map(now),
            self.timer.total_session_time_ms(now),
            &self.config,
        ) {
            Ok(record) => record,
            Err(err) => {
                self.submission.fail(err.to_string());
                return Err(SessionError::Submission(err.into()));
            }
        };

        match self.submission.persist(&record, now).await {
            Ok(attempt_id) => {
                self.submission.complete(attempt_id);
                self.gateway.clear_attempt_state(&self.slot_key).await;
            }
            Err(err) => {
                tracing::error!("submission failed: {err}");
                self.submission.fail(err.to_string());
                // A manual attempt hands control back with clocks running;
                // after time-up there is no session left to run.
                if !auto {
                    self.timer.resume(self.clock.now());
                }
            }
        }
        Ok(())
    }

    /// Best-effort ephemeral snapshot after a state mutation.
    async fn snapshot_state(&self) {
        let snapshot = EphemeralSnapshot {
            current_index: self.store.current_index(),
            entries: self.store.entries().to_vec(),
            captured_at: self.clock.now(),
            config: self.config.clone(),
        };
        self.gateway.write_snapshot(&self.slot_key, &snapshot).await;
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bookmarks::test_support::RecordingBookmarkSink;
    use crate::submission::SubmitPhase;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, Utc};
    use exam_core::model::{AttemptId, Difficulty, QuestionId, QuestionStatus};
    use exam_core::scoring::SubmissionRecord;
    use exam_core::time::fixed_clock;
    use std::sync::Mutex;
    use storage::repository::{
        InMemorySessionStore, SavedSessionListItem, SavedSessionRepository, StorageError,
        SubmissionRepository,
    };

    fn question(id: &str) -> Question {
        let options = [("a", "A"), ("b", "B"), ("c", "C")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Question {
            id: QuestionId::new(id),
            text: format!("text {id}"),
            options,
            correct_option: "a".to_string(),
            difficulty: Difficulty::Easy,
            marks: None,
        }
    }

    fn questions(n: usize) -> Vec<Question> {
        (0..n).map(|i| question(&format!("q{i}"))).collect()
    }

    async fn fresh_controller(
        n: usize,
        config: SessionConfig,
        store: &InMemorySessionStore,
    ) -> SessionController {
        SessionController::start(
            questions(n),
            config,
            Storage::from_in_memory(store.clone()),
            fixed_clock(),
            true,
        )
        .await
        .unwrap()
    }

    /// Saved-session repository whose writes always fail.
    struct FailingSavedSessions;

    #[async_trait]
    impl SavedSessionRepository for FailingSavedSessions {
        async fn create(
            &self,
            _name: &str,
            _session: &SavedSession,
            _saved_at: DateTime<Utc>,
        ) -> Result<SavedSessionId, StorageError> {
            Err(StorageError::Connection("save endpoint down".into()))
        }

        async fn update(
            &self,
            _id: SavedSessionId,
            _name: &str,
            _session: &SavedSession,
            _saved_at: DateTime<Utc>,
        ) -> Result<(), StorageError> {
            Err(StorageError::Connection("save endpoint down".into()))
        }

        async fn take(&self, _id: SavedSessionId) -> Result<SavedSession, StorageError> {
            Err(StorageError::NotFound)
        }

        async fn list(&self) -> Result<Vec<SavedSessionListItem>, StorageError> {
            Ok(Vec::new())
        }
    }

    /// Submission repository that fails on demand, delegating otherwise.
    struct FlakySubmissions {
        inner: InMemorySessionStore,
        fail: Mutex<bool>,
    }

    #[async_trait]
    impl SubmissionRepository for FlakySubmissions {
        async fn append(
            &self,
            record: &SubmissionRecord,
            submitted_at: DateTime<Utc>,
        ) -> Result<AttemptId, StorageError> {
            if *self.fail.lock().unwrap() {
                return Err(StorageError::Connection("submission endpoint down".into()));
            }
            self.inner.append(record, submitted_at).await
        }
    }

    #[tokio::test]
    async fn answer_save_and_submit_full_flow() {
        let backing = InMemorySessionStore::new();
        let mut controller = fresh_controller(2, SessionConfig::practice(), &backing).await;

        controller
            .dispatch(SessionIntent::SelectAnswer { option: "a".into() })
            .await
            .unwrap();
        controller.dispatch(SessionIntent::SaveAndNext).await.unwrap();
        controller
            .dispatch(SessionIntent::SelectAnswer { option: "b".into() })
            .await
            .unwrap();
        controller.dispatch(SessionIntent::SaveAndNext).await.unwrap();

        controller.dispatch(SessionIntent::RequestSubmit).await.unwrap();
        assert_eq!(controller.view().submit_phase, SubmitPhase::Confirming);
        controller.dispatch(SessionIntent::ConfirmSubmit).await.unwrap();

        let view = controller.view();
        assert!(view.submit_phase.is_completed());
        assert!(view.is_paused);

        let submitted = backing.submitted();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].score, 50);
        assert_eq!(submitted[0].correct_count, 1);
        assert_eq!(submitted[0].incorrect_count, 1);
    }

    #[tokio::test]
    async fn completed_session_ignores_further_intents() {
        let backing = InMemorySessionStore::new();
        let mut controller = fresh_controller(2, SessionConfig::practice(), &backing).await;

        controller.dispatch(SessionIntent::RequestSubmit).await.unwrap();
        controller.dispatch(SessionIntent::ConfirmSubmit).await.unwrap();
        assert!(controller.view().submit_phase.is_completed());

        controller
            .dispatch(SessionIntent::SelectAnswer { option: "a".into() })
            .await
            .unwrap();
        controller.dispatch(SessionIntent::ConfirmSubmit).await.unwrap();

        assert_eq!(controller.view().entry.user_answer, None);
        assert_eq!(backing.submitted().len(), 1);
    }

    #[tokio::test]
    async fn mutations_feed_the_ephemeral_slot_and_restore_once() {
        let backing = InMemorySessionStore::new();
        {
            let mut controller = fresh_controller(3, SessionConfig::practice(), &backing).await;
            controller
                .dispatch(SessionIntent::SelectAnswer { option: "a".into() })
                .await
                .unwrap();
            controller.dispatch(SessionIntent::SaveAndNext).await.unwrap();
        }

        // Same questions, same storage: the snapshot slot rehydrates state.
        let mut restored = SessionController::start(
            questions(3),
            SessionConfig::practice(),
            Storage::from_in_memory(backing.clone()),
            fixed_clock(),
            false,
        )
        .await
        .unwrap();

        let view = restored.view();
        assert_eq!(view.current_index, 1);
        assert_eq!(view.palette[0], QuestionStatus::Answered);
        // Timers do not survive the snapshot.
        assert_eq!(view.timer.main_seconds, 0);
    }

    #[tokio::test]
    async fn save_and_exit_reuses_the_record_for_this_run() {
        let backing = InMemorySessionStore::new();
        let mut controller = fresh_controller(2, SessionConfig::practice(), &backing).await;

        controller
            .dispatch(SessionIntent::SelectAnswer { option: "a".into() })
            .await
            .unwrap();
        controller.dispatch(SessionIntent::OpenExitDialog).await.unwrap();
        controller
            .dispatch(SessionIntent::SaveAndExit { name: "Lunch break".into() })
            .await
            .unwrap();
        let first = controller.saved_session_id().unwrap();
        assert!(controller.view().exit_dialog.is_none());

        controller
            .dispatch(SessionIntent::SaveAndExit { name: "Lunch break".into() })
            .await
            .unwrap();
        assert_eq!(controller.saved_session_id(), Some(first));

        let storage = Storage::from_in_memory(backing.clone());
        let items = storage.saved_sessions.list().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Lunch break");
        // The durable record replaced the crash-recovery snapshot.
        let slot = QuestionSet::new(questions(2)).unwrap().fingerprint();
        assert_eq!(storage.snapshots.take(&slot).await.unwrap(), None);
    }

    #[tokio::test]
    async fn resume_continues_timers_and_consumes_the_record() {
        let backing = InMemorySessionStore::new();
        let mut controller = fresh_controller(2, SessionConfig::practice(), &backing).await;

        controller.clock_mut().advance(Duration::seconds(10));
        controller.dispatch(SessionIntent::OpenExitDialog).await.unwrap();
        controller
            .dispatch(SessionIntent::SaveAndExit { name: "Later".into() })
            .await
            .unwrap();
        let id = controller.saved_session_id().unwrap();
        drop(controller);

        let storage = Storage::from_in_memory(backing.clone());
        let mut resumed = SessionController::resume(storage.clone(), fixed_clock(), id)
            .await
            .unwrap();
        assert_eq!(resumed.view().timer.main_seconds, 10);

        resumed.clock_mut().advance(Duration::seconds(5));
        assert_eq!(resumed.view().timer.main_seconds, 15);

        // One-shot: the record is gone.
        assert!(SessionController::resume(storage, fixed_clock(), id)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn time_up_auto_submits_exactly_once() {
        let backing = InMemorySessionStore::new();
        let mut controller = fresh_controller(2, SessionConfig::timed(1), &backing).await;

        controller.clock_mut().advance(Duration::seconds(59));
        controller.dispatch(SessionIntent::Tick).await.unwrap();
        assert_eq!(controller.view().submit_phase, SubmitPhase::Idle);

        controller.clock_mut().advance(Duration::seconds(1));
        controller.dispatch(SessionIntent::Tick).await.unwrap();
        assert!(controller.view().submit_phase.is_completed());

        // Later ticks and a racing manual confirm are no-ops.
        controller.dispatch(SessionIntent::Tick).await.unwrap();
        controller.dispatch(SessionIntent::RequestSubmit).await.unwrap();
        controller.dispatch(SessionIntent::ConfirmSubmit).await.unwrap();
        assert_eq!(backing.submitted().len(), 1);
    }

    #[tokio::test]
    async fn failed_manual_submission_resumes_and_allows_retry() {
        let backing = InMemorySessionStore::new();
        let flaky = Arc::new(FlakySubmissions {
            inner: backing.clone(),
            fail: Mutex::new(true),
        });
        let storage = Storage {
            saved_sessions: Arc::new(backing.clone()),
            snapshots: Arc::new(backing.clone()),
            submissions: flaky.clone(),
        };

        let mut controller = SessionController::start(
            questions(2),
            SessionConfig::practice(),
            storage,
            fixed_clock(),
            true,
        )
        .await
        .unwrap();

        controller.dispatch(SessionIntent::RequestSubmit).await.unwrap();
        controller.dispatch(SessionIntent::ConfirmSubmit).await.unwrap();

        let view = controller.view();
        assert!(matches!(view.submit_phase, SubmitPhase::Failed { .. }));
        // Manual failure hands the session back with clocks running.
        assert!(!view.is_paused);
        assert!(backing.submitted().is_empty());

        *flaky.fail.lock().unwrap() = false;
        controller.dispatch(SessionIntent::RequestSubmit).await.unwrap();
        controller.dispatch(SessionIntent::ConfirmSubmit).await.unwrap();
        assert!(controller.view().submit_phase.is_completed());
        assert_eq!(backing.submitted().len(), 1);
    }

    #[tokio::test]
    async fn failed_direct_save_pauses_and_cancel_undoes_it() {
        let backing = InMemorySessionStore::new();
        let storage = Storage {
            saved_sessions: Arc::new(FailingSavedSessions),
            snapshots: Arc::new(backing.clone()),
            submissions: Arc::new(backing),
        };
        let mut controller = SessionController::start(
            questions(2),
            SessionConfig::practice(),
            storage,
            fixed_clock(),
            true,
        )
        .await
        .unwrap();

        // Save-and-exit without opening the dialog first.
        controller
            .dispatch(SessionIntent::SaveAndExit { name: "Direct".into() })
            .await
            .unwrap();
        let view = controller.view();
        assert!(view.is_paused);
        assert!(view.exit_dialog.and_then(|d| d.error).is_some());

        // The save caused the pause, so cancelling the dialog releases it.
        controller.dispatch(SessionIntent::CancelExit).await.unwrap();
        assert!(!controller.view().is_paused);

        // An explicit user pause before the save is preserved through cancel.
        controller.dispatch(SessionIntent::Pause).await.unwrap();
        controller
            .dispatch(SessionIntent::SaveAndExit { name: "Direct".into() })
            .await
            .unwrap();
        controller.dispatch(SessionIntent::CancelExit).await.unwrap();
        assert!(controller.view().is_paused);
    }

    #[tokio::test]
    async fn exit_dialog_pause_is_scoped_to_the_dialog() {
        let backing = InMemorySessionStore::new();
        let mut controller = fresh_controller(2, SessionConfig::practice(), &backing).await;

        controller.dispatch(SessionIntent::OpenExitDialog).await.unwrap();
        assert!(controller.view().is_paused);
        // Resume while the dialog is open is ignored.
        controller.dispatch(SessionIntent::Resume).await.unwrap();
        assert!(controller.view().is_paused);

        controller.dispatch(SessionIntent::CancelExit).await.unwrap();
        assert!(!controller.view().is_paused);

        // An explicit pause survives opening and cancelling the dialog.
        controller.dispatch(SessionIntent::Pause).await.unwrap();
        controller.dispatch(SessionIntent::OpenExitDialog).await.unwrap();
        controller.dispatch(SessionIntent::CancelExit).await.unwrap();
        assert!(controller.view().is_paused);
    }

    #[tokio::test]
    async fn bookmark_toggle_rolls_back_on_remote_failure() {
        let backing = InMemorySessionStore::new();
        let sink = RecordingBookmarkSink::default();
        *sink.fail.lock().unwrap() = true;

        let mut controller = fresh_controller(2, SessionConfig::practice(), &backing)
            .await
            .with_bookmark_sink(Arc::new(sink.clone()));

        assert!(controller.dispatch(SessionIntent::ToggleBookmark).await.is_err());
        assert!(!controller.view().entry.is_bookmarked);

        *sink.fail.lock().unwrap() = false;
        controller.dispatch(SessionIntent::ToggleBookmark).await.unwrap();
        assert!(controller.view().entry.is_bookmarked);
        assert_eq!(
            sink.calls.lock().unwrap().as_slice(),
            &[(QuestionId::new("q0"), true)]
        );
    }
}
