use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::model::config::SessionConfig;
use crate::model::entry::SessionEntry;
use crate::model::ids::QuestionId;
use crate::model::question::{Question, QuestionSet};
use crate::model::status::QuestionStatus;

//
// ─── TIMER SNAPSHOT ────────────────────────────────────────────────────────────
//

/// Frozen timer state: total elapsed session time plus per-question elapsed
/// time keyed by question index.
///
/// Invariant: the per-question sum never exceeds the main elapsed value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub main_elapsed_ms: i64,
    pub per_question_elapsed_ms: BTreeMap<usize, i64>,
}

impl TimerSnapshot {
    /// Snapshot with both clocks at zero.
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }
}

//
// ─── EPHEMERAL SNAPSHOT ────────────────────────────────────────────────────────
//

/// Short-lived, single-use capture written on every relevant mutation so the
/// session survives incidental remounts and tab switches.
///
/// Carries no timer state: answers and statuses survive a remount, the clocks
/// restart. Durable resume is the path that restores time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EphemeralSnapshot {
    pub current_index: usize,
    pub entries: Vec<SessionEntry>,
    pub captured_at: DateTime<Utc>,
    pub config: SessionConfig,
}

//
// ─── SAVED SESSION ─────────────────────────────────────────────────────────────
//

/// Durable save-and-resume payload.
///
/// Carries full answer/status/bookmark maps by stable question id plus enough
/// question metadata to rehydrate without a fresh fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedSession {
    pub config: SessionConfig,
    pub question_ids: Vec<QuestionId>,
    pub current_index: usize,
    pub timer: TimerSnapshot,
    pub answers_by_id: BTreeMap<QuestionId, String>,
    pub statuses_by_id: BTreeMap<QuestionId, QuestionStatus>,
    pub bookmarked_ids: BTreeSet<QuestionId>,
    pub questions: Vec<Question>,
}

impl SavedSession {
    /// Capture the live session state into a durable payload.
    ///
    /// `entries` must be index-aligned with `set`; extra or missing entries
    /// are a caller bug and the shorter of the two is captured.
    #[must_use]
    pub fn capture(
        set: &QuestionSet,
        entries: &[SessionEntry],
        current_index: usize,
        timer: TimerSnapshot,
        config: SessionConfig,
    ) -> Self {
        let mut answers_by_id = BTreeMap::new();
        let mut statuses_by_id = BTreeMap::new();
        let mut bookmarked_ids = BTreeSet::new();

        for (question, entry) in set.iter().zip(entries) {
            if let Some(answer) = &entry.user_answer {
                answers_by_id.insert(question.id.clone(), answer.clone());
            }
            statuses_by_id.insert(question.id.clone(), entry.status);
            if entry.is_bookmarked {
                bookmarked_ids.insert(question.id.clone());
            }
        }

        Self {
            config,
            question_ids: set.ids(),
            current_index,
            timer,
            answers_by_id,
            statuses_by_id,
            bookmarked_ids,
            questions: set.questions().to_vec(),
        }
    }

    /// Rebuild index-aligned entries for the given question set.
    ///
    /// Questions absent from the saved maps come back as fresh entries, so a
    /// payload saved against an older revision of the set still rehydrates.
    #[must_use]
    pub fn entries_aligned(&self, set: &QuestionSet) -> Vec<SessionEntry> {
        set.iter()
            .map(|question| {
                let status = self
                    .statuses_by_id
                    .get(&question.id)
                    .copied()
                    .unwrap_or(QuestionStatus::NotVisited);
                SessionEntry {
                    status,
                    user_answer: self.answers_by_id.get(&question.id).cloned(),
                    is_bookmarked: self.bookmarked_ids.contains(&question.id),
                }
            })
            .collect()
    }
}

//
// ─── RESTORE SOURCE ────────────────────────────────────────────────────────────
//

/// The single, exclusive source of restored state at initialization.
///
/// Consumed exactly once; precedence between the variants is resolved by the
/// persistence gateway before the store is built.
#[derive(Debug, Clone, PartialEq)]
pub enum RestoreSource {
    Fresh,
    Ephemeral(EphemeralSnapshot),
    Durable(SavedSession),
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
